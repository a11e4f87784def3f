use super::types::{MindmapNode, NodeId};

/// Node contents captured by copy/cut. Position is the source's, nudged by
/// the copy offset.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSnapshot {
	pub title: String,
	pub body: String,
	pub files: Vec<String>,
	pub x: f64,
	pub y: f64,
}

impl NodeSnapshot {
	pub fn of(node: &MindmapNode, offset: (f64, f64)) -> Self {
		Self {
			title: node.title.clone(),
			body: node.body.clone(),
			files: node.files.clone(),
			x: node.x + offset.0,
			y: node.y + offset.1,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum Paste {
	/// Move the cut node here.
	Relocate { id: NodeId, x: f64, y: f64 },
	/// Insert a fresh node built from the snapshot.
	Insert { snapshot: NodeSnapshot, x: f64, y: f64 },
}

#[derive(Clone, Debug, Default)]
pub struct Clipboard {
	snapshot: Option<NodeSnapshot>,
	cut_source: Option<NodeId>,
}

impl Clipboard {
	pub fn copy(&mut self, node: &MindmapNode, offset: (f64, f64)) {
		self.snapshot = Some(NodeSnapshot::of(node, offset));
		self.cut_source = None;
	}

	pub fn cut(&mut self, node: &MindmapNode, offset: (f64, f64)) {
		self.snapshot = Some(NodeSnapshot::of(node, offset));
		self.cut_source = Some(node.id.clone());
	}

	pub fn is_empty(&self) -> bool {
		self.snapshot.is_none()
	}

	pub fn cut_source(&self) -> Option<&str> {
		self.cut_source.as_deref()
	}

	/// Decide what a paste at `at` does. A pending cut is consumed by the
	/// first paste; later pastes insert copies of the snapshot. Without a
	/// tracked pointer the snapshot's own offset position is used.
	pub fn paste(&mut self, at: Option<(f64, f64)>) -> Option<Paste> {
		let snapshot = self.snapshot.as_ref()?;
		let (x, y) = at.unwrap_or((snapshot.x, snapshot.y));
		Some(match self.cut_source.take() {
			Some(id) => Paste::Relocate { id, x, y },
			None => Paste::Insert {
				snapshot: snapshot.clone(),
				x,
				y,
			},
		})
	}

	/// Drop a pending cut of a node that was deleted.
	pub fn forget(&mut self, id: &str) {
		if self.cut_source.as_deref() == Some(id) {
			self.cut_source = None;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node() -> MindmapNode {
		MindmapNode {
			id: "n1".into(),
			x: 100.0,
			y: 50.0,
			title: "Idea".into(),
			body: "details".into(),
			files: vec!["a.md".into()],
			..Default::default()
		}
	}

	#[test]
	fn test_copy_snapshot_is_offset() {
		let mut clip = Clipboard::default();
		assert!(clip.paste(Some((0.0, 0.0))).is_none());
		clip.copy(&node(), (20.0, 10.0));
		let Some(Paste::Insert { snapshot, x, y }) = clip.paste(None) else {
			panic!("expected insert");
		};
		assert_eq!((snapshot.x, snapshot.y), (120.0, 60.0));
		assert_eq!((x, y), (120.0, 60.0));
		assert_eq!(snapshot.files, ["a.md"]);
	}

	#[test]
	fn test_cut_is_one_shot() {
		let mut clip = Clipboard::default();
		clip.cut(&node(), (20.0, 10.0));
		assert_eq!(clip.cut_source(), Some("n1"));
		assert_eq!(
			clip.paste(Some((5.0, 6.0))),
			Some(Paste::Relocate {
				id: "n1".into(),
				x: 5.0,
				y: 6.0
			})
		);
		assert!(matches!(clip.paste(Some((7.0, 8.0))), Some(Paste::Insert { .. })));
	}

	#[test]
	fn test_copy_clears_pending_cut() {
		let mut clip = Clipboard::default();
		clip.cut(&node(), (20.0, 10.0));
		clip.copy(&node(), (20.0, 10.0));
		assert_eq!(clip.cut_source(), None);
	}

	#[test]
	fn test_forget_deleted_cut() {
		let mut clip = Clipboard::default();
		clip.cut(&node(), (0.0, 0.0));
		clip.forget("n1");
		assert!(matches!(clip.paste(None), Some(Paste::Insert { .. })));
		assert!(!clip.is_empty());
	}
}

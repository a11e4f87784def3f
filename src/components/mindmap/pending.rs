use std::collections::HashMap;

use super::types::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickKind {
	Markdown,
	Image,
}

/// Outstanding host pick dialogs, at most one per node.
#[derive(Clone, Debug, Default)]
pub struct PendingPicks {
	by_node: HashMap<NodeId, PickKind>,
}

impl PendingPicks {
	/// Register a request, replacing any outstanding one for the node. Returns
	/// the kind it superseded; a late reply to that one no longer resolves.
	pub fn request(&mut self, node: &str, kind: PickKind) -> Option<PickKind> {
		self.by_node.insert(node.to_owned(), kind)
	}

	/// Match a response against its request, consuming it. A response with
	/// no matching request is stale.
	pub fn resolve(&mut self, node: &str, kind: PickKind) -> bool {
		match self.by_node.get(node) {
			Some(&pending) if pending == kind => {
				self.by_node.remove(node);
				true
			}
			_ => false,
		}
	}

	pub fn cancel(&mut self, node: &str) {
		self.by_node.remove(node);
	}

	pub fn is_pending(&self, node: &str) -> bool {
		self.by_node.contains_key(node)
	}
}

//! Builds the `{nodes, links}` model from tagged notes.
//!
//! The extension host normally does this and pushes the result over the
//! bridge; the standalone page uses it to render a sample vault.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::types::{GraphData, GraphIntent, GraphLink, GraphNode, LinkKind, NodeKind};

pub const TAG_PREFIX: &str = "tag:";

#[derive(Clone, Debug, PartialEq)]
pub struct TaggedNote {
	pub key: String,
	pub tags: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct NoteIndex {
	notes: Vec<TaggedNote>,
	filter: BTreeSet<String>,
	max_nodes: usize,
}

impl NoteIndex {
	pub fn new(max_nodes: usize) -> Self {
		Self {
			notes: Vec::new(),
			filter: BTreeSet::new(),
			max_nodes,
		}
	}

	/// Insert or replace a note's tags, keeping first-seen order.
	pub fn upsert(&mut self, key: impl Into<String>, tags: Vec<String>) {
		let key = key.into();
		match self.notes.iter_mut().find(|n| n.key == key) {
			Some(note) => note.tags = tags,
			None => self.notes.push(TaggedNote { key, tags }),
		}
	}

	pub fn remove(&mut self, key: &str) {
		self.notes.retain(|n| n.key != key);
	}

	pub fn all_tags(&self) -> Vec<String> {
		self.notes
			.iter()
			.flat_map(|n| n.tags.iter().cloned())
			.collect::<BTreeSet<_>>()
			.into_iter()
			.collect()
	}

	pub fn active_filter(&self) -> impl Iterator<Item = &str> {
		self.filter.iter().map(String::as_str)
	}

	pub fn toggle_tag(&mut self, tag: &str) {
		if !self.filter.remove(tag) {
			self.filter.insert(tag.to_owned());
		}
	}

	pub fn clear_filter(&mut self) {
		self.filter.clear();
	}

	/// Answer a canvas intent the way the host would. Tag clicks refilter and
	/// return the rebuilt model; opening a file needs an editor, so it is `None`.
	pub fn handle(&mut self, intent: &GraphIntent) -> Option<GraphData> {
		match intent {
			GraphIntent::ToggleTag { tag } => {
				self.toggle_tag(tag);
				Some(self.to_graph())
			}
			GraphIntent::Open { .. } => None,
		}
	}

	/// Notes carrying every active filter tag.
	pub fn filtered(&self) -> impl Iterator<Item = &TaggedNote> {
		self.notes
			.iter()
			.filter(|n| self.filter.iter().all(|t| n.tags.contains(t)))
	}

	/// How many filtered notes carry each unordered pair of distinct tags.
	pub fn co_occurrence(&self) -> BTreeMap<(String, String), u32> {
		let mut counts = BTreeMap::new();
		for note in self.filtered() {
			let tags: Vec<&String> = note.tags.iter().collect::<BTreeSet<_>>().into_iter().collect();
			for (i, a) in tags.iter().enumerate() {
				for b in &tags[i + 1..] {
					*counts.entry(((*a).clone(), (*b).clone())).or_insert(0) += 1;
				}
			}
		}
		counts
	}

	pub fn to_graph(&self) -> GraphData {
		let mut builder = Builder {
			data: GraphData::default(),
			ids: HashMap::new(),
			max_nodes: self.max_nodes,
		};

		for note in self.filtered() {
			let file = builder.push(&note.key, basename(&note.key), NodeKind::File);
			for tag in &note.tags {
				let tag_node = builder.push(&format!("{TAG_PREFIX}{tag}"), tag, NodeKind::Tag);
				builder.link(file, tag_node, LinkKind::FileTag, None);
			}
		}

		for ((a, b), weight) in self.co_occurrence() {
			let a = builder.push(&format!("{TAG_PREFIX}{a}"), &a, NodeKind::Tag);
			let b = builder.push(&format!("{TAG_PREFIX}{b}"), &b, NodeKind::Tag);
			builder.link(a, b, LinkKind::TagTag, Some(weight));
		}

		builder.data
	}
}

struct Builder {
	data: GraphData,
	ids: HashMap<String, usize>,
	max_nodes: usize,
}

impl Builder {
	fn push(&mut self, key: &str, label: &str, kind: NodeKind) -> Option<usize> {
		if let Some(&id) = self.ids.get(key) {
			return Some(id);
		}
		if self.data.nodes.len() >= self.max_nodes {
			return None;
		}
		let id = self.data.nodes.len();
		self.ids.insert(key.to_owned(), id);
		self.data.nodes.push(GraphNode {
			id,
			key: key.to_owned(),
			label: label.to_owned(),
			kind,
			x: None,
			y: None,
		});
		Some(id)
	}

	fn link(&mut self, a: Option<usize>, b: Option<usize>, kind: LinkKind, weight: Option<u32>) {
		if let (Some(source), Some(target)) = (a, b) {
			self.data.links.push(GraphLink {
				source,
				target,
				kind,
				weight,
			});
		}
	}
}

fn basename(key: &str) -> &str {
	key.rsplit('/').find(|s| !s.is_empty()).unwrap_or(key)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tags(list: &[&str]) -> Vec<String> {
		list.iter().map(|s| s.to_string()).collect()
	}

	fn sample() -> NoteIndex {
		let mut index = NoteIndex::new(500);
		index.upsert("file:///vault/a.md", tags(&["rust", "wasm"]));
		index.upsert("file:///vault/b.md", tags(&["rust"]));
		index.upsert("file:///vault/c.md", tags(&["wasm", "rust", "rust"]));
		index
	}

	#[test]
	fn test_handle_toggles_filter_and_rebuilds() {
		let mut index = sample();
		let toggle = GraphIntent::ToggleTag { tag: "wasm".into() };
		let filtered = index.handle(&toggle).unwrap();
		assert!(!filtered.nodes.iter().any(|n| n.key == "file:///vault/b.md"));
		let all = index.handle(&toggle).unwrap();
		assert!(all.nodes.iter().any(|n| n.key == "file:///vault/b.md"));
		let open = GraphIntent::Open {
			key: "file:///vault/a.md".into(),
		};
		assert_eq!(index.handle(&open), None);
	}

	#[test]
	fn test_graph_nodes_and_links() {
		let graph = sample().to_graph();
		let keys: Vec<&str> = graph.nodes.iter().map(|n| n.key.as_str()).collect();
		assert_eq!(
			keys,
			[
				"file:///vault/a.md",
				"tag:rust",
				"tag:wasm",
				"file:///vault/b.md",
				"file:///vault/c.md"
			]
		);
		assert!(graph.nodes.iter().enumerate().all(|(i, n)| n.id == i));
		assert_eq!(graph.nodes[0].label, "a.md");

		let tag_tag: Vec<&GraphLink> = graph
			.links
			.iter()
			.filter(|l| l.kind == LinkKind::TagTag)
			.collect();
		assert_eq!(tag_tag.len(), 1);
		assert_eq!((tag_tag[0].source, tag_tag[0].target), (1, 2));
		assert_eq!(tag_tag[0].weight, Some(2));
	}

	#[test]
	fn test_filter_is_conjunctive_and_toggles() {
		let mut index = sample();
		index.toggle_tag("wasm");
		let keys: Vec<&str> = index.filtered().map(|n| n.key.as_str()).collect();
		assert_eq!(keys, ["file:///vault/a.md", "file:///vault/c.md"]);
		index.toggle_tag("wasm");
		assert_eq!(index.filtered().count(), 3);
		index.toggle_tag("rust");
		index.clear_filter();
		assert_eq!(index.active_filter().count(), 0);
	}

	#[test]
	fn test_node_ceiling_drops_links_to_missing_nodes() {
		let mut index = NoteIndex::new(2);
		index.upsert("file:///a.md", tags(&["x", "y"]));
		let graph = index.to_graph();
		assert_eq!(graph.nodes.len(), 2);
		assert!(
			graph
				.links
				.iter()
				.all(|l| l.source < 2 && l.target < 2)
		);
	}

	#[test]
	fn test_upsert_replaces_and_remove() {
		let mut index = sample();
		index.upsert("file:///vault/b.md", tags(&["notes"]));
		assert_eq!(index.all_tags(), ["notes", "rust", "wasm"]);
		index.remove("file:///vault/b.md");
		assert_eq!(index.all_tags(), ["rust", "wasm"]);
	}
}

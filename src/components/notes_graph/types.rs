use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
	File,
	Tag,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkKind {
	FileTag,
	TagTag,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	/// Dense index into the node array; only used for link endpoints.
	pub id: usize,
	/// File URI or `tag:<name>`; stable across model rebuilds.
	pub key: String,
	#[serde(default)]
	pub label: String,
	pub kind: NodeKind,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub x: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub y: Option<f64>,
}

impl GraphNode {
	pub fn position(&self) -> Option<(f64, f64)> {
		Some((self.x?, self.y?))
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
	pub source: usize,
	pub target: usize,
	pub kind: LinkKind,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub weight: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	#[serde(default)]
	pub links: Vec<GraphLink>,
}

/// Host -> graph view.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GraphInbound {
	Graph {
		#[serde(default)]
		data: GraphData,
	},
}

/// Graph view -> host.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GraphIntent {
	ToggleTag { tag: String },
	Open { key: String },
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type NodeId = String;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFit {
	#[default]
	Contain,
	Cover,
}

impl ImageFit {
	pub fn as_css(self) -> &'static str {
		match self {
			ImageFit::Contain => "contain",
			ImageFit::Cover => "cover",
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeImage {
	pub path: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub caption: Option<String>,
	#[serde(default)]
	pub fit: ImageFit,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub w: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub h: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindmapNode {
	pub id: NodeId,
	#[serde(default)]
	pub x: f64,
	#[serde(default)]
	pub y: f64,
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub body: String,
	/// Persisted text-area height; unset means auto-size.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub body_h: Option<f64>,
	#[serde(default)]
	pub files: Vec<String>,
	/// Pre-`files` single link, folded into `files` by [`MindmapDoc::migrate`].
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub image: Option<NodeImage>,
}

impl MindmapNode {
	/// Append a linked file unless already present.
	pub fn link_file(&mut self, path: &str) -> bool {
		if self.files.iter().any(|f| f == path) {
			return false;
		}
		self.files.push(path.to_owned());
		true
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MindmapEdge {
	pub id: String,
	pub from: NodeId,
	pub to: NodeId,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MindmapDoc {
	pub version: u32,
	pub nodes: Vec<MindmapNode>,
	pub edges: Vec<MindmapEdge>,
}

impl Default for MindmapDoc {
	fn default() -> Self {
		Self {
			version: 1,
			nodes: Vec::new(),
			edges: Vec::new(),
		}
	}
}

#[derive(Debug, Error)]
pub enum DocError {
	#[error("mindmap is not valid JSON: {0}")]
	Json(#[from] serde_json::Error),
	#[error("mindmap is missing its `{0}` array")]
	MissingArray(&'static str),
}

impl MindmapDoc {
	/// Strict load: the value must be an object with `nodes` and `edges` arrays.
	pub fn from_value(value: serde_json::Value) -> Result<Self, DocError> {
		for key in ["nodes", "edges"] {
			if !value.get(key).is_some_and(serde_json::Value::is_array) {
				return Err(DocError::MissingArray(key));
			}
		}
		let mut doc: MindmapDoc = serde_json::from_value(with_version(value))?;
		doc.migrate();
		Ok(doc)
	}

	pub fn parse(text: &str) -> Result<Self, DocError> {
		Self::from_value(serde_json::from_str(text)?)
	}

	/// Lenient load: anything unusable becomes an empty document.
	pub fn from_value_or_default(value: serde_json::Value) -> Self {
		Self::from_value(value).unwrap_or_else(|err| {
			log::warn!("{err}; starting from an empty mindmap");
			Self::default()
		})
	}

	/// Fold legacy `file` into `files`. Idempotent.
	pub fn migrate(&mut self) {
		for node in &mut self.nodes {
			if let Some(file) = node.file.take() {
				node.link_file(&file);
			}
		}
	}

	pub fn node(&self, id: &str) -> Option<&MindmapNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn node_mut(&mut self, id: &str) -> Option<&mut MindmapNode> {
		self.nodes.iter_mut().find(|n| n.id == id)
	}

	/// Remove a node and every edge touching it. Returns whether it existed.
	pub fn remove_node(&mut self, id: &str) -> bool {
		let before = self.nodes.len();
		self.nodes.retain(|n| n.id != id);
		self.edges.retain(|e| e.from != id && e.to != id);
		self.nodes.len() != before
	}

	pub fn to_json_pretty(&self) -> Result<String, DocError> {
		Ok(serde_json::to_string_pretty(self)?)
	}
}

fn with_version(mut value: serde_json::Value) -> serde_json::Value {
	if let Some(obj) = value.as_object_mut() {
		obj.entry("version").or_insert(serde_json::Value::from(1));
	}
	value
}

/// Host -> mindmap editor.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MindmapInbound {
	PickedMarkdown {
		#[serde(rename = "for")]
		for_node: NodeId,
		#[serde(default)]
		path: Option<String>,
	},
	PickedImage {
		#[serde(rename = "for")]
		for_node: NodeId,
		#[serde(default)]
		path: Option<String>,
		#[serde(default)]
		src: Option<String>,
	},
}

/// Mindmap editor -> host.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MindmapOutbound {
	SaveMindmap {
		data: MindmapDoc,
	},
	OpenFile {
		path: String,
	},
	PickMarkdown {
		#[serde(rename = "for")]
		for_node: NodeId,
	},
	PickImage {
		#[serde(rename = "for")]
		for_node: NodeId,
	},
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn test_legacy_file_migrates_once() {
		let mut doc = MindmapDoc::from_value(json!({
			"version": 1,
			"nodes": [{"id": "n1", "x": 0, "y": 0, "title": "t", "file": "a.md"}],
			"edges": []
		}))
		.unwrap();
		assert_eq!(doc.nodes[0].files, ["a.md"]);
		assert_eq!(doc.nodes[0].file, None);
		doc.migrate();
		assert_eq!(doc.nodes[0].files, ["a.md"]);

		let out = serde_json::to_value(&doc).unwrap();
		assert!(out["nodes"][0].get("file").is_none());
	}

	#[test]
	fn test_legacy_file_not_duplicated() {
		let doc = MindmapDoc::from_value(json!({
			"nodes": [{"id": "n1", "files": ["a.md"], "file": "a.md"}],
			"edges": []
		}))
		.unwrap();
		assert_eq!(doc.nodes[0].files, ["a.md"]);
		assert_eq!(doc.version, 1);
		assert_eq!(doc.nodes[0].body, "");
	}

	#[test]
	fn test_missing_arrays_fall_back_to_empty() {
		assert!(matches!(
			MindmapDoc::from_value(json!({"nodes": []})),
			Err(DocError::MissingArray("edges"))
		));
		assert!(matches!(MindmapDoc::parse("nope"), Err(DocError::Json(_))));
		let doc = MindmapDoc::from_value_or_default(json!({"nodes": "x", "edges": []}));
		assert_eq!(doc, MindmapDoc::default());
	}

	#[test]
	fn test_round_trip_preserves_document() {
		let doc = MindmapDoc {
			version: 1,
			nodes: vec![MindmapNode {
				id: "n1".into(),
				x: 10.5,
				y: -3.0,
				title: "Root".into(),
				body: "line one\nline two".into(),
				body_h: Some(64.0),
				files: vec!["notes/a.md".into(), "notes/b.md".into()],
				file: None,
				image: Some(NodeImage {
					path: "mindmap-images/cat.png".into(),
					caption: Some("cat".into()),
					fit: ImageFit::Cover,
					w: None,
					h: None,
				}),
			}],
			edges: vec![MindmapEdge {
				id: "e1".into(),
				from: "n1".into(),
				to: "n1".into(),
				label: Some("self".into()),
			}],
		};
		let text = doc.to_json_pretty().unwrap();
		assert!(text.contains("\"bodyH\": 64.0"));
		let back = MindmapDoc::parse(&text).unwrap();
		assert_eq!(back, doc);
	}

	#[test]
	fn test_image_fit_defaults_to_contain() {
		let doc = MindmapDoc::parse(
			r#"{"nodes":[{"id":"n1","image":{"path":"a.png"}}],"edges":[]}"#,
		)
		.unwrap();
		assert_eq!(doc.nodes[0].image.as_ref().unwrap().fit, ImageFit::Contain);
		assert_eq!(doc.nodes[0].body_h, None);
	}

	#[test]
	fn test_remove_node_cascades_to_edges_only() {
		let mut doc = MindmapDoc {
			nodes: ["a", "b", "c", "d"]
				.iter()
				.map(|id| MindmapNode {
					id: id.to_string(),
					..Default::default()
				})
				.collect(),
			edges: vec![
				MindmapEdge {
					id: "e1".into(),
					from: "a".into(),
					to: "b".into(),
					label: None,
				},
				MindmapEdge {
					id: "e2".into(),
					from: "b".into(),
					to: "c".into(),
					label: None,
				},
				MindmapEdge {
					id: "e3".into(),
					from: "c".into(),
					to: "d".into(),
					label: None,
				},
			],
			..Default::default()
		};
		assert!(doc.remove_node("b"));
		let left: Vec<&str> = doc.edges.iter().map(|e| e.id.as_str()).collect();
		assert_eq!(left, ["e3"]);
		assert_eq!(doc.nodes.len(), 3);
		assert!(!doc.remove_node("b"));
	}

	#[test]
	fn test_messages_wire_shape() {
		let msg: MindmapInbound =
			serde_json::from_str(r#"{"type":"pickedMarkdown","for":"n1","path":null}"#).unwrap();
		assert_eq!(
			msg,
			MindmapInbound::PickedMarkdown {
				for_node: "n1".into(),
				path: None
			}
		);
		let msg: MindmapInbound = serde_json::from_str(r#"{"type":"pickedImage","for":"n1"}"#).unwrap();
		assert!(matches!(msg, MindmapInbound::PickedImage { path: None, src: None, .. }));

		let out = serde_json::to_value(MindmapOutbound::PickImage {
			for_node: "n1".into(),
		})
		.unwrap();
		assert_eq!(out, json!({"type": "pickImage", "for": "n1"}));
		let save = serde_json::to_value(MindmapOutbound::SaveMindmap {
			data: MindmapDoc::default(),
		})
		.unwrap();
		assert_eq!(save, json!({"type": "saveMindmap", "data": {"version": 1, "nodes": [], "edges": []}}));
	}
}

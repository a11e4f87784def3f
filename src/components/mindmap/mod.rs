//! Mindmap editor: draggable text blocks joined by arrows, over a pan/zoom stage.

pub mod clipboard;
mod component;
pub mod connect;
pub mod geometry;
pub mod pending;
pub mod state;
mod types;

pub use component::MindmapEditor;
pub use types::{
	DocError, ImageFit, MindmapDoc, MindmapEdge, MindmapInbound, MindmapNode, MindmapOutbound,
	NodeId, NodeImage,
};

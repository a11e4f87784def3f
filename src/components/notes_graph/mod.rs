mod component;
pub mod index;
mod render;
pub mod state;
mod types;

pub use component::NotesGraphCanvas;
pub use types::{GraphData, GraphInbound, GraphIntent, GraphLink, GraphNode, LinkKind, NodeKind};

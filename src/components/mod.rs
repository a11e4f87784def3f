pub mod input;
pub mod mindmap;
pub mod notes_graph;
pub mod transform;

pub mod graph;
pub mod home;
pub mod mindmap;

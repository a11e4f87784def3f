use leptos::prelude::*;

use super::graph::GraphPage;
use super::mindmap::MindmapPage;
use crate::bridge::{Bootstrap, Surface};

/// Picks the engine the host page was built for. Without a payload the graph
/// demo is shown.
#[component]
pub fn Home() -> impl IntoView {
	let surface = use_context::<Bootstrap>().and_then(|boot| boot.surface());
	match surface {
		Some(Surface::Mindmap) => view! { <MindmapPage /> }.into_any(),
		Some(Surface::Graph) | None => view! { <GraphPage /> }.into_any(),
	}
}

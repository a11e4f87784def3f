use leptos::prelude::*;

use crate::bridge::{Bootstrap, HostBridge};
use crate::components::notes_graph::index::NoteIndex;
use crate::components::notes_graph::{GraphIntent, NotesGraphCanvas};

/// A small vault so the page has something to show outside the extension host.
fn sample_vault(max_nodes: usize) -> NoteIndex {
	let notes: [(&str, &[&str]); 6] = [
		("notes/rust.md", &["lang", "systems"]),
		("notes/wasm.md", &["lang", "web"]),
		("notes/canvas.md", &["web", "graphics"]),
		("journal/2024-05-01.md", &["daily"]),
		("journal/2024-05-02.md", &["daily", "systems"]),
		("inbox.md", &[]),
	];
	let mut index = NoteIndex::new(max_nodes);
	for (key, tags) in notes {
		index.upsert(key, tags.iter().map(|t| t.to_string()).collect());
	}
	index
}

/// Tag/file graph, seeded from the bootstrap payload. Without a host graph it
/// shows the sample vault and filters it locally on tag clicks.
#[component]
pub fn GraphPage() -> impl IntoView {
	let boot = use_context::<Bootstrap>().unwrap_or_default();
	let config = boot.config.graph;
	let (data, on_intent) = match boot.graph {
		Some(data) => (data, None),
		None => {
			log::info!("no graph in bootstrap; showing the sample vault");
			let vault = sample_vault(config.max_nodes);
			let data = vault.to_graph();
			let on_intent = (!HostBridge::get().is_connected()).then(|| {
				let vault = StoredValue::new(vault);
				Callback::new(move |intent: GraphIntent| {
					vault.try_update_value(|index| index.handle(&intent)).flatten()
				})
			});
			(data, on_intent)
		}
	};

	view! {
		<div class="graph-page" style="width: 100vw; height: 100vh;">
			<NotesGraphCanvas data=data config=config on_intent=on_intent />
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::notes_graph::NodeKind;

	#[test]
	fn test_sample_vault_has_files_and_tags() {
		let graph = sample_vault(500).to_graph();
		let files = graph.nodes.iter().filter(|n| n.kind == NodeKind::File).count();
		assert_eq!(files, 6);
		assert!(graph.nodes.iter().any(|n| n.key == "tag:daily"));
		assert!(!graph.links.is_empty());
	}
}

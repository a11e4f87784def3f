use leptos::prelude::*;

use crate::bridge::Bootstrap;
use crate::components::mindmap::{MindmapDoc, MindmapEditor};

/// Mindmap editor over the bootstrap document; a malformed document opens empty.
#[component]
pub fn MindmapPage() -> impl IntoView {
	let boot = use_context::<Bootstrap>().unwrap_or_default();
	let doc = boot
		.doc
		.map(MindmapDoc::from_value_or_default)
		.unwrap_or_default();

	view! {
		<div class="mindmap-page" style="width: 100vw; height: 100vh;">
			<MindmapEditor
				doc=doc
				rel_path=boot.rel_path.unwrap_or_default()
				image_sources=boot.img_map
				config=boot.config.mindmap
			/>
		</div>
	}
}

//! Graph canvas and mindmap editor for a notes extension's webviews.
//!
//! The host page injects its model as `window.initial` and talks to the
//! engines through `postMessage`; see [`bridge`].

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Only needed to switch on its `js` backend for `rand` under wasm.
use getrandom as _;

// Modules
pub mod bridge;
pub mod components;
pub mod config;
pub mod ids;
mod pages;

use crate::bridge::Bootstrap;
use crate::pages::graph::GraphPage;
use crate::pages::home::Home;
use crate::pages::mindmap::MindmapPage;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// Routes to either engine. Webview URLs rarely match a route, so the
/// fallback dispatches on the bootstrap payload.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let boot = Bootstrap::from_window();
	info!("bootstrap surface: {:?}", boot.surface());
	provide_context(boot);

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		<Title text="Notes Canvas" />

		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <Home /> }>
				<Route path=path!("/") view=Home />
				<Route path=path!("/graph") view=GraphPage />
				<Route path=path!("/mindmap") view=MindmapPage />
			</Routes>
		</Router>
	}
}

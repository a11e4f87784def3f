//! Webview <-> extension host messaging.
//!
//! Outbound messages go through the host's `acquireVsCodeApi().postMessage`;
//! inbound ones arrive as window `message` events. The initial model is
//! injected as `window.initial` before the script runs.

use std::cell::OnceCell;
use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use leptos::ev;
use leptos::prelude::{WindowListenerHandle, window_event_listener};
use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::MessageEvent;

use crate::components::notes_graph::GraphData;
use crate::config::EngineConfig;

#[derive(Debug, Error)]
pub enum BridgeError {
	#[error("host messaging API is not available")]
	NoHost,
	#[error("could not convert host value: {0}")]
	Value(#[from] serde_wasm_bindgen::Error),
	#[error("invalid JSON: {0}")]
	Json(#[from] serde_json::Error),
	#[error("host call failed: {0}")]
	Js(String),
}

impl From<JsValue> for BridgeError {
	fn from(value: JsValue) -> Self {
		BridgeError::Js(format!("{value:?}"))
	}
}

thread_local! {
	// The host hands out its API object once per page.
	static HOST_API: OnceCell<Option<JsValue>> = const { OnceCell::new() };
}

fn acquire_api() -> Option<JsValue> {
	let window = web_sys::window()?;
	let acquire = js_sys::Reflect::get(&window, &"acquireVsCodeApi".into()).ok()?;
	let Ok(acquire) = acquire.dyn_into::<js_sys::Function>() else {
		log::info!("no extension host; outbound messages will be dropped");
		return None;
	};
	match acquire.call0(&JsValue::NULL) {
		Ok(api) => Some(api),
		Err(err) => {
			log::warn!("acquireVsCodeApi failed: {err:?}");
			None
		}
	}
}

/// Handle on the host's messaging API. Cheap to clone, and cheap to get again
/// since the API object is cached per thread.
#[derive(Clone, Debug)]
pub struct HostBridge {
	api: Option<JsValue>,
}

impl HostBridge {
	pub fn get() -> Self {
		let api = HOST_API.with(|cell| cell.get_or_init(acquire_api).clone());
		Self { api }
	}

	/// Whether an extension host is listening.
	pub fn is_connected(&self) -> bool {
		self.api.is_some()
	}

	pub fn post<T: Serialize>(&self, msg: &T) -> Result<(), BridgeError> {
		let api = self.api.as_ref().ok_or(BridgeError::NoHost)?;
		let value = msg.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?;
		let post = js_sys::Reflect::get(api, &"postMessage".into())?
			.dyn_into::<js_sys::Function>()
			.map_err(|_| BridgeError::NoHost)?;
		post.call1(api, &value)?;
		Ok(())
	}

	/// Post and log instead of failing; the engines have nowhere to surface errors.
	pub fn send<T: Serialize + std::fmt::Debug>(&self, msg: &T) {
		match self.post(msg) {
			Ok(()) => log::debug!("posted {msg:?}"),
			Err(BridgeError::NoHost) => log::debug!("dropped {msg:?}"),
			Err(err) => log::warn!("posting {msg:?} failed: {err}"),
		}
	}
}

pub fn decode<T: DeserializeOwned>(value: JsValue) -> Result<T, BridgeError> {
	Ok(serde_wasm_bindgen::from_value(value)?)
}

/// Route window `message` events of type `T` to `handler` until the returned
/// handle is removed. Messages that do not decode as `T` are skipped.
pub fn listen<T, F>(handler: F) -> WindowListenerHandle
where
	T: DeserializeOwned + 'static,
	F: Fn(T) + 'static,
{
	window_event_listener(ev::message, move |event: MessageEvent| {
		match decode::<T>(event.data()) {
			Ok(msg) => handler(msg),
			Err(err) => log::debug!("ignoring host message: {err}"),
		}
	})
}

/// Which engine the host page was built for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Surface {
	Graph,
	Mindmap,
}

/// Contents of `window.initial`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Bootstrap {
	pub graph: Option<GraphData>,
	/// Raw mindmap document; validated by the mindmap engine.
	pub doc: Option<serde_json::Value>,
	pub rel_path: Option<String>,
	pub img_map: HashMap<String, String>,
	pub config: EngineConfig,
}

impl Bootstrap {
	pub fn from_json(text: &str) -> Result<Self, BridgeError> {
		let boot: Self = serde_json::from_str(text)?;
		Ok(Self {
			config: boot.config.normalized(),
			..boot
		})
	}

	pub fn from_window() -> Self {
		match Self::read_window() {
			Ok(Some(boot)) => boot,
			Ok(None) => Self::default(),
			Err(err) => {
				log::warn!("unreadable bootstrap payload: {err}");
				Self::default()
			}
		}
	}

	fn read_window() -> Result<Option<Self>, BridgeError> {
		let window = web_sys::window().ok_or(BridgeError::NoHost)?;
		let initial = js_sys::Reflect::get(&window, &"initial".into())?;
		if initial.is_undefined() || initial.is_null() {
			return Ok(None);
		}
		let text = js_sys::JSON::stringify(&initial)?;
		let text = String::from(text);
		Self::from_json(&text).map(Some)
	}

	pub fn surface(&self) -> Option<Surface> {
		if self.graph.is_some() {
			Some(Surface::Graph)
		} else if self.doc.is_some() {
			Some(Surface::Mindmap)
		} else {
			None
		}
	}
}

pub fn device_pixel_ratio() -> f64 {
	web_sys::window()
		.map(|w| w.device_pixel_ratio())
		.unwrap_or(1.0)
		.max(1.0)
}

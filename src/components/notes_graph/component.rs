use std::cell::RefCell;
use std::rc::Rc;

use leptos::ev;
use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, MouseEvent, WheelEvent};

use super::render;
use super::state::GraphState;
use super::types::{GraphData, GraphInbound, GraphIntent};
use crate::bridge::{self, HostBridge};
use crate::config::GraphConfig;

/// Toolbar height the host page reserves above the canvas.
const CHROME_HEIGHT: f64 = 48.0;

type Shared<T> = Rc<RefCell<Option<T>>>;

fn pointer(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// CSS size of the canvas, falling back to the window when it has not been laid out.
fn css_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	let window = web_sys::window();
	let inner = |f: fn(&web_sys::Window) -> Result<JsValue, JsValue>| {
		window
			.as_ref()
			.and_then(|w| f(w).ok())
			.and_then(|v| v.as_f64())
			.unwrap_or(0.0)
	};
	let w = match canvas.client_width() {
		0 => inner(web_sys::Window::inner_width),
		w => w as f64,
	};
	let h = match canvas.client_height() {
		0 => inner(web_sys::Window::inner_height) - CHROME_HEIGHT,
		h => h as f64,
	};
	(w.max(1.0), h.max(1.0))
}

fn set_cursor(canvas: &HtmlCanvasElement, cursor: &str) {
	// `ElementExt::style` from the leptos prelude shadows the web-sys getter.
	let _ = HtmlElement::style(canvas).set_property("cursor", cursor);
}

fn redraw(state: &Shared<GraphState>, ctx: &Shared<CanvasRenderingContext2d>) {
	if let (Some(s), Some(c)) = (&*state.borrow(), &*ctx.borrow()) {
		render::render(s, c);
	}
}

/// Pan/zoom canvas over the tag/file graph. `data` seeds the view before the
/// host pushes its first update.
#[component]
pub fn NotesGraphCanvas(
	data: GraphData,
	#[prop(optional)] config: GraphConfig,
	/// Handles intents in place of the host; a returned model replaces the
	/// current one.
	#[prop(default = None)]
	on_intent: Option<Callback<GraphIntent, Option<GraphData>>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Shared<GraphState> = Rc::new(RefCell::new(None));
	let ctx: Shared<CanvasRenderingContext2d> = Rc::new(RefCell::new(None));
	let host = HostBridge::get();

	let (state_init, ctx_init) = (state.clone(), ctx.clone());
	let initial = RefCell::new(Some(data));
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(context) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::warn!("canvas 2d context unavailable");
			return;
		};
		*ctx_init.borrow_mut() = Some(context);

		let dpr = bridge::device_pixel_ratio();
		let (w, h) = css_size(&canvas);
		canvas.set_width((w * dpr).floor() as u32);
		canvas.set_height((h * dpr).floor() as u32);
		let mut graph = GraphState::new(config.clone(), w, h, dpr);
		if let Some(data) = initial.borrow_mut().take() {
			if !data.nodes.is_empty() {
				graph.replace_data(data, &mut rand::thread_rng());
			}
		}
		*state_init.borrow_mut() = Some(graph);
		redraw(&state_init, &ctx_init);
	});

	let (state_rs, ctx_rs) = (state.clone(), ctx.clone());
	let resize = window_event_listener(ev::resize, move |_| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (w, h) = css_size(&canvas);
		if let Some(ref mut s) = *state_rs.borrow_mut() {
			canvas.set_width((w * s.dpr).floor() as u32);
			canvas.set_height((h * s.dpr).floor() as u32);
			s.resize(w, h);
		}
		redraw(&state_rs, &ctx_rs);
	});

	// Drags continue outside the canvas, so move/up are tracked on the window.
	let (state_mm, ctx_mm) = (state.clone(), ctx.clone());
	let mousemove = window_event_listener(ev::mousemove, move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let (x, y) = pointer(&canvas, &ev);
		let moved = match *state_mm.borrow_mut() {
			Some(ref mut s) => s.pointer_move(x, y),
			None => false,
		};
		if moved {
			redraw(&state_mm, &ctx_mm);
		}
	});
	let (state_mu, ctx_mu) = (state.clone(), ctx.clone());
	let mouseup = window_event_listener(ev::mouseup, move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let (x, y) = pointer(&canvas, &ev);
		let intent = match *state_mu.borrow_mut() {
			Some(ref mut s) => s.pointer_up(x, y),
			None => None,
		};
		set_cursor(&canvas, "grab");
		let Some(intent) = intent else {
			return;
		};
		let Some(local) = on_intent else {
			host.send(&intent);
			return;
		};
		if let Some(data) = local.run(intent) {
			if let Some(ref mut s) = *state_mu.borrow_mut() {
				s.replace_data(data, &mut rand::thread_rng());
			}
			redraw(&state_mu, &ctx_mu);
		}
	});

	let (state_msg, ctx_msg) = (state.clone(), ctx.clone());
	let messages = bridge::listen(move |msg: GraphInbound| {
		let GraphInbound::Graph { data } = msg;
		if let Some(ref mut s) = *state_msg.borrow_mut() {
			s.replace_data(data, &mut rand::thread_rng());
		}
		redraw(&state_msg, &ctx_msg);
	});

	on_cleanup(move || {
		for handle in [resize, mousemove, mouseup, messages] {
			handle.remove();
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = pointer(&canvas, &ev);
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(x, y);
		}
		set_cursor(&canvas, "grabbing");
	};

	let (state_wh, ctx_wh) = (state.clone(), ctx.clone());
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = pointer(&canvas, &ev);
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.wheel(x, y, ev.delta_y());
		}
		redraw(&state_wh, &ctx_wh);
	};

	let (state_dc, ctx_dc) = (state.clone(), ctx.clone());
	let on_dblclick = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_dc.borrow_mut() {
			s.fit_to_view();
		}
		redraw(&state_dc, &ctx_dc);
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="notes-graph-canvas"
			on:mousedown=on_mousedown
			on:wheel=on_wheel
			on:dblclick=on_dblclick
			style="display: block; width: 100%; height: 100%; cursor: grab;"
		/>
	}
}

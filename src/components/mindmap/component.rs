use std::collections::HashMap;

use leptos::ev;
use leptos::html::{Div, Textarea};
use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{
	Element, HtmlElement, HtmlTextAreaElement, KeyboardEvent, MouseEvent, PointerEvent,
	ResizeObserver, WheelEvent,
};

use super::geometry::EdgeGeometry;
use super::pending::PickKind;
use super::state::{MindmapCore, Repaint};
use super::types::{MindmapDoc, MindmapInbound, MindmapOutbound, NodeId};
use crate::bridge::{self, HostBridge};
use crate::components::input::{
	BoxSize, KeyChord, PointerInputSource, PointerSample, PointerTarget, SizeObserver,
};
use crate::config::MindmapConfig;
use crate::ids::RandomIds;

const EDGE_COLOR: &str = "#909399";

type Core = StoredValue<MindmapCore, LocalStorage>;
type Observer = StoredValue<Option<ResizeObserver>, LocalStorage>;

/// Change counters the view subscribes to. `view` covers anything a block
/// can update in place; `blocks` forces block contents to be rebuilt.
#[derive(Clone, Copy)]
struct Revisions {
	view: RwSignal<u64>,
	blocks: RwSignal<u64>,
}

impl Revisions {
	fn new() -> Self {
		Self {
			view: RwSignal::new(0),
			blocks: RwSignal::new(0),
		}
	}

	fn apply(self, repaint: Repaint) {
		if repaint >= Repaint::Blocks {
			self.blocks.update(|r| *r += 1);
		}
		if repaint >= Repaint::View {
			self.view.update(|r| *r += 1);
		}
	}
}

fn run(core: Core, revs: Revisions, f: impl FnOnce(&mut MindmapCore) -> Repaint) {
	revs.apply(core.try_update_value(f).unwrap_or_default());
}

fn post(msg: &MindmapOutbound) {
	HostBridge::get().send(msg);
}

struct DomCapture(Element);

impl PointerInputSource for DomCapture {
	fn capture(&mut self, pointer_id: i32) {
		if let Err(err) = self.0.set_pointer_capture(pointer_id) {
			log::debug!("pointer capture failed: {err:?}");
		}
	}

	fn release(&mut self, pointer_id: i32) {
		let _ = self.0.release_pointer_capture(pointer_id);
	}
}

/// Layout sizes of every rendered block, read in one pass.
struct DomSizes(HashMap<String, BoxSize>);

impl DomSizes {
	fn collect(root: &Element) -> Self {
		let mut sizes = HashMap::new();
		let Ok(blocks) = root.query_selector_all(".node") else {
			return Self(sizes);
		};
		for i in 0..blocks.length() {
			let Some(el) = blocks.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
				continue;
			};
			if let Some(id) = el.get_attribute("data-id") {
				let size = BoxSize {
					w: el.offset_width() as f64,
					h: el.offset_height() as f64,
				};
				sizes.insert(id, size);
			}
		}
		Self(sizes)
	}
}

impl SizeObserver for DomSizes {
	fn measure(&self, node_id: &str) -> Option<BoxSize> {
		self.0.get(node_id).copied()
	}
}

fn sample(ev: &PointerEvent, origin: &Element) -> PointerSample {
	let rect = origin.get_bounding_client_rect();
	PointerSample {
		pointer_id: ev.pointer_id(),
		x: ev.client_x() as f64 - rect.left(),
		y: ev.client_y() as f64 - rect.top(),
		movement_x: ev.movement_x() as f64,
		movement_y: ev.movement_y() as f64,
	}
}

fn classify(ev: &PointerEvent) -> PointerTarget {
	let Some(el) = ev.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
		return PointerTarget::Block;
	};
	let within = |selector: &str| el.closest(selector).ok().flatten().is_some();
	if within("button, a") {
		PointerTarget::Control
	} else if within("textarea, figure, figcaption") {
		PointerTarget::Editable
	} else {
		PointerTarget::Block
	}
}

fn editing(ev: &KeyboardEvent) -> bool {
	ev.target()
		.and_then(|t| t.dyn_into::<HtmlElement>().ok())
		.is_some_and(|el| el.is_content_editable() || matches!(el.tag_name().as_str(), "TEXTAREA" | "INPUT"))
}

fn basename(path: &str) -> &str {
	path.rsplit(['/', '\\']).find(|s| !s.is_empty()).unwrap_or(path)
}

fn autosize(ta: &HtmlTextAreaElement, min_height: f64) {
	// `ElementExt::style` from the leptos prelude shadows the web-sys getter.
	let style = HtmlElement::style(ta);
	let _ = style.set_property("height", "auto");
	let h = (ta.scroll_height() as f64).max(min_height);
	let _ = style.set_property("height", &format!("{h}px"));
}

/// One observer for all blocks; any block resize re-measures every block and
/// redraws edges when something moved.
fn block_observer(core: Core, revs: Revisions, wrap: NodeRef<Div>) -> Option<ResizeObserver> {
	let callback = Closure::<dyn FnMut()>::new(move || {
		let Some(root) = wrap.get_untracked() else {
			return;
		};
		let sizes = DomSizes::collect(&root);
		let (w, h) = (root.client_width() as f64, root.client_height() as f64);
		run(core, revs, |c| {
			c.set_viewport(w, h);
			c.resync_sizes(&sizes)
		});
	});
	match ResizeObserver::new(callback.as_ref().unchecked_ref()) {
		Ok(observer) => {
			callback.forget();
			Some(observer)
		}
		Err(err) => {
			log::warn!("ResizeObserver unavailable, edges use default box sizes: {err:?}");
			None
		}
	}
}

fn edge_view(edge: EdgeGeometry) -> impl IntoView {
	view! {
		<g data-edge=edge.id.clone()>
			<line
				x1=edge.from.0.to_string()
				y1=edge.from.1.to_string()
				x2=edge.to.0.to_string()
				y2=edge.to.1.to_string()
				stroke=EDGE_COLOR
				stroke-width="2"
			/>
			<polygon points=edge.arrow_points() fill=EDGE_COLOR />
		</g>
	}
}

/// Block-and-edge editor for one mindmap document.
#[component]
pub fn MindmapEditor(
	doc: MindmapDoc,
	/// Document path shown in the toolbar.
	#[prop(optional)]
	rel_path: String,
	/// Relative image path -> displayable URL.
	#[prop(optional)]
	image_sources: HashMap<String, String>,
	#[prop(optional)] config: MindmapConfig,
) -> impl IntoView {
	let core: Core = StoredValue::new_local(MindmapCore::new(
		doc,
		image_sources,
		config,
		Box::new(RandomIds),
	));
	let revs = Revisions::new();
	let wrap_ref = NodeRef::<Div>::new();
	let observer: Observer = StoredValue::new_local(block_observer(core, revs, wrap_ref));

	Effect::new(move |_| {
		let Some(wrap) = wrap_ref.get() else {
			return;
		};
		observer.with_value(|o| {
			if let Some(o) = o {
				o.observe(&wrap);
			}
		});
	});

	let keys = window_event_listener(ev::keydown, move |ev: KeyboardEvent| {
		if let Some(wrap) = wrap_ref.get_untracked() {
			let (w, h) = (wrap.client_width() as f64, wrap.client_height() as f64);
			core.update_value(|c| c.set_viewport(w, h));
		}
		let chord = KeyChord {
			key: ev.key(),
			command: ev.ctrl_key() || ev.meta_key(),
			editing: editing(&ev),
		};
		let Some(resp) = core.try_update_value(|c| c.key(&chord)) else {
			return;
		};
		if resp.handled {
			ev.prevent_default();
		}
		revs.apply(resp.repaint);
		if let Some(msg) = resp.message {
			post(&msg);
		}
	});
	on_cleanup(move || keys.remove());

	let messages = bridge::listen(move |msg: MindmapInbound| {
		log::debug!("host: {msg:?}");
		run(core, revs, |c| c.apply(msg));
	});
	on_cleanup(move || messages.remove());

	let on_pointerdown = move |ev: PointerEvent| {
		let Some(wrap) = wrap_ref.get_untracked() else {
			return;
		};
		let s = sample(&ev, &wrap);
		let mut capture = DomCapture(wrap.into());
		run(core, revs, |c| c.background_pointer_down(s, &mut capture));
	};
	let on_pointermove = move |ev: PointerEvent| {
		let Some(wrap) = wrap_ref.get_untracked() else {
			return;
		};
		let s = sample(&ev, &wrap);
		run(core, revs, |c| {
			c.track_pointer(s.x, s.y);
			c.background_pointer_move(s)
		});
	};
	let on_pointerup = move |ev: PointerEvent| {
		let Some(wrap) = wrap_ref.get_untracked() else {
			return;
		};
		let s = sample(&ev, &wrap);
		let mut capture = DomCapture(wrap.into());
		core.update_value(|c| c.background_pointer_up(s, &mut capture));
	};
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(wrap) = wrap_ref.get_untracked() else {
			return;
		};
		let rect = wrap.get_bounding_client_rect();
		let (sx, sy) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);
		let command = ev.ctrl_key() || ev.meta_key();
		run(core, revs, |c| c.wheel(sx, sy, ev.delta_x(), ev.delta_y(), command));
	};

	let rel_label = if rel_path.is_empty() {
		String::new()
	} else {
		format!("({rel_path})")
	};

	view! {
		<div class="mindmap" style="display: flex; flex-direction: column; width: 100%; height: 100%;">
			<div class="toolbar">
				<button
					id="add"
					class="btn"
					type="button"
					on:click=move |_| {
						run(core, revs, |c| {
							c.add_node(&mut rand::thread_rng());
							Repaint::Blocks
						})
					}
				>
					"Add"
				</button>
				<button
					id="connect"
					class="btn"
					type="button"
					class:active=move || {
						revs.view.track();
						core.with_value(|c| c.mode().is_active())
					}
					on:click=move |_| run(core, revs, MindmapCore::toggle_connect)
				>
					"Connect"
				</button>
				<button id="save" class="btn" type="button" on:click=move |_| post(&core.with_value(MindmapCore::save))>
					"Save"
				</button>
				<span id="modeHint">
					{move || {
						revs.view.track();
						core.with_value(|c| c.mode().hint())
					}}
				</span>
				<span id="relpath">{rel_label}</span>
			</div>
			<div
				id="wrap"
				node_ref=wrap_ref
				style="position: relative; overflow: hidden; flex: 1; touch-action: none;"
				on:pointerdown=on_pointerdown
				on:pointermove=on_pointermove
				on:pointerup=on_pointerup
				on:wheel=on_wheel
			>
				<div
					id="stage"
					style="position: absolute; left: 0; top: 0; transform-origin: 0 0;"
					style:transform=move || {
						revs.view.track();
						core.with_value(|c| c.transform.css())
					}
				>
					<svg
						id="edges"
						width="1"
						height="1"
						style="position: absolute; left: 0; top: 0; overflow: visible; pointer-events: none;"
					>
						{move || {
							revs.view.track();
							core.with_value(MindmapCore::edges).into_iter().map(edge_view).collect_view()
						}}
					</svg>
					<div id="canvas">
						<For
							each=move || {
								revs.blocks.track();
								core.with_value(|c| {
									c.doc.nodes.iter().map(|n| n.id.clone()).collect::<Vec<_>>()
								})
							}
							key=|id| id.clone()
							children=move |id: NodeId| {
								view! { <MindmapBlock id=id core=core revs=revs observer=observer /> }
							}
						/>
					</div>
				</div>
			</div>
		</div>
	}
}

#[component]
fn MindmapBlock(id: NodeId, core: Core, revs: Revisions, observer: Observer) -> impl IntoView {
	let Some(node) = core.with_value(|c| c.doc.node(&id).cloned()) else {
		return ().into_any();
	};
	let min_height = core.with_value(|c| c.config.min_body_height);
	let block_ref = NodeRef::<Div>::new();
	let body_ref = NodeRef::<Textarea>::new();

	let observed: StoredValue<Option<HtmlElement>, LocalStorage> = StoredValue::new_local(None);
	Effect::new(move |_| {
		if let Some(el) = block_ref.get() {
			observer.with_value(|o| {
				if let Some(o) = o {
					o.observe(&el);
				}
			});
			observed.set_value(Some(el.into()));
		}
	});
	// Deleted blocks must not stay referenced by the shared observer.
	on_cleanup(move || {
		let Some(Some(el)) = observed.try_get_value() else {
			return;
		};
		observer.try_with_value(|o| {
			if let Some(o) = o {
				o.unobserve(&el);
			}
		});
	});
	let auto_body = node.body_h.is_none();
	Effect::new(move |_| {
		if let Some(ta) = body_ref.get() {
			if auto_body {
				autosize(&ta, min_height);
			}
		}
	});

	let position = {
		let id = id.clone();
		move || {
			revs.view.track();
			core.with_value(|c| c.doc.node(&id).map(|n| (n.x, n.y)).unwrap_or_default())
		}
	};
	let left = {
		let position = position.clone();
		move || format!("{}px", position().0)
	};
	let top = move || format!("{}px", position().1);
	let highlighted = {
		let id = id.clone();
		move || {
			revs.view.track();
			core.with_value(|c| c.is_highlighted(&id))
		}
	};

	let on_pointerdown = {
		let id = id.clone();
		move |ev: PointerEvent| {
			ev.stop_propagation();
			let Some(el) = block_ref.get_untracked() else {
				return;
			};
			let target = classify(&ev);
			let s = sample(&ev, &el);
			let mut capture = DomCapture(el.into());
			run(core, revs, |c| c.node_pointer_down(&id, target, s, &mut capture));
		}
	};
	let on_pointermove = move |ev: PointerEvent| {
		let Some(el) = block_ref.get_untracked() else {
			return;
		};
		let s = sample(&ev, &el);
		run(core, revs, |c| c.node_pointer_move(s));
	};
	let on_pointerup = move |ev: PointerEvent| {
		let Some(el) = block_ref.get_untracked() else {
			return;
		};
		let s = sample(&ev, &el);
		let mut capture = DomCapture(el.into());
		run(core, revs, |c| c.node_pointer_up(s, &mut capture));
	};
	let on_click = {
		let id = id.clone();
		move |ev: MouseEvent| {
			if core.with_value(|c| c.mode().is_active()) {
				ev.stop_propagation();
				run(core, revs, |c| c.node_click(&id));
			}
		}
	};

	let on_title = {
		let id = id.clone();
		move |ev: ev::Event| {
			let text = event_target::<HtmlElement>(&ev).inner_text();
			core.update_value(|c| c.set_title(&id, text));
		}
	};
	let pick = |kind: PickKind| {
		let id = id.clone();
		move |ev: MouseEvent| {
			ev.stop_propagation();
			if let Some(msg) = core.try_update_value(|c| c.request_pick(&id, kind)).flatten() {
				post(&msg);
			}
		}
	};
	let on_delete = {
		let id = id.clone();
		move |ev: MouseEvent| {
			ev.stop_propagation();
			run(core, revs, |c| c.delete_node(&id));
		}
	};

	let on_body = {
		let id = id.clone();
		move |ev: ev::Event| {
			let ta = event_target::<HtmlTextAreaElement>(&ev);
			let auto = core
				.try_update_value(|c| {
					c.set_body(&id, ta.value());
					c.doc.node(&id).is_some_and(|n| n.body_h.is_none())
				})
				.unwrap_or(false);
			if auto {
				autosize(&ta, min_height);
			}
		}
	};
	// A user resize shows up as a height change across one press of the grip.
	let pressed_height = StoredValue::new(0);
	let on_body_down = move |_: PointerEvent| {
		if let Some(ta) = body_ref.get_untracked() {
			pressed_height.set_value(ta.offset_height());
		}
	};
	let on_body_up = {
		let id = id.clone();
		move |_: PointerEvent| {
			let Some(ta) = body_ref.get_untracked() else {
				return;
			};
			let h = ta.offset_height();
			if h != pressed_height.get_value() {
				core.update_value(|c| c.set_body_height(&id, h as f64));
			}
		}
	};
	let body_height = node
		.body_h
		.map(|h| format!("{}px", h.max(min_height)))
		.unwrap_or_default();

	let figure = {
		let id = id.clone();
		move || {
			revs.blocks.track();
			let (image, src) = core.with_value(|c| {
				let image = c.doc.node(&id)?.image.clone()?;
				let src = c.image_src(&image.path);
				Some((image, src))
			})?;
			let (remove_id, caption_id) = (id.clone(), id.clone());
			Some(view! {
				<figure class="imgBox" style="position: relative;">
					<img src=src draggable="false" style:object-fit=image.fit.as_css() />
					<button
						class="remove"
						type="button"
						title="Remove image"
						style="position: absolute; right: 4px; top: 4px;"
						on:click=move |ev: MouseEvent| {
							ev.stop_propagation();
							ev.prevent_default();
							run(core, revs, |c| c.remove_image(&remove_id));
						}
					>
						"×"
					</button>
				</figure>
				<figcaption
					class="caption"
					contenteditable="true"
					on:input=move |ev: ev::Event| {
						let text = event_target::<HtmlElement>(&ev).inner_text();
						core.update_value(|c| c.set_caption(&caption_id, text));
					}
				>
					{image.caption.unwrap_or_default()}
				</figcaption>
			})
		}
	};

	let chips = {
		let id = id.clone();
		move || {
			revs.blocks.track();
			let files = core.with_value(|c| c.doc.node(&id).map(|n| n.files.clone()).unwrap_or_default());
			files
				.into_iter()
				.enumerate()
				.map(|(index, path)| {
					let id = id.clone();
					let label = basename(&path).to_owned();
					let open = path.clone();
					view! {
						<div class="link-item">
							<a
								href="#"
								title=path
								on:click=move |ev: MouseEvent| {
									ev.prevent_default();
									ev.stop_propagation();
									post(&core.with_value(|c| c.open_file(&open)));
								}
							>
								{label}
							</a>
							<button
								class="remove"
								type="button"
								title="Remove link"
								on:click=move |ev: MouseEvent| {
									ev.stop_propagation();
									run(core, revs, |c| c.remove_file(&id, index));
								}
							>
								"×"
							</button>
						</div>
					}
				})
				.collect_view()
		}
	};

	let title = if node.title.is_empty() {
		"Untitled".to_owned()
	} else {
		node.title.clone()
	};

	view! {
		<div
			class="node"
			class:selected=highlighted
			data-id=id.clone()
			node_ref=block_ref
			style="position: absolute; cursor: grab;"
			style:left=left
			style:top=top
			on:pointerdown=on_pointerdown
			on:pointermove=on_pointermove
			on:pointerup=on_pointerup
			on:click=on_click
		>
			<div class="row">
				<div
					class="title"
					contenteditable="true"
					on:input=on_title
					on:keydown=|ev: KeyboardEvent| {
						if ev.key() == "Enter" {
							ev.prevent_default();
						}
					}
				>
					{title}
				</div>
				<button class="btn" type="button" title="Link" on:click=pick(PickKind::Markdown)>
					"Link"
				</button>
				<button class="btn" type="button" title="Delete" on:click=on_delete>
					"Delete"
				</button>
				<button class="btn" type="button" title="Image" on:click=pick(PickKind::Image)>
					"Image"
				</button>
			</div>
			<div class="body">
				<textarea
					node_ref=body_ref
					prop:value=node.body.clone()
					style:height=body_height
					on:input=on_body
					on:pointerdown=on_body_down
					on:pointerup=on_body_up
				></textarea>
			</div>
			{figure}
			<div class="links">{chips}</div>
		</div>
	}
	.into_any()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_basename_handles_both_separators() {
		assert_eq!(basename("notes/daily/today.md"), "today.md");
		assert_eq!(basename("notes\\win.md"), "win.md");
		assert_eq!(basename("plain.md"), "plain.md");
		assert_eq!(basename("trailing/"), "trailing");
	}
}

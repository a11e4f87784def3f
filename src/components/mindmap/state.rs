use std::collections::HashMap;

use rand::Rng;

use super::clipboard::{Clipboard, Paste};
use super::connect::{ConnectMode, ConnectStep};
use super::geometry::{self, ArrowStyle, EdgeGeometry};
use super::pending::{PendingPicks, PickKind};
use super::types::{
	MindmapDoc, MindmapEdge, MindmapInbound, MindmapNode, MindmapOutbound, NodeId, NodeImage,
};
use crate::components::input::{
	BoxSize, KeyChord, PointerInputSource, PointerSample, PointerTarget, SizeObserver,
};
use crate::components::transform::ViewTransform;
use crate::config::MindmapConfig;
use crate::ids::IdGenerator;

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

/// How much of the editor needs redrawing after a handler ran.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Repaint {
	#[default]
	None,
	/// Positions, transform, selection, mode, or edges changed.
	View,
	/// Nodes were added, removed, or had content replaced from outside the block.
	Blocks,
}

impl Repaint {
	pub fn and(self, other: Repaint) -> Repaint {
		self.max(other)
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyResponse {
	pub repaint: Repaint,
	pub message: Option<MindmapOutbound>,
	/// The browser's default action should be suppressed.
	pub handled: bool,
}

impl KeyResponse {
	fn handled(repaint: Repaint) -> Self {
		Self {
			repaint,
			message: None,
			handled: true,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
struct Drag {
	node: NodeId,
	pointer_id: i32,
}

/// Editor state for one mindmap document, independent of the DOM.
pub struct MindmapCore {
	pub doc: MindmapDoc,
	pub transform: ViewTransform,
	pub config: MindmapConfig,
	/// Relative image path -> displayable URL.
	image_sources: HashMap<String, String>,
	sizes: HashMap<NodeId, BoxSize>,
	selected: Option<NodeId>,
	mode: ConnectMode,
	clipboard: Clipboard,
	pending: PendingPicks,
	/// Last pointer position in world space, paste target.
	last_pointer: Option<(f64, f64)>,
	drag: Option<Drag>,
	panning: Option<i32>,
	viewport: (f64, f64),
	ids: Box<dyn IdGenerator>,
}

impl MindmapCore {
	pub fn new(
		mut doc: MindmapDoc,
		image_sources: HashMap<String, String>,
		config: MindmapConfig,
		ids: Box<dyn IdGenerator>,
	) -> Self {
		doc.migrate();
		log::info!(
			"mindmap loaded: {} nodes, {} edges",
			doc.nodes.len(),
			doc.edges.len()
		);
		Self {
			doc,
			transform: ViewTransform::identity(),
			config: config.normalized(),
			image_sources,
			sizes: HashMap::new(),
			selected: None,
			mode: ConnectMode::Normal,
			clipboard: Clipboard::default(),
			pending: PendingPicks::default(),
			last_pointer: None,
			drag: None,
			panning: None,
			viewport: (0.0, 0.0),
			ids,
		}
	}

	pub fn selected(&self) -> Option<&str> {
		self.selected.as_deref()
	}

	pub fn mode(&self) -> &ConnectMode {
		&self.mode
	}

	/// Selected, or the pending connect source.
	pub fn is_highlighted(&self, id: &str) -> bool {
		self.selected() == Some(id) || self.mode.source() == Some(id)
	}

	pub fn is_dragging(&self) -> bool {
		self.drag.is_some()
	}

	pub fn is_pending(&self, id: &str) -> bool {
		self.pending.is_pending(id)
	}

	pub fn image_src(&self, path: &str) -> String {
		self.image_sources
			.get(path)
			.cloned()
			.unwrap_or_else(|| path.to_owned())
	}

	pub fn set_viewport(&mut self, width: f64, height: f64) {
		self.viewport = (width, height);
	}

	fn default_box(&self) -> BoxSize {
		BoxSize {
			w: self.config.default_box_w,
			h: self.config.default_box_h,
		}
	}

	pub fn box_size(&self, id: &str) -> BoxSize {
		self.sizes.get(id).copied().unwrap_or(self.default_box())
	}

	pub fn edges(&self) -> Vec<EdgeGeometry> {
		geometry::layout_edges(
			&self.doc,
			&self.sizes,
			self.default_box(),
			ArrowStyle {
				length: self.config.arrow_length,
				half_width: self.config.arrow_half_width,
			},
		)
	}

	// --- Geometry observation ---

	/// Record a measured block size. Edges only move when it actually changed.
	pub fn set_box_size(&mut self, id: &str, size: BoxSize) -> Repaint {
		if self.doc.node(id).is_none() || self.sizes.get(id) == Some(&size) {
			return Repaint::None;
		}
		self.sizes.insert(id.to_owned(), size);
		Repaint::View
	}

	pub fn resync_sizes(&mut self, observer: &dyn SizeObserver) -> Repaint {
		self.sizes.retain(|id, _| self.doc.node(id).is_some());
		let ids: Vec<NodeId> = self.doc.nodes.iter().map(|n| n.id.clone()).collect();
		ids.iter()
			.filter_map(|id| Some(self.set_box_size(id, observer.measure(id)?)))
			.fold(Repaint::None, Repaint::and)
	}

	/// Persist an observed text-area height.
	pub fn set_body_height(&mut self, id: &str, height: f64) {
		if let Some(node) = self.doc.node_mut(id) {
			node.body_h = Some(height.round());
		}
	}

	// --- Node content ---

	pub fn add_node(&mut self, rng: &mut impl Rng) -> NodeId {
		let id = self.ids.next_id('n');
		self.doc.nodes.push(MindmapNode {
			id: id.clone(),
			x: 120.0 + rng.gen_range(0.0..80.0),
			y: 100.0 + rng.gen_range(0.0..60.0),
			title: "New block".into(),
			..Default::default()
		});
		id
	}

	pub fn set_title(&mut self, id: &str, title: String) {
		if let Some(node) = self.doc.node_mut(id) {
			node.title = title;
		}
	}

	pub fn set_body(&mut self, id: &str, body: String) {
		if let Some(node) = self.doc.node_mut(id) {
			node.body = body;
		}
	}

	pub fn set_caption(&mut self, id: &str, caption: String) {
		if let Some(image) = self.doc.node_mut(id).and_then(|n| n.image.as_mut()) {
			image.caption = Some(caption);
		}
	}

	pub fn remove_file(&mut self, id: &str, index: usize) -> Repaint {
		match self.doc.node_mut(id) {
			Some(node) if index < node.files.len() => {
				node.files.remove(index);
				Repaint::Blocks
			}
			_ => Repaint::None,
		}
	}

	pub fn remove_image(&mut self, id: &str) -> Repaint {
		match self.doc.node_mut(id) {
			Some(node) if node.image.is_some() => {
				node.image = None;
				Repaint::Blocks
			}
			_ => Repaint::None,
		}
	}

	/// Delete a node, the edges touching it, and every transient reference to it.
	pub fn delete_node(&mut self, id: &str) -> Repaint {
		if !self.doc.remove_node(id) {
			return Repaint::None;
		}
		self.sizes.remove(id);
		self.clipboard.forget(id);
		self.mode.forget(id);
		self.pending.cancel(id);
		if self.selected() == Some(id) {
			self.selected = None;
		}
		if self.drag.as_ref().is_some_and(|d| d.node == id) {
			self.drag = None;
		}
		Repaint::Blocks
	}

	// --- Selection and direct manipulation ---

	pub fn select(&mut self, id: &str) -> Repaint {
		if self.selected() == Some(id) || self.doc.node(id).is_none() {
			return Repaint::None;
		}
		self.selected = Some(id.to_owned());
		Repaint::View
	}

	pub fn clear_selection(&mut self) -> Repaint {
		match self.selected.take() {
			Some(_) => Repaint::View,
			None => Repaint::None,
		}
	}

	/// Press on a block. Controls are left alone; editable children select
	/// without dragging so text editing and clicks keep working.
	pub fn node_pointer_down(
		&mut self,
		id: &str,
		target: PointerTarget,
		sample: PointerSample,
		capture: &mut dyn PointerInputSource,
	) -> Repaint {
		if target == PointerTarget::Control {
			return Repaint::None;
		}
		let repaint = self.select(id);
		if target == PointerTarget::Editable || self.doc.node(id).is_none() {
			return repaint;
		}
		capture.capture(sample.pointer_id);
		self.drag = Some(Drag {
			node: id.to_owned(),
			pointer_id: sample.pointer_id,
		});
		repaint.and(Repaint::View)
	}

	/// Moves the dragged block by the pointer delta in world units.
	pub fn node_pointer_move(&mut self, sample: PointerSample) -> Repaint {
		let Some(drag) = &self.drag else {
			return Repaint::None;
		};
		if drag.pointer_id != sample.pointer_id {
			return Repaint::None;
		}
		let k = self.transform.k;
		let Some(node) = self.doc.node_mut(&drag.node) else {
			return Repaint::None;
		};
		node.x += sample.movement_x / k;
		node.y += sample.movement_y / k;
		Repaint::View
	}

	pub fn node_pointer_up(
		&mut self,
		sample: PointerSample,
		capture: &mut dyn PointerInputSource,
	) -> Repaint {
		match self.drag.take() {
			Some(drag) if drag.pointer_id == sample.pointer_id => {
				capture.release(sample.pointer_id);
				Repaint::View
			}
			other => {
				self.drag = other;
				Repaint::None
			}
		}
	}

	/// Click on a block; only meaningful in connect mode.
	pub fn node_click(&mut self, id: &str) -> Repaint {
		match self.mode.click(id) {
			ConnectStep::Ignored => Repaint::None,
			ConnectStep::SourceSelected | ConnectStep::Cancelled => Repaint::View,
			ConnectStep::Connect { from, to } => {
				let id = self.ids.next_id('e');
				log::debug!("edge {id}: {from} -> {to}");
				self.doc.edges.push(MindmapEdge {
					id,
					from,
					to,
					label: None,
				});
				Repaint::View
			}
		}
	}

	pub fn toggle_connect(&mut self) -> Repaint {
		self.mode.toggle();
		Repaint::View
	}

	/// Press on empty canvas: deselect and start panning.
	pub fn background_pointer_down(
		&mut self,
		sample: PointerSample,
		capture: &mut dyn PointerInputSource,
	) -> Repaint {
		capture.capture(sample.pointer_id);
		self.panning = Some(sample.pointer_id);
		self.clear_selection()
	}

	pub fn background_pointer_move(&mut self, sample: PointerSample) -> Repaint {
		if self.panning != Some(sample.pointer_id) {
			return Repaint::None;
		}
		self.transform.pan_by(sample.movement_x, sample.movement_y);
		Repaint::View
	}

	pub fn background_pointer_up(
		&mut self,
		sample: PointerSample,
		capture: &mut dyn PointerInputSource,
	) {
		if self.panning == Some(sample.pointer_id) {
			capture.release(sample.pointer_id);
			self.panning = None;
		}
	}

	/// Remember where the pointer is, in world space, for paste.
	pub fn track_pointer(&mut self, sx: f64, sy: f64) {
		self.last_pointer = Some(self.transform.screen_to_world(sx, sy));
	}

	// --- View ---

	/// Command-wheel zooms at the pointer, plain wheel scrolls the canvas.
	pub fn wheel(&mut self, sx: f64, sy: f64, dx: f64, dy: f64, command: bool) -> Repaint {
		if command {
			let factor = ViewTransform::wheel_factor(self.config.wheel_base, dy);
			self.transform
				.zoom_by(factor, self.config.zoom_range(), sx, sy);
		} else {
			self.transform.pan_by(-dx, -dy);
		}
		Repaint::View
	}

	pub fn zoom_step(&mut self, zoom_in: bool) -> Repaint {
		let factor = if zoom_in {
			self.config.zoom_step
		} else {
			1.0 / self.config.zoom_step
		};
		let (cx, cy) = (self.viewport.0 / 2.0, self.viewport.1 / 2.0);
		self.transform
			.zoom_by(factor, self.config.zoom_range(), cx, cy);
		Repaint::View
	}

	pub fn reset_view(&mut self) -> Repaint {
		self.transform = ViewTransform::identity();
		Repaint::View
	}

	// --- Clipboard ---

	fn copy_offset(&self) -> (f64, f64) {
		(self.config.copy_offset_x, self.config.copy_offset_y)
	}

	pub fn copy_selected(&mut self) -> bool {
		let offset = self.copy_offset();
		match self.selected.as_deref().and_then(|id| self.doc.node(id)) {
			Some(node) => {
				self.clipboard.copy(node, offset);
				true
			}
			None => false,
		}
	}

	pub fn cut_selected(&mut self) -> bool {
		let offset = self.copy_offset();
		match self.selected.as_deref().and_then(|id| self.doc.node(id)) {
			Some(node) => {
				self.clipboard.cut(node, offset);
				true
			}
			None => false,
		}
	}

	pub fn paste(&mut self) -> Repaint {
		match self.clipboard.paste(self.last_pointer) {
			None => Repaint::None,
			Some(Paste::Relocate { id, x, y }) => match self.doc.node_mut(&id) {
				Some(node) => {
					node.x = x;
					node.y = y;
					self.selected = Some(id);
					Repaint::Blocks
				}
				None => Repaint::None,
			},
			Some(Paste::Insert { snapshot, x, y }) => {
				let id = self.ids.next_id('n');
				let title = if snapshot.title.is_empty() {
					"Pasted".to_owned()
				} else {
					snapshot.title
				};
				self.doc.nodes.push(MindmapNode {
					id: id.clone(),
					x,
					y,
					title,
					body: snapshot.body,
					files: snapshot.files,
					..Default::default()
				});
				self.selected = Some(id);
				Repaint::Blocks
			}
		}
	}

	// --- Host messages ---

	pub fn save(&self) -> MindmapOutbound {
		MindmapOutbound::SaveMindmap {
			data: self.doc.clone(),
		}
	}

	pub fn open_file(&self, path: &str) -> MindmapOutbound {
		MindmapOutbound::OpenFile {
			path: path.to_owned(),
		}
	}

	/// Ask the host for a file or image for a node. A request still waiting
	/// on the host is superseded, so an unanswered dialog never locks the node.
	pub fn request_pick(&mut self, id: &str, kind: PickKind) -> Option<MindmapOutbound> {
		self.doc.node(id)?;
		if let Some(previous) = self.pending.request(id, kind) {
			log::debug!("{previous:?} pick for {id} superseded");
		}
		let for_node = id.to_owned();
		Some(match kind {
			PickKind::Markdown => MindmapOutbound::PickMarkdown { for_node },
			PickKind::Image => MindmapOutbound::PickImage { for_node },
		})
	}

	/// Apply a pick response. Stale responses and cancelled dialogs change nothing.
	pub fn apply(&mut self, msg: MindmapInbound) -> Repaint {
		match msg {
			MindmapInbound::PickedMarkdown { for_node, path } => {
				if !self.pending.resolve(&for_node, PickKind::Markdown) {
					log::debug!("stale markdown pick for {for_node}");
					return Repaint::None;
				}
				let (Some(path), Some(node)) = (path, self.doc.node_mut(&for_node)) else {
					return Repaint::None;
				};
				match node.link_file(&path) {
					true => Repaint::Blocks,
					false => Repaint::None,
				}
			}
			MindmapInbound::PickedImage {
				for_node,
				path,
				src,
			} => {
				if !self.pending.resolve(&for_node, PickKind::Image) {
					log::debug!("stale image pick for {for_node}");
					return Repaint::None;
				}
				let (Some(path), Some(node)) = (path, self.doc.node_mut(&for_node)) else {
					return Repaint::None;
				};
				node.image.get_or_insert_with(NodeImage::default).path = path.clone();
				let src = src.unwrap_or_else(|| path.clone());
				self.image_sources.insert(path, src);
				Repaint::Blocks
			}
		}
	}

	// --- Keyboard ---

	pub fn key(&mut self, chord: &KeyChord) -> KeyResponse {
		let key = chord.key_lower();
		if chord.command {
			return match key.as_str() {
				"s" => KeyResponse {
					repaint: Repaint::None,
					message: Some(self.save()),
					handled: true,
				},
				"0" => KeyResponse::handled(self.reset_view()),
				"+" | "=" => KeyResponse::handled(self.zoom_step(true)),
				"-" => KeyResponse::handled(self.zoom_step(false)),
				// Leave copy/paste inside text fields to the browser.
				_ if chord.editing => KeyResponse::default(),
				"c" => KeyResponse {
					handled: self.copy_selected(),
					..Default::default()
				},
				"x" => KeyResponse {
					handled: self.cut_selected(),
					..Default::default()
				},
				"v" => KeyResponse::handled(self.paste()),
				_ => KeyResponse::default(),
			};
		}
		match key.as_str() {
			"escape" => {
				self.mode.cancel();
				KeyResponse {
					repaint: Repaint::View,
					..Default::default()
				}
			}
			"delete" if !chord.editing => match self.selected.clone() {
				Some(id) => KeyResponse::handled(self.delete_node(&id)),
				None => KeyResponse::default(),
			},
			_ => KeyResponse::default(),
		}
	}
}

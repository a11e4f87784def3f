use std::collections::HashMap;
use std::f64::consts::PI;

use rand::Rng;

use super::types::{GraphData, GraphIntent, GraphNode, NodeKind};
use crate::components::transform::{Bounds, ViewTransform};
use crate::config::GraphConfig;

pub const TAG_RADIUS: f64 = 12.0;
pub const FILE_RADIUS: f64 = 8.0;

pub fn node_radius(kind: NodeKind) -> f64 {
	match kind {
		NodeKind::Tag => TAG_RADIUS,
		NodeKind::File => FILE_RADIUS,
	}
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

pub struct GraphState {
	pub data: GraphData,
	pub transform: ViewTransform,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
	pub dpr: f64,
	pub config: GraphConfig,
	/// Seeded positions by node key, kept across model replacements.
	positions: HashMap<String, (f64, f64)>,
	fitted_once: bool,
}

impl GraphState {
	pub fn new(config: GraphConfig, width: f64, height: f64, dpr: f64) -> Self {
		Self {
			data: GraphData::default(),
			transform: ViewTransform::identity(),
			pan: PanState::default(),
			width,
			height,
			dpr: dpr.max(1.0),
			config: config.normalized(),
			positions: HashMap::new(),
			fitted_once: false,
		}
	}

	/// Swap in a new model wholesale. Only the first model of the session
	/// reframes the view; later ones keep the user's pan and zoom.
	pub fn replace_data(&mut self, data: GraphData, rng: &mut impl Rng) {
		self.data = data;
		self.seed_positions(rng);
		if !self.fitted_once {
			self.fit_to_view();
			self.fitted_once = true;
		}
		log::info!(
			"graph model: {} nodes, {} links",
			self.data.nodes.len(),
			self.data.links.len()
		);
	}

	/// Give every node without coordinates a position: the one it had earlier
	/// in the session, or a fresh seed. Tags go on a ring, files on a jittered
	/// grid. Nodes that arrive with coordinates keep them.
	pub fn seed_positions(&mut self, rng: &mut impl Rng) {
		let total = self.data.nodes.len();
		let slots = total.max(6) as f64;
		let cfg = &self.config;
		let mut i = 0usize;
		for node in &mut self.data.nodes {
			if let Some(pos) = node.position() {
				self.positions.insert(node.key.clone(), pos);
				continue;
			}
			let (x, y) = match self.positions.get(&node.key) {
				Some(&pos) => pos,
				None => {
					let seeded = match node.kind {
						NodeKind::Tag => {
							let angle = i as f64 / slots * PI * 2.0;
							(angle.cos() * cfg.tag_ring_rx, angle.sin() * cfg.tag_ring_ry)
						}
						NodeKind::File => {
							let half = (cfg.grid_columns / 2) as f64;
							let col = (i % cfg.grid_columns) as f64;
							let row = (i / cfg.grid_columns) as f64;
							(
								(col - half) * cfg.grid_dx + jitter(rng, cfg.jitter),
								(row - half) * cfg.grid_dy + jitter(rng, cfg.jitter),
							)
						}
					};
					i += 1;
					self.positions.insert(node.key.clone(), seeded);
					seeded
				}
			};
			node.x = Some(x);
			node.y = Some(y);
		}
	}

	/// Frame every node in the viewport. No-op on an empty graph.
	pub fn fit_to_view(&mut self) -> bool {
		let Some(bounds) = Bounds::from_points(self.data.nodes.iter().filter_map(GraphNode::position))
		else {
			return false;
		};
		self.transform.fit_bounds(
			bounds,
			(self.width, self.height),
			self.config.fit_padding,
			self.config.fit_range(),
		)
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		self.transform.screen_to_world(sx, sy)
	}

	/// Topmost node under a screen point. Later nodes are drawn on top, so
	/// they win.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<&GraphNode> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.data.nodes.iter().rev().find(|node| {
			let Some((x, y)) = node.position() else {
				return false;
			};
			let (dx, dy) = (gx - x, gy - y);
			let reach = node_radius(node.kind) + self.config.hit_tolerance;
			dx * dx + dy * dy <= reach * reach
		})
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	/// Returns whether the view moved.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) -> bool {
		if !self.pan.active {
			return false;
		}
		self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
		self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		true
	}

	/// Ends a press. Short presses are clicks and may produce an intent; longer
	/// ones were drags and never do.
	pub fn pointer_up(&mut self, sx: f64, sy: f64) -> Option<GraphIntent> {
		if !self.pan.active {
			return None;
		}
		self.pan.active = false;
		let moved = (sx - self.pan.start_x).hypot(sy - self.pan.start_y);
		if moved >= self.config.click_slop {
			return None;
		}
		self.click(sx, sy)
	}

	fn click(&self, sx: f64, sy: f64) -> Option<GraphIntent> {
		let node = self.node_at_position(sx, sy)?;
		Some(match node.kind {
			NodeKind::Tag => GraphIntent::ToggleTag {
				tag: node.label.clone(),
			},
			NodeKind::File => GraphIntent::Open {
				key: node.key.clone(),
			},
		})
	}

	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = ViewTransform::wheel_factor(self.config.wheel_base, delta_y);
		self.transform
			.zoom_by(factor, self.config.zoom_range(), sx, sy);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

fn jitter(rng: &mut impl Rng, amount: f64) -> f64 {
	if amount <= 0.0 {
		return 0.0;
	}
	rng.gen_range(-amount..amount)
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;
	use crate::components::notes_graph::types::{GraphLink, LinkKind};

	fn node(id: usize, key: &str, kind: NodeKind) -> GraphNode {
		GraphNode {
			id,
			key: key.into(),
			label: key.trim_start_matches("tag:").into(),
			kind,
			x: None,
			y: None,
		}
	}

	fn placed(id: usize, key: &str, kind: NodeKind, x: f64, y: f64) -> GraphNode {
		GraphNode {
			x: Some(x),
			y: Some(y),
			..node(id, key, kind)
		}
	}

	fn state() -> GraphState {
		GraphState::new(GraphConfig::default(), 800.0, 600.0, 2.0)
	}

	fn rng() -> StdRng {
		StdRng::seed_from_u64(7)
	}

	#[test]
	fn test_seed_tags_on_ring_files_on_grid() {
		let mut s = state();
		s.data.nodes = vec![
			node(0, "tag:a", NodeKind::Tag),
			node(1, "file:///b.md", NodeKind::File),
			placed(2, "tag:c", NodeKind::Tag, 3.0, 4.0),
		];
		s.seed_positions(&mut rng());

		assert_eq!(s.data.nodes[0].position(), Some((380.0, 0.0)));
		let (fx, fy) = s.data.nodes[1].position().unwrap();
		assert!((fx - (1.0 - 4.0) * 120.0).abs() <= 5.0);
		assert!((fy - (0.0 - 4.0) * 80.0).abs() <= 5.0);
		assert_eq!(s.data.nodes[2].position(), Some((3.0, 4.0)));
	}

	#[test]
	fn test_positions_survive_model_replacement() {
		let mut s = state();
		let data = GraphData {
			nodes: vec![node(0, "file:///a.md", NodeKind::File)],
			links: vec![],
		};
		s.replace_data(data.clone(), &mut rng());
		let first = s.data.nodes[0].position();

		let mut next = data;
		next.nodes.insert(0, node(0, "tag:new", NodeKind::Tag));
		next.nodes[1].id = 1;
		s.replace_data(next, &mut StdRng::seed_from_u64(99));
		assert_eq!(s.data.nodes[1].position(), first);
	}

	#[test]
	fn test_fit_only_on_first_model() {
		let mut s = state();
		let data = GraphData {
			nodes: vec![
				placed(0, "tag:a", NodeKind::Tag, -100.0, -50.0),
				placed(1, "tag:b", NodeKind::Tag, 100.0, 50.0),
			],
			links: vec![],
		};
		s.replace_data(data.clone(), &mut rng());
		let (cx, cy) = s.transform.world_to_screen(0.0, 0.0);
		assert!((cx - 400.0).abs() < 1e-9 && (cy - 300.0).abs() < 1e-9);

		s.transform.pan_by(40.0, 0.0);
		let before = s.transform;
		s.replace_data(data, &mut rng());
		assert_eq!(s.transform, before);
	}

	#[test]
	fn test_host_overrides_cannot_break_seeding_or_fit() {
		let cfg: GraphConfig = serde_json::from_str(r#"{"zoomMin":2.5,"gridColumns":0}"#).unwrap();
		let mut s = GraphState::new(cfg, 800.0, 600.0, 1.0);
		let data = GraphData {
			nodes: vec![
				node(0, "file:///a.md", NodeKind::File),
				node(1, "file:///b.md", NodeKind::File),
				node(2, "tag:a", NodeKind::Tag),
			],
			links: vec![],
		};
		s.replace_data(data, &mut rng());
		assert!(s.data.nodes.iter().all(|n| n.position().is_some()));
		assert_eq!(s.transform.k, 2.5);
	}

	#[test]
	fn test_fit_empty_graph_is_noop() {
		let mut s = state();
		assert!(!s.fit_to_view());
		assert_eq!(s.transform, ViewTransform::identity());
	}

	#[test]
	fn test_hit_prefers_topmost() {
		let mut s = state();
		s.data.nodes = vec![
			placed(0, "file:///under.md", NodeKind::File, 0.0, 0.0),
			placed(1, "file:///over.md", NodeKind::File, 2.0, 0.0),
		];
		let hit = s.node_at_position(1.0, 0.0).map(|n| n.key.clone());
		assert_eq!(hit.as_deref(), Some("file:///over.md"));
		let again = s.node_at_position(1.0, 0.0).map(|n| n.key.clone());
		assert_eq!(hit, again);
	}

	#[test]
	fn test_hit_radius_includes_tolerance() {
		let mut s = state();
		s.data.nodes = vec![placed(0, "tag:t", NodeKind::Tag, 0.0, 0.0)];
		assert!(s.node_at_position(15.0, 0.0).is_some());
		assert!(s.node_at_position(15.1, 0.0).is_none());
		s.transform.k = 2.0;
		assert!(s.node_at_position(30.0, 0.0).is_some());
	}

	#[test]
	fn test_click_emits_intent_by_kind() {
		let mut s = state();
		s.data.nodes = vec![
			placed(0, "tag:rust", NodeKind::Tag, 0.0, 0.0),
			placed(1, "file:///a.md", NodeKind::File, 100.0, 0.0),
		];
		s.pointer_down(1.0, 1.0);
		assert_eq!(
			s.pointer_up(2.0, 1.0),
			Some(GraphIntent::ToggleTag { tag: "rust".into() })
		);
		s.pointer_down(100.0, 0.0);
		assert_eq!(
			s.pointer_up(100.0, 0.0),
			Some(GraphIntent::Open {
				key: "file:///a.md".into()
			})
		);
		s.pointer_down(50.0, 50.0);
		assert_eq!(s.pointer_up(50.0, 50.0), None);
	}

	#[test]
	fn test_drag_never_clicks() {
		let mut s = state();
		s.data.nodes = vec![placed(0, "tag:rust", NodeKind::Tag, 0.0, 0.0)];
		s.pointer_down(0.0, 0.0);
		assert!(s.pointer_move(3.0, 0.0));
		assert_eq!(s.transform.x, 3.0);
		assert_eq!(s.pointer_up(3.0, 0.0), None);
		assert!(!s.pan.active);

		s.pointer_down(0.0, 0.0);
		s.pointer_move(2.0, 0.0);
		assert!(s.pointer_up(2.0, 0.0).is_some());
	}

	#[test]
	fn test_move_without_press_is_ignored() {
		let mut s = state();
		assert!(!s.pointer_move(10.0, 10.0));
		assert_eq!(s.pointer_up(10.0, 10.0), None);
	}

	#[test]
	fn test_wheel_zoom_anchor() {
		let mut s = state();
		let before = s.screen_to_graph(200.0, 100.0);
		s.wheel(200.0, 100.0, -120.0);
		assert!(s.transform.k > 1.0);
		let after = s.screen_to_graph(200.0, 100.0);
		assert!((before.0 - after.0).abs() < 1e-9);
		assert!((before.1 - after.1).abs() < 1e-9);
		s.wheel(200.0, 100.0, 100_000.0);
		assert_eq!(s.transform.k, 0.2);
	}

	#[test]
	fn test_dangling_links_are_data_not_errors() {
		let mut s = state();
		let data = GraphData {
			nodes: vec![node(0, "tag:a", NodeKind::Tag)],
			links: vec![GraphLink {
				source: 0,
				target: 9,
				kind: LinkKind::TagTag,
				weight: Some(1),
			}],
		};
		s.replace_data(data, &mut rng());
		assert_eq!(s.data.links.len(), 1);
	}
}

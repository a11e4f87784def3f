use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::{GraphState, node_radius};
use super::types::NodeKind;

const LINK_COLOR: &str = "#c9d1d9";
const TAG_COLOR: &str = "#b47af7";
const FILE_COLOR: &str = "#a1e3b1";
const LABEL_COLOR: &str = "#444";
const LABEL_PX: f64 = 12.0;
const LABEL_GAP: f64 = 6.0;

fn node_color(kind: NodeKind) -> &'static str {
	match kind {
		NodeKind::Tag => TAG_COLOR,
		NodeKind::File => FILE_COLOR,
	}
}

/// Full redraw. The backing store is in device pixels; everything drawn here
/// is in world units under the view transform.
pub fn render(state: &GraphState, ctx: &CanvasRenderingContext2d) {
	let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
	ctx.clear_rect(
		0.0,
		0.0,
		state.width * state.dpr,
		state.height * state.dpr,
	);
	let [a, b, c, d, e, f] = state.transform.device_matrix(state.dpr);
	let _ = ctx.set_transform(a, b, c, d, e, f);
	draw_links(state, ctx);
	draw_nodes(state, ctx);
	draw_labels(state, ctx);
}

fn draw_links(state: &GraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_line_width(1.0 / state.transform.k);
	ctx.set_stroke_style_str(LINK_COLOR);
	let nodes = &state.data.nodes;
	for link in &state.data.links {
		let (Some(a), Some(b)) = (nodes.get(link.source), nodes.get(link.target)) else {
			continue;
		};
		let (Some((x1, y1)), Some((x2, y2))) = (a.position(), b.position()) else {
			continue;
		};
		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(x2, y2);
		ctx.stroke();
	}
}

fn draw_nodes(state: &GraphState, ctx: &CanvasRenderingContext2d) {
	for node in &state.data.nodes {
		let Some((x, y)) = node.position() else {
			continue;
		};
		ctx.begin_path();
		ctx.set_fill_style_str(node_color(node.kind));
		let _ = ctx.arc(x, y, node_radius(node.kind), 0.0, 2.0 * PI);
		ctx.fill();
	}
}

fn draw_labels(state: &GraphState, ctx: &CanvasRenderingContext2d) {
	// Divide by scale so labels keep the same on-screen size at any zoom.
	ctx.set_font(&format!(
		"{}px Rubik, system-ui, sans-serif",
		LABEL_PX / state.transform.k
	));
	ctx.set_text_align("left");
	ctx.set_text_baseline("middle");
	ctx.set_fill_style_str(LABEL_COLOR);
	for node in &state.data.nodes {
		if node.label.is_empty() {
			continue;
		}
		let Some((x, y)) = node.position() else {
			continue;
		};
		let _ = ctx.fill_text(&node.label, x + node_radius(node.kind) + LABEL_GAP, y);
	}
}

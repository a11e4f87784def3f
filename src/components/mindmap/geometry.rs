//! Edge placement between block centers.

use std::collections::HashMap;

use super::types::{MindmapDoc, NodeId};
use crate::components::input::BoxSize;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrowStyle {
	/// Distance from the tip back to the arrowhead base.
	pub length: f64,
	pub half_width: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeGeometry {
	pub id: String,
	pub from: (f64, f64),
	pub to: (f64, f64),
	/// Tip first, then the two base corners.
	pub arrow: [(f64, f64); 3],
}

impl EdgeGeometry {
	/// SVG `points` attribute for the arrowhead.
	pub fn arrow_points(&self) -> String {
		self.arrow
			.iter()
			.map(|(x, y)| format!("{x},{y}"))
			.collect::<Vec<_>>()
			.join(" ")
	}
}

pub fn box_center(pos: (f64, f64), size: BoxSize) -> (f64, f64) {
	(pos.0 + size.w / 2.0, pos.1 + size.h / 2.0)
}

/// Triangle with its tip at `to`, pointing along `from -> to`.
pub fn arrow_head(from: (f64, f64), to: (f64, f64), style: ArrowStyle) -> [(f64, f64); 3] {
	let angle = (to.1 - from.1).atan2(to.0 - from.0);
	let (sin, cos) = angle.sin_cos();
	let base = (to.0 - cos * style.length, to.1 - sin * style.length);
	let (px, py) = (-sin * style.half_width, cos * style.half_width);
	[to, (base.0 + px, base.1 + py), (base.0 - px, base.1 - py)]
}

/// Geometry for every edge whose endpoints both exist. Unmeasured blocks use
/// `fallback`.
pub fn layout_edges(
	doc: &MindmapDoc,
	sizes: &HashMap<NodeId, BoxSize>,
	fallback: BoxSize,
	style: ArrowStyle,
) -> Vec<EdgeGeometry> {
	let center = |id: &str| {
		let node = doc.node(id)?;
		let size = sizes.get(id).copied().unwrap_or(fallback);
		Some(box_center((node.x, node.y), size))
	};
	doc.edges
		.iter()
		.filter_map(|edge| {
			let from = center(&edge.from)?;
			let to = center(&edge.to)?;
			Some(EdgeGeometry {
				id: edge.id.clone(),
				from,
				to,
				arrow: arrow_head(from, to, style),
			})
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::mindmap::types::{MindmapEdge, MindmapNode};

	const STYLE: ArrowStyle = ArrowStyle {
		length: 10.0,
		half_width: 5.0,
	};
	const FALLBACK: BoxSize = BoxSize { w: 180.0, h: 80.0 };

	fn close(a: (f64, f64), b: (f64, f64)) -> bool {
		(a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
	}

	fn doc() -> MindmapDoc {
		let node = |id: &str, x: f64, y: f64| MindmapNode {
			id: id.into(),
			x,
			y,
			..Default::default()
		};
		let edge = |id: &str, from: &str, to: &str| MindmapEdge {
			id: id.into(),
			from: from.into(),
			to: to.into(),
			label: None,
		};
		MindmapDoc {
			nodes: vec![node("a", 0.0, 0.0), node("b", 300.0, 0.0)],
			edges: vec![edge("e1", "a", "b"), edge("e2", "a", "ghost")],
			..Default::default()
		}
	}

	#[test]
	fn test_arrow_points_back_along_edge() {
		let [tip, left, right] = arrow_head((0.0, 0.0), (100.0, 0.0), STYLE);
		assert!(close(tip, (100.0, 0.0)));
		assert!(close(left, (90.0, 5.0)));
		assert!(close(right, (90.0, -5.0)));
	}

	#[test]
	fn test_arrow_is_symmetric_on_diagonals() {
		let [tip, left, right] = arrow_head((0.0, 0.0), (30.0, 40.0), STYLE);
		let mid = ((left.0 + right.0) / 2.0, (left.1 + right.1) / 2.0);
		assert!(close(mid, (24.0, 32.0)));
		let half = ((left.0 - mid.0).powi(2) + (left.1 - mid.1).powi(2)).sqrt();
		assert!((half - 5.0).abs() < 1e-9);
		assert!(close(tip, (30.0, 40.0)));
	}

	#[test]
	fn test_layout_uses_measured_or_default_centers() {
		let mut sizes = HashMap::new();
		sizes.insert("b".to_string(), BoxSize { w: 100.0, h: 40.0 });
		let edges = layout_edges(&doc(), &sizes, FALLBACK, STYLE);
		assert_eq!(edges.len(), 1);
		assert!(close(edges[0].from, (90.0, 40.0)));
		assert!(close(edges[0].to, (350.0, 20.0)));
	}

	#[test]
	fn test_arrow_points_attribute() {
		let edge = EdgeGeometry {
			id: "e".into(),
			from: (0.0, 0.0),
			to: (1.0, 2.0),
			arrow: [(1.0, 2.0), (3.5, 4.0), (5.0, 6.0)],
		};
		assert_eq!(edge.arrow_points(), "1,2 3.5,4 5,6");
	}
}

//! Engine tuning, overridable from the bootstrap payload's `config` key.

use serde::Deserialize;

use crate::components::transform::ZoomRange;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
	pub graph: GraphConfig,
	pub mindmap: MindmapConfig,
}

impl EngineConfig {
	/// Bring host overrides back into ranges the engines can run with.
	pub fn normalized(self) -> Self {
		Self {
			graph: self.graph.normalized(),
			mindmap: self.mindmap.normalized(),
		}
	}
}

/// Falls back to `default` unless `value` is finite and positive.
fn positive(value: f64, default: f64) -> f64 {
	if value.is_finite() && value > 0.0 {
		value
	} else {
		default
	}
}

/// Finite, positive, ordered zoom bounds.
fn zoom_bounds(min: f64, max: f64, default: (f64, f64)) -> (f64, f64) {
	let (min, max) = (positive(min, default.0), positive(max, default.1));
	(min.min(max), min.max(max))
}

/// Wheel bases at or below one would invert or freeze the wheel.
fn wheel_base(value: f64, default: f64) -> f64 {
	if value.is_finite() && value > 1.0 {
		value
	} else {
		default
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphConfig {
	pub zoom_min: f64,
	pub zoom_max: f64,
	/// Upper scale bound used when fitting; lower than `zoom_max` so a tiny graph
	/// is not blown up.
	pub fit_max_scale: f64,
	pub fit_padding: f64,
	pub wheel_base: f64,
	/// Pointer travel (CSS px) below which a press-release counts as a click.
	pub click_slop: f64,
	pub hit_tolerance: f64,
	pub tag_ring_rx: f64,
	pub tag_ring_ry: f64,
	pub grid_columns: usize,
	pub grid_dx: f64,
	pub grid_dy: f64,
	pub jitter: f64,
	/// Node ceiling applied by the index builder.
	pub max_nodes: usize,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			zoom_min: 0.2,
			zoom_max: 4.0,
			fit_max_scale: 2.0,
			fit_padding: 60.0,
			wheel_base: 1.0015,
			click_slop: 3.0,
			hit_tolerance: 3.0,
			tag_ring_rx: 380.0,
			tag_ring_ry: 280.0,
			grid_columns: 8,
			grid_dx: 120.0,
			grid_dy: 80.0,
			jitter: 5.0,
			max_nodes: 500,
		}
	}
}

impl GraphConfig {
	pub fn normalized(self) -> Self {
		let d = Self::default();
		let (zoom_min, zoom_max) = zoom_bounds(self.zoom_min, self.zoom_max, (d.zoom_min, d.zoom_max));
		let non_negative = |v: f64, default: f64| if v.is_finite() && v >= 0.0 { v } else { default };
		Self {
			zoom_min,
			zoom_max,
			fit_max_scale: positive(self.fit_max_scale, d.fit_max_scale),
			fit_padding: non_negative(self.fit_padding, d.fit_padding),
			wheel_base: wheel_base(self.wheel_base, d.wheel_base),
			click_slop: non_negative(self.click_slop, d.click_slop),
			hit_tolerance: non_negative(self.hit_tolerance, d.hit_tolerance),
			grid_columns: self.grid_columns.max(1),
			jitter: non_negative(self.jitter, d.jitter),
			max_nodes: self.max_nodes.max(1),
			..self
		}
	}

	pub fn zoom_range(&self) -> ZoomRange {
		ZoomRange::new(self.zoom_min, self.zoom_max)
	}

	/// Zoom range for fitting: capped at `fit_max_scale`, never below `zoom_min`.
	pub fn fit_range(&self) -> ZoomRange {
		let cap = self.fit_max_scale.min(self.zoom_max).max(self.zoom_min);
		ZoomRange::new(self.zoom_min, cap)
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MindmapConfig {
	pub zoom_min: f64,
	pub zoom_max: f64,
	pub zoom_step: f64,
	pub wheel_base: f64,
	pub default_box_w: f64,
	pub default_box_h: f64,
	pub min_body_height: f64,
	pub copy_offset_x: f64,
	pub copy_offset_y: f64,
	pub arrow_length: f64,
	pub arrow_half_width: f64,
}

impl Default for MindmapConfig {
	fn default() -> Self {
		Self {
			zoom_min: 0.3,
			zoom_max: 2.5,
			zoom_step: 1.1,
			wheel_base: 1.0015,
			default_box_w: 180.0,
			default_box_h: 80.0,
			min_body_height: 28.0,
			copy_offset_x: 20.0,
			copy_offset_y: 10.0,
			arrow_length: 10.0,
			arrow_half_width: 5.0,
		}
	}
}

impl MindmapConfig {
	pub fn normalized(self) -> Self {
		let d = Self::default();
		let (zoom_min, zoom_max) = zoom_bounds(self.zoom_min, self.zoom_max, (d.zoom_min, d.zoom_max));
		Self {
			zoom_min,
			zoom_max,
			zoom_step: wheel_base(self.zoom_step, d.zoom_step),
			wheel_base: wheel_base(self.wheel_base, d.wheel_base),
			default_box_w: positive(self.default_box_w, d.default_box_w),
			default_box_h: positive(self.default_box_h, d.default_box_h),
			..self
		}
	}

	pub fn zoom_range(&self) -> ZoomRange {
		ZoomRange::new(self.zoom_min, self.zoom_max)
	}
}

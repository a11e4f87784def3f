//! World-to-screen affine transform shared by both engines.
//!
//! `screen = world * k + (x, y)`. Everything above the device step works in
//! CSS pixels; device pixel ratio is folded in only by [`ViewTransform::device_matrix`].

/// Inclusive scale bounds for a view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomRange {
	pub min: f64,
	pub max: f64,
}

impl ZoomRange {
	pub const fn new(min: f64, max: f64) -> Self {
		Self { min, max }
	}

	/// Clamp into the range. An inverted range pins to `min` instead of panicking.
	pub fn clamp(&self, k: f64) -> f64 {
		k.min(self.max).max(self.min)
	}
}

/// Axis-aligned bounding box in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub min_x: f64,
	pub min_y: f64,
	pub max_x: f64,
	pub max_y: f64,
}

impl Bounds {
	/// Bounding box of a point set, `None` when empty.
	pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
		points.into_iter().fold(None, |acc, (x, y)| {
			Some(match acc {
				None => Bounds {
					min_x: x,
					min_y: y,
					max_x: x,
					max_y: y,
				},
				Some(b) => Bounds {
					min_x: b.min_x.min(x),
					min_y: b.min_y.min(y),
					max_x: b.max_x.max(x),
					max_y: b.max_y.max(y),
				},
			})
		})
	}

	pub fn width(&self) -> f64 {
		self.max_x - self.min_x
	}

	pub fn height(&self) -> f64 {
		self.max_y - self.min_y
	}

	pub fn center(&self) -> (f64, f64) {
		(
			(self.min_x + self.max_x) / 2.0,
			(self.min_y + self.max_y) / 2.0,
		)
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self::identity()
	}
}

impl ViewTransform {
	pub const fn identity() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}

	pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
		(wx * self.k + self.x, wy * self.k + self.y)
	}

	/// Screen-space pan; the same pixel delta regardless of scale.
	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.x += dx;
		self.y += dy;
	}

	/// Rescale to `k` (clamped) keeping the world point under `(sx, sy)` fixed.
	pub fn zoom_to(&mut self, k: f64, range: ZoomRange, sx: f64, sy: f64) {
		let (wx, wy) = self.screen_to_world(sx, sy);
		self.k = range.clamp(k);
		self.x = sx - wx * self.k;
		self.y = sy - wy * self.k;
	}

	pub fn zoom_by(&mut self, factor: f64, range: ZoomRange, sx: f64, sy: f64) {
		self.zoom_to(self.k * factor, range, sx, sy);
	}

	/// Exponential wheel response: `base^(-delta_y)`.
	pub fn wheel_factor(base: f64, delta_y: f64) -> f64 {
		base.powf(-delta_y)
	}

	/// Frame `bounds` (grown by `padding` on every side) inside a viewport and
	/// center it. Returns `false` and leaves the transform alone when the
	/// padded box or the viewport is degenerate.
	pub fn fit_bounds(
		&mut self,
		bounds: Bounds,
		viewport: (f64, f64),
		padding: f64,
		range: ZoomRange,
	) -> bool {
		let (vw, vh) = viewport;
		let (w, h) = (
			bounds.width() + padding * 2.0,
			bounds.height() + padding * 2.0,
		);
		if w <= 0.0 || h <= 0.0 || vw <= 0.0 || vh <= 0.0 {
			return false;
		}
		self.k = range.clamp((vw / w).min(vh / h));
		let (cx, cy) = bounds.center();
		self.x = vw / 2.0 - cx * self.k;
		self.y = vh / 2.0 - cy * self.k;
		true
	}

	/// Canvas `setTransform` arguments `(a, b, c, d, e, f)` for a device pixel ratio.
	pub fn device_matrix(&self, dpr: f64) -> [f64; 6] {
		[
			dpr * self.k,
			0.0,
			0.0,
			dpr * self.k,
			dpr * self.x,
			dpr * self.y,
		]
	}

	/// CSS `transform` value for a DOM stage with `transform-origin: 0 0`.
	pub fn css(&self) -> String {
		format!("translate({}px, {}px) scale({})", self.x, self.y, self.k)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	const EPS: f64 = 1e-6;

	#[test]
	fn test_round_trip_screen_world() {
		let t = ViewTransform {
			x: 30.0,
			y: -12.0,
			k: 1.7,
		};
		let (wx, wy) = t.screen_to_world(100.0, 50.0);
		let (sx, sy) = t.world_to_screen(wx, wy);
		assert!((sx - 100.0).abs() < EPS);
		assert!((sy - 50.0).abs() < EPS);
	}

	#[test]
	fn test_zoom_clamps_to_range() {
		let mut t = ViewTransform::identity();
		let range = ZoomRange::new(0.2, 4.0);
		t.zoom_to(10.0, range, 0.0, 0.0);
		assert_eq!(t.k, 4.0);
		t.zoom_to(0.01, range, 0.0, 0.0);
		assert_eq!(t.k, 0.2);
	}

	#[test]
	fn test_inverted_range_does_not_panic() {
		let range = ZoomRange::new(2.5, 2.0);
		assert_eq!(range.clamp(1.0), 2.5);
		assert_eq!(range.clamp(3.0), 2.5);
	}

	#[test]
	fn test_fit_ignores_degenerate_viewport() {
		let mut t = ViewTransform::identity();
		let bounds = Bounds::from_points([(0.0, 0.0), (10.0, 10.0)]).unwrap();
		assert!(!t.fit_bounds(bounds, (0.0, 600.0), 60.0, ZoomRange::new(0.2, 2.0)));
		assert_eq!(t, ViewTransform::identity());
	}

	#[test]
	fn test_device_matrix_only_scales_by_dpr() {
		let t = ViewTransform {
			x: 5.0,
			y: 7.0,
			k: 2.0,
		};
		assert_eq!(t.device_matrix(2.0), [4.0, 0.0, 0.0, 4.0, 10.0, 14.0]);
		assert_eq!(t.device_matrix(1.0), [2.0, 0.0, 0.0, 2.0, 5.0, 7.0]);
	}

	#[test]
	fn test_bounds_empty() {
		assert!(Bounds::from_points(std::iter::empty()).is_none());
	}

	proptest! {
		#[test]
		fn zoom_keeps_world_point_under_pointer(
			x in -500.0f64..500.0,
			y in -500.0f64..500.0,
			k in 0.2f64..4.0,
			sx in 0.0f64..1200.0,
			sy in 0.0f64..800.0,
			next in 0.2f64..4.0,
		) {
			let mut t = ViewTransform { x, y, k };
			let before = t.screen_to_world(sx, sy);
			t.zoom_to(next, ZoomRange::new(0.2, 4.0), sx, sy);
			let after = t.screen_to_world(sx, sy);
			prop_assert!((before.0 - after.0).abs() < 1e-6);
			prop_assert!((before.1 - after.1).abs() < 1e-6);
		}

		#[test]
		fn fit_centers_and_respects_range(
			points in prop::collection::vec((-2000.0f64..2000.0, -2000.0f64..2000.0), 1..40),
			vw in 100.0f64..2000.0,
			vh in 100.0f64..2000.0,
		) {
			let range = ZoomRange::new(0.2, 2.0);
			let bounds = Bounds::from_points(points).unwrap();
			let mut t = ViewTransform::identity();
			prop_assert!(t.fit_bounds(bounds, (vw, vh), 60.0, range));
			prop_assert!(t.k >= range.min && t.k <= range.max);
			let (cx, cy) = bounds.center();
			let (sx, sy) = t.world_to_screen(cx, cy);
			prop_assert!((sx - vw / 2.0).abs() < 1e-6);
			prop_assert!((sy - vh / 2.0).abs() < 1e-6);
		}
	}
}

//! Browser-independent input types.
//!
//! Components translate DOM events into these; cores only ever see these, so
//! they can be driven by synthetic replays in tests.

/// Where a pointer press landed inside a mindmap block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerTarget {
	/// Block chrome or title: selects and starts a drag.
	Block,
	/// Text area, image, or caption: selects, never drags.
	Editable,
	/// Button or link: neither selects nor drags.
	Control,
}

/// One pointer event in screen (CSS pixel) space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
	pub pointer_id: i32,
	pub x: f64,
	pub y: f64,
	pub movement_x: f64,
	pub movement_y: f64,
}

impl PointerSample {
	pub fn at(x: f64, y: f64) -> Self {
		Self {
			pointer_id: 1,
			x,
			y,
			movement_x: 0.0,
			movement_y: 0.0,
		}
	}

	pub fn moved(self, dx: f64, dy: f64) -> Self {
		Self {
			x: self.x + dx,
			y: self.y + dy,
			movement_x: dx,
			movement_y: dy,
			..self
		}
	}
}

/// Key press with the platform command modifier folded in (ctrl or cmd).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyChord {
	pub key: String,
	pub command: bool,
	/// Focus is inside a text field or contenteditable.
	pub editing: bool,
}

impl KeyChord {
	pub fn plain(key: &str) -> Self {
		Self {
			key: key.to_owned(),
			command: false,
			editing: false,
		}
	}

	pub fn command(key: &str) -> Self {
		Self {
			key: key.to_owned(),
			command: true,
			editing: false,
		}
	}

	pub fn key_lower(&self) -> String {
		self.key.to_lowercase()
	}
}

/// Measured size of a rendered block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxSize {
	pub w: f64,
	pub h: f64,
}

/// Pointer capture for direct manipulation; a drag keeps receiving moves after
/// the pointer leaves the element.
pub trait PointerInputSource {
	fn capture(&mut self, pointer_id: i32);
	fn release(&mut self, pointer_id: i32);
}

/// Reports the settled box size of a block once layout has run.
pub trait SizeObserver {
	fn measure(&self, node_id: &str) -> Option<BoxSize>;
}

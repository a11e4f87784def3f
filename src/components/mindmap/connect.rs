use super::types::NodeId;

/// Edge-creation mode. One activation yields at most one edge.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ConnectMode {
	#[default]
	Normal,
	Connecting { source: Option<NodeId> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectStep {
	/// Not in connect mode; the click is an ordinary click.
	Ignored,
	SourceSelected,
	/// Second click on the source; back to waiting for a source.
	Cancelled,
	Connect { from: NodeId, to: NodeId },
}

impl ConnectMode {
	pub fn is_active(&self) -> bool {
		matches!(self, ConnectMode::Connecting { .. })
	}

	pub fn source(&self) -> Option<&str> {
		match self {
			ConnectMode::Connecting { source } => source.as_deref(),
			ConnectMode::Normal => None,
		}
	}

	pub fn toggle(&mut self) {
		*self = match self {
			ConnectMode::Normal => ConnectMode::Connecting { source: None },
			ConnectMode::Connecting { .. } => ConnectMode::Normal,
		};
	}

	pub fn cancel(&mut self) {
		*self = ConnectMode::Normal;
	}

	pub fn click(&mut self, node: &str) -> ConnectStep {
		let ConnectMode::Connecting { source } = self else {
			return ConnectStep::Ignored;
		};
		match source.take() {
			None => {
				*source = Some(node.to_owned());
				ConnectStep::SourceSelected
			}
			Some(from) if from == node => ConnectStep::Cancelled,
			Some(from) => {
				*self = ConnectMode::Normal;
				ConnectStep::Connect {
					from,
					to: node.to_owned(),
				}
			}
		}
	}

	/// Forget a source node that no longer exists.
	pub fn forget(&mut self, node: &str) {
		if let ConnectMode::Connecting { source } = self {
			if source.as_deref() == Some(node) {
				*source = None;
			}
		}
	}

	pub fn hint(&self) -> &'static str {
		match self {
			ConnectMode::Normal => "",
			ConnectMode::Connecting { .. } => {
				"Connect mode: click source node, then target node (Esc to cancel)"
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_same_node_twice_cancels_source() {
		let mut mode = ConnectMode::default();
		mode.toggle();
		assert_eq!(mode.click("a"), ConnectStep::SourceSelected);
		assert_eq!(mode.source(), Some("a"));
		assert_eq!(mode.click("a"), ConnectStep::Cancelled);
		assert_eq!(mode, ConnectMode::Connecting { source: None });
	}

	#[test]
	fn test_two_nodes_connect_and_leave_mode() {
		let mut mode = ConnectMode::default();
		mode.toggle();
		mode.click("a");
		assert_eq!(
			mode.click("b"),
			ConnectStep::Connect {
				from: "a".into(),
				to: "b".into()
			}
		);
		assert_eq!(mode, ConnectMode::Normal);
		assert_eq!(mode.click("c"), ConnectStep::Ignored);
	}

	#[test]
	fn test_toggle_and_cancel() {
		let mut mode = ConnectMode::default();
		mode.toggle();
		assert!(mode.is_active());
		assert!(!mode.hint().is_empty());
		mode.click("a");
		mode.cancel();
		assert_eq!(mode, ConnectMode::Normal);
		mode.toggle();
		mode.toggle();
		assert!(!mode.is_active());
	}

	#[test]
	fn test_forget_deleted_source() {
		let mut mode = ConnectMode::Connecting {
			source: Some("a".into()),
		};
		mode.forget("b");
		assert_eq!(mode.source(), Some("a"));
		mode.forget("a");
		assert_eq!(mode.source(), None);
	}
}

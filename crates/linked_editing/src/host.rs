//! Interfaces the controller needs from the host editor.

use std::sync::Arc;

use lockstep_primitives::{DocumentSnapshot, LinkedRange, TextEdit};
use tracing::warn;

use crate::error::ResolveError;

/// Opaque handle for one rendered decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecorationId(pub u64);

/// A range to mark, with the style name the host should render it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
	pub range: LinkedRange,
	pub style: Arc<str>,
}

/// Editing and rendering surface of the host editor.
///
/// Called from the controller's thread only, never from provider code.
pub trait EditorHost {
	/// Applies a batch of non-overlapping edits, all expressed against the
	/// document the controller last saw.
	///
	/// Returns the resulting snapshot, or `None` if the host refused the edits.
	/// Hosts that also report the applied change as a content event should tag
	/// it with [`EditOrigin::LinkedEditing`](lockstep_primitives::EditOrigin::LinkedEditing).
	fn apply_edits(&mut self, edits: &[TextEdit]) -> Option<DocumentSnapshot>;

	/// Removes every decoration in `old` and adds `new` in one step.
	///
	/// Returns one handle per new decoration.
	fn delta_decorations(&mut self, old: &[DecorationId], new: &[Decoration]) -> Vec<DecorationId>;
}

/// Receives errors that are reported but never propagated.
pub trait UnexpectedErrorSink: Send + Sync {
	fn report(&self, error: &ResolveError);
}

/// Logs unexpected errors through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorSink;

impl UnexpectedErrorSink for TracingErrorSink {
	fn report(&self, error: &ResolveError) {
		warn!(error = %error, "linked_editing.unexpected_error");
	}
}

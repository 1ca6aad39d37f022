use std::sync::Arc;

use lockstep_primitives::LinkedRange;

use crate::host::{Decoration, DecorationId, EditorHost};

/// Decoration handles owned by the controller.
///
/// Always replaced wholesale through a single delta call.
#[derive(Debug, Default)]
pub struct DecorationSet {
	handles: Vec<DecorationId>,
}

impl DecorationSet {
	pub fn handles(&self) -> &[DecorationId] {
		&self.handles
	}

	pub fn is_empty(&self) -> bool {
		self.handles.is_empty()
	}

	/// Replaces every current handle with one decoration per range.
	pub fn replace<H: EditorHost + ?Sized>(&mut self, host: &mut H, ranges: &[LinkedRange], style: &str) {
		let style: Arc<str> = Arc::from(style);
		let decorations: Vec<Decoration> = ranges
			.iter()
			.map(|range| Decoration {
				range: *range,
				style: style.clone(),
			})
			.collect();
		self.handles = host.delta_decorations(&self.handles, &decorations);
	}

	/// Removes every decoration. No host call when nothing is rendered.
	pub fn clear<H: EditorHost + ?Sized>(&mut self, host: &mut H) {
		if self.handles.is_empty() {
			return;
		}
		self.handles = host.delta_decorations(&self.handles, &[]);
	}
}

use async_trait::async_trait;
use lockstep_primitives::{DocumentSnapshot, LinkedRange, TextPosition};
use lockstep_worker::CancellationToken;

use crate::error::ProviderError;

/// Source of linked ranges for a document position (a tag matcher, a language server, ...).
#[async_trait]
pub trait LinkedRangeProvider: Send + Sync {
	/// Name used in logs and error reports.
	fn name(&self) -> &str;

	/// Priority of this provider for `document`. Zero means it does not apply.
	fn score(&self, document: &DocumentSnapshot) -> u32;

	/// Returns the ranges linked to the one under `position`.
	///
	/// The first range should be the one containing `position`. `Ok(None)` and
	/// an empty list both mean "nothing here" and let lower priority providers
	/// answer. Long running providers should watch `cancel`.
	async fn provide_linked_ranges(
		&self,
		document: &DocumentSnapshot,
		position: TextPosition,
		cancel: &CancellationToken,
	) -> Result<Option<Vec<LinkedRange>>, ProviderError>;
}

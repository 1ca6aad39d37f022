//! Range resolution across registered providers.
//!
//! Providers are consulted one at a time in registry order. The first
//! non-empty, well-formed answer wins; failures are reported to the error
//! sink and skipped. Each provider runs on its own task so a panic stays with
//! the provider that raised it. Cancellation is checked before every provider and raced
//! against the provider currently running.

use std::sync::Arc;

use lockstep_primitives::{DocumentSnapshot, LinkedRange, TextPosition};
use lockstep_worker::{CancellationToken, TaskClass, TaskFailure};
use tracing::trace;

use crate::error::{RangeDefect, ResolveError};
use crate::host::UnexpectedErrorSink;
use crate::provider::LinkedRangeProvider;
use crate::registry::ProviderRegistry;

/// Stateless resolver over a provider registry.
#[derive(Clone)]
pub struct RangeResolver {
	registry: Arc<ProviderRegistry>,
	sink: Arc<dyn UnexpectedErrorSink>,
}

impl RangeResolver {
	pub fn new(registry: Arc<ProviderRegistry>, sink: Arc<dyn UnexpectedErrorSink>) -> Self {
		Self { registry, sink }
	}

	pub fn sink(&self) -> &Arc<dyn UnexpectedErrorSink> {
		&self.sink
	}

	/// Captures the providers that currently apply to `document`.
	///
	/// The returned request owns everything it needs and can be moved into a task.
	pub fn request(&self, document: DocumentSnapshot, position: TextPosition) -> ResolutionRequest {
		ResolutionRequest {
			providers: self.registry.ordered_for(&document),
			document,
			position,
			sink: self.sink.clone(),
		}
	}

	/// Resolves linked ranges at `position`.
	pub async fn resolve(&self, document: &DocumentSnapshot, position: TextPosition, cancel: &CancellationToken) -> Option<Vec<LinkedRange>> {
		self.request(document.clone(), position).run(cancel).await
	}
}

/// One-shot resolution without any controller state.
pub async fn resolve_linked_ranges(
	registry: &Arc<ProviderRegistry>,
	document: &DocumentSnapshot,
	position: TextPosition,
	cancel: &CancellationToken,
	sink: Arc<dyn UnexpectedErrorSink>,
) -> Option<Vec<LinkedRange>> {
	RangeResolver::new(registry.clone(), sink).resolve(document, position, cancel).await
}

/// A resolution with its provider list already derived.
pub struct ResolutionRequest {
	providers: Vec<Arc<dyn LinkedRangeProvider>>,
	document: DocumentSnapshot,
	position: TextPosition,
	sink: Arc<dyn UnexpectedErrorSink>,
}

impl ResolutionRequest {
	pub fn provider_count(&self) -> usize {
		self.providers.len()
	}

	/// Queries providers in order until one answers.
	pub async fn run(self, cancel: &CancellationToken) -> Option<Vec<LinkedRange>> {
		for provider in &self.providers {
			if cancel.is_cancelled() {
				trace!(provider = provider.name(), "linked_editing.resolve_cancelled");
				return None;
			}

			let task = {
				let provider = provider.clone();
				let document = self.document.clone();
				let position = self.position;
				let cancel = cancel.clone();
				async move { provider.provide_linked_ranges(&document, position, &cancel).await }
			};
			let result = tokio::select! {
				biased;
				_ = cancel.cancelled() => {
					trace!(provider = provider.name(), "linked_editing.resolve_cancelled");
					return None;
				}
				result = lockstep_worker::run_isolated(TaskClass::Interactive, task) => result,
			};

			let result = match result {
				Ok(result) => result,
				Err(TaskFailure::Panicked(message)) => {
					self.sink.report(&ResolveError::Panicked {
						provider: provider.name().to_string(),
						message,
					});
					continue;
				}
				Err(TaskFailure::Aborted) => {
					trace!(provider = provider.name(), "linked_editing.provider_aborted");
					continue;
				}
			};

			match result {
				Ok(Some(ranges)) if !ranges.is_empty() => match check_ranges(&ranges) {
					Ok(()) => {
						trace!(provider = provider.name(), count = ranges.len(), "linked_editing.resolved");
						return Some(ranges);
					}
					Err(defect) => self.sink.report(&ResolveError::InvalidRanges {
						provider: provider.name().to_string(),
						defect,
					}),
				},
				Ok(_) => {}
				Err(source) => self.sink.report(&ResolveError::Provider {
					provider: provider.name().to_string(),
					source,
				}),
			}
		}
		None
	}
}

/// Rejects inverted or overlapping ranges. Touching ranges are fine.
pub(crate) fn check_ranges(ranges: &[LinkedRange]) -> Result<(), RangeDefect> {
	if let Some(index) = ranges.iter().position(|range| !range.is_ordered()) {
		return Err(RangeDefect::Inverted { index });
	}

	let mut order: Vec<usize> = (0..ranges.len()).collect();
	order.sort_by_key(|&i| (ranges[i].start, ranges[i].end));
	for pair in order.windows(2) {
		let (a, b) = (pair[0], pair[1]);
		if ranges[a].overlaps(&ranges[b]) {
			return Err(RangeDefect::Overlapping {
				first: a.min(b),
				second: a.max(b),
			});
		}
	}
	Ok(())
}

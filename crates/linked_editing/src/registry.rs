//! Linked range provider registry.
//!
//! Providers register and unregister at any time. Every query re-derives the
//! applicable providers from the current registrations, ordered by descending
//! score with ties kept in registration order. Each change bumps a revision
//! published on a watch channel so controllers can re-resolve.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use lockstep_primitives::DocumentSnapshot;
use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::debug;

use crate::provider::LinkedRangeProvider;

/// Handle returned by [`ProviderRegistry::register`], used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProviderRegistration(u64);

struct Entry {
	id: u64,
	provider: Arc<dyn LinkedRangeProvider>,
}

/// Thread-safe registry of linked range providers.
pub struct ProviderRegistry {
	entries: RwLock<Vec<Entry>>,
	next_id: AtomicU64,
	revision: watch::Sender<u64>,
}

impl Default for ProviderRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for ProviderRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let names: Vec<String> = self.entries.read().iter().map(|entry| entry.provider.name().to_string()).collect();
		f.debug_struct("ProviderRegistry")
			.field("providers", &names)
			.field("revision", &self.revision())
			.finish()
	}
}

impl ProviderRegistry {
	/// Creates an empty registry at revision 0.
	pub fn new() -> Self {
		let (revision, _) = watch::channel(0);
		Self {
			entries: RwLock::new(Vec::new()),
			next_id: AtomicU64::new(0),
			revision,
		}
	}

	/// Registers a provider and notifies subscribers.
	pub fn register(&self, provider: Arc<dyn LinkedRangeProvider>) -> ProviderRegistration {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		debug!(provider = provider.name(), id, "linked_editing.provider_registered");
		self.entries.write().push(Entry { id, provider });
		self.bump();
		ProviderRegistration(id)
	}

	/// Removes a provider. Returns false if it was not registered.
	pub fn unregister(&self, registration: ProviderRegistration) -> bool {
		let removed = {
			let mut entries = self.entries.write();
			let before = entries.len();
			entries.retain(|entry| entry.id != registration.0);
			entries.len() != before
		};
		if removed {
			debug!(id = registration.0, "linked_editing.provider_unregistered");
			self.bump();
		}
		removed
	}

	/// Returns the providers that apply to `document`, highest score first.
	pub fn ordered_for(&self, document: &DocumentSnapshot) -> Vec<Arc<dyn LinkedRangeProvider>> {
		let mut scored: Vec<(u32, Arc<dyn LinkedRangeProvider>)> = self
			.entries
			.read()
			.iter()
			.filter_map(|entry| {
				let score = entry.provider.score(document);
				(score > 0).then(|| (score, entry.provider.clone()))
			})
			.collect();
		scored.sort_by(|a, b| b.0.cmp(&a.0));
		scored.into_iter().map(|(_, provider)| provider).collect()
	}

	/// Number of registered providers.
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}

	/// Current revision; bumped on every register/unregister.
	pub fn revision(&self) -> u64 {
		*self.revision.borrow()
	}

	/// Subscribes to registry changes.
	pub fn subscribe(&self) -> watch::Receiver<u64> {
		self.revision.subscribe()
	}

	fn bump(&self) {
		self.revision.send_modify(|revision| *revision = revision.wrapping_add(1));
	}
}

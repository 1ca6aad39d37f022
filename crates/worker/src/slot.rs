//! Single-slot ownership of an in-flight request.
//!
//! At most one request owns the slot. Starting another cancels the previous
//! one and takes its place. Completions identify themselves by generation
//! and only the current owner may release the slot, so a late completion
//! from a superseded request is recognisable and can be dropped.

use tracing::trace;

use crate::token::{GenerationClock, GenerationToken};

#[derive(Debug)]
struct Owner<M> {
	token: GenerationToken,
	meta: M,
}

/// The slot, plus whatever the caller wants to remember about its owner.
#[derive(Debug)]
pub struct PendingSlot<M> {
	clock: GenerationClock,
	owner: Option<Owner<M>>,
}

impl<M> Default for PendingSlot<M> {
	fn default() -> Self {
		Self {
			clock: GenerationClock::new(),
			owner: None,
		}
	}
}

impl<M> PendingSlot<M> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Cancels the current owner, if any, and claims the slot for a new generation.
	pub fn begin(&mut self, meta: M) -> GenerationToken {
		self.cancel();
		let token = GenerationToken::new(self.clock.advance());
		self.owner = Some(Owner {
			token: token.clone(),
			meta,
		});
		token
	}

	/// Cancels and releases the current owner. Returns false if the slot was free.
	pub fn cancel(&mut self) -> bool {
		let Some(owner) = self.owner.take() else {
			return false;
		};
		trace!(generation = owner.token.generation(), "worker.slot_cancel");
		owner.token.cancel();
		true
	}

	/// Releases the slot if `generation` still owns it, returning its metadata.
	///
	/// Returns `None` for a superseded generation; the slot is left untouched.
	pub fn settle(&mut self, generation: u64) -> Option<M> {
		if self.owner.as_ref()?.token.generation() != generation {
			trace!(generation, "worker.slot_stale");
			return None;
		}
		self.owner.take().map(|owner| owner.meta)
	}

	pub fn is_pending(&self) -> bool {
		self.owner.is_some()
	}

	/// Token of the current owner.
	pub fn current(&self) -> Option<&GenerationToken> {
		self.owner.as_ref().map(|owner| &owner.token)
	}
}

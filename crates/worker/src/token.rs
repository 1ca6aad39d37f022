use tokio_util::sync::CancellationToken;

/// Hands out strictly increasing generation numbers.
///
/// Owned by whoever issues requests; generation 0 is never handed out.
#[derive(Debug, Default)]
pub struct GenerationClock {
	last: u64,
}

impl GenerationClock {
	pub fn new() -> Self {
		Self::default()
	}

	/// Advances the clock and returns the new generation.
	pub fn advance(&mut self) -> u64 {
		self.last = self.last.wrapping_add(1).max(1);
		self.last
	}
}

/// A cancellation token tagged with the generation of the request it belongs to.
///
/// Clones share the same cancellation state.
#[derive(Debug, Clone)]
pub struct GenerationToken {
	generation: u64,
	cancel: CancellationToken,
}

impl GenerationToken {
	pub fn new(generation: u64) -> Self {
		Self {
			generation,
			cancel: CancellationToken::new(),
		}
	}

	pub const fn generation(&self) -> u64 {
		self.generation
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// The underlying token, for APIs that take a plain [`CancellationToken`].
	pub fn token(&self) -> &CancellationToken {
		&self.cancel
	}
}

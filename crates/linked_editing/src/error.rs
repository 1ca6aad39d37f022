use lockstep_primitives::PositionError;
use thiserror::Error;

/// Failure reported by a single range provider.
#[derive(Debug, Error)]
pub enum ProviderError {
	/// The provider could not compute ranges.
	#[error("{0}")]
	Failed(String),
	/// Any other error raised by provider code.
	#[error(transparent)]
	Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ProviderError {
	pub fn failed(message: impl Into<String>) -> Self {
		Self::Failed(message.into())
	}
}

/// Why a provider's ranges cannot be used as a linked set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RangeDefect {
	#[error("range {index} ends before it starts")]
	Inverted { index: usize },
	#[error("ranges {first} and {second} overlap")]
	Overlapping { first: usize, second: usize },
}

/// Unexpected errors surfaced while resolving linked ranges.
///
/// None of these abort the editing session; they are handed to an
/// [`UnexpectedErrorSink`](crate::UnexpectedErrorSink) and resolution moves on.
#[derive(Debug, Error)]
pub enum ResolveError {
	#[error("linked range provider `{provider}` failed: {source}")]
	Provider {
		provider: String,
		#[source]
		source: ProviderError,
	},
	#[error("linked range provider `{provider}` returned unusable ranges: {defect}")]
	InvalidRanges { provider: String, defect: RangeDefect },
	#[error("linked ranges do not fit the document: {0}")]
	Position(#[from] PositionError),
	#[error("linked range provider `{provider}` panicked: {message}")]
	Panicked { provider: String, message: String },
}

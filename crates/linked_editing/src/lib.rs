//! Linked editing: keep related ranges of a document (an opening and closing
//! tag, say) textually identical while the user types in one of them.
//!
//! * [`ProviderRegistry`] holds [`LinkedRangeProvider`]s, ordered by score.
//! * [`RangeResolver`] asks providers in order and returns the first answer.
//! * [`LinkedEditingController`] tracks the cursor and content changes, keeps a
//!   single resolution in flight and mirrors insertions from the primary range
//!   into the others through an [`EditorHost`].

pub mod classify;
pub mod config;
pub mod controller;
pub mod decorations;
pub mod error;
pub mod events;
pub mod host;
pub mod provider;
pub mod registry;
pub mod resolver;

#[cfg(test)]
mod test_support;

pub use classify::{EditClass, MirrorPlan, Rejection, classify};
pub use config::{ConfigError, DEFAULT_DECORATION_STYLE, LinkedEditingConfig};
pub use controller::{LinkedEditingController, SyncState};
pub use decorations::DecorationSet;
pub use error::{ProviderError, RangeDefect, ResolveError};
pub use events::{EditorEvent, EventSender, Notification, Subscriptions, subscribe};
pub use host::{Decoration, DecorationId, EditorHost, TracingErrorSink, UnexpectedErrorSink};
pub use provider::LinkedRangeProvider;
pub use registry::{ProviderRegistration, ProviderRegistry};
pub use resolver::{RangeResolver, ResolutionRequest, resolve_linked_ranges};

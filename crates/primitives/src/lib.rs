//! Core types for linked editing: positions, ranges, snapshots and change events.

/// Content change events and host edits.
pub mod change;
/// Document snapshots and position/offset conversion.
pub mod document;
/// Positions, linked ranges and char index aliases.
pub mod range;
/// Rope utilities and extensions.
pub mod rope;

pub use change::{ContentChange, EditOrigin, TextChange, TextEdit};
pub use document::{DocumentId, DocumentSnapshot, PositionError};
pub use range::{CharIdx, CharLen, LinkedRange, TextPosition};
pub use ropey::Rope;
pub use smallvec::SmallVec;

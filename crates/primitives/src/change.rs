use std::ops::Range as StdRange;

use smallvec::SmallVec;

use crate::document::{DocumentSnapshot, PositionError};
use crate::range::{CharIdx, CharLen, LinkedRange, TextPosition};

/// Who produced a content change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOrigin {
	/// Typed, pasted or otherwise issued by the user.
	User,
	/// Applied by the linked editing controller on behalf of a mirror range.
	LinkedEditing,
}

/// One contiguous change inside a content event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
	/// The replaced range (pre-change positions).
	pub range: LinkedRange,
	/// Char offset of the replaced range's start (pre-change).
	pub range_offset: CharIdx,
	/// Number of chars removed.
	pub range_length: CharLen,
	/// The text that replaced the range.
	pub text: String,
}

impl TextChange {
	/// Returns true if nothing was removed.
	pub fn is_insertion(&self) -> bool {
		self.range_length == 0
	}

	/// Char length of the inserted text.
	pub fn text_len(&self) -> CharLen {
		self.text.chars().count()
	}
}

/// A document change event: the individual changes and the resulting snapshot.
#[derive(Debug, Clone)]
pub struct ContentChange {
	/// Changes in this batch. Most events carry exactly one.
	pub changes: SmallVec<[TextChange; 1]>,
	/// The document after the changes were applied.
	pub snapshot: DocumentSnapshot,
	/// Who produced the changes.
	pub origin: EditOrigin,
}

impl ContentChange {
	/// Applies `edits` to `before` and describes the result as one content change.
	pub fn from_edits(before: &DocumentSnapshot, edits: &[(StdRange<CharIdx>, &str)], origin: EditOrigin) -> Result<Self, PositionError> {
		let changes = edits
			.iter()
			.map(|(range, text)| {
				Ok(TextChange {
					range: before.offsets_to_range(range.clone())?,
					range_offset: range.start,
					range_length: range.len(),
					text: (*text).to_string(),
				})
			})
			.collect::<Result<SmallVec<[TextChange; 1]>, PositionError>>()?;
		let snapshot = before.apply(edits)?;
		Ok(Self { changes, snapshot, origin })
	}
}

/// An edit the host is asked to apply: replace `range` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
	/// Target range in the document the edit was computed against.
	pub range: LinkedRange,
	/// The replacement text.
	pub new_text: String,
}

impl TextEdit {
	/// Creates an edit that inserts `text` at `at` without removing anything.
	pub fn insert(at: TextPosition, text: impl Into<String>) -> Self {
		Self {
			range: LinkedRange::point(at),
			new_text: text.into(),
		}
	}
}

//! Immutable document snapshots and position/offset conversion.

use std::ops::Range as StdRange;
use std::sync::Arc;

use ropey::Rope;
use thiserror::Error;

use crate::range::{CharIdx, LinkedRange, TextPosition};
use crate::rope::line_content_len;

/// Identity of a document (text model) in the host editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub u64);

/// Errors produced when positions or offsets do not fit a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
	/// The line does not exist in the document.
	#[error("line {line} out of bounds (document has {line_count} lines)")]
	LineOutOfBounds { line: u32, line_count: usize },
	/// The character lies past the end of the line's content.
	#[error("character {character} out of bounds on line {line} (line has {line_len} chars)")]
	CharacterOutOfBounds { line: u32, character: u32, line_len: usize },
	/// The char offset lies past the end of the document.
	#[error("offset {offset} out of bounds (document has {len} chars)")]
	OffsetOutOfBounds { offset: CharIdx, len: usize },
	/// The range ends before it starts.
	#[error("range ends before it starts")]
	InvertedRange,
	/// Two edits in one batch touch the same text.
	#[error("edits overlap at offset {offset}")]
	OverlappingEdit { offset: CharIdx },
}

/// Cheaply clonable, read-only view of a document at one version.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
	id: DocumentId,
	version: u64,
	language: Arc<str>,
	text: Rope,
}

impl DocumentSnapshot {
	/// Creates a snapshot.
	pub fn new(id: DocumentId, version: u64, language: impl Into<Arc<str>>, text: Rope) -> Self {
		Self {
			id,
			version,
			language: language.into(),
			text,
		}
	}

	/// Creates version 0 of a document from a string.
	pub fn from_text(id: DocumentId, language: impl Into<Arc<str>>, text: &str) -> Self {
		Self::new(id, 0, language, Rope::from_str(text))
	}

	pub fn id(&self) -> DocumentId {
		self.id
	}

	pub fn version(&self) -> u64 {
		self.version
	}

	/// Language identifier, used by providers to decide whether they apply.
	pub fn language(&self) -> &str {
		&self.language
	}

	pub fn text(&self) -> &Rope {
		&self.text
	}

	/// Converts a line/character position to a char offset.
	///
	/// The character may sit at the end of the line's content but not on or
	/// past its line break.
	pub fn offset_at(&self, pos: TextPosition) -> Result<CharIdx, PositionError> {
		let line = pos.line as usize;
		let line_count = self.text.len_lines();
		if line >= line_count {
			return Err(PositionError::LineOutOfBounds { line: pos.line, line_count });
		}

		let line_len = line_content_len(self.text.line(line));
		let character = pos.character as usize;
		if character > line_len {
			return Err(PositionError::CharacterOutOfBounds {
				line: pos.line,
				character: pos.character,
				line_len,
			});
		}

		Ok(self.text.line_to_char(line) + character)
	}

	/// Converts a char offset to a line/character position.
	pub fn position_at(&self, offset: CharIdx) -> Result<TextPosition, PositionError> {
		let len = self.text.len_chars();
		if offset > len {
			return Err(PositionError::OffsetOutOfBounds { offset, len });
		}

		let line = self.text.char_to_line(offset);
		let character = offset - self.text.line_to_char(line);
		Ok(TextPosition::new(line as u32, character as u32))
	}

	/// Converts a linked range to a char offset range.
	pub fn range_to_offsets(&self, range: &LinkedRange) -> Result<StdRange<CharIdx>, PositionError> {
		let start = self.offset_at(range.start)?;
		let end = self.offset_at(range.end)?;
		if end < start {
			return Err(PositionError::InvertedRange);
		}
		Ok(start..end)
	}

	/// Converts a char offset range to a linked range.
	pub fn offsets_to_range(&self, range: StdRange<CharIdx>) -> Result<LinkedRange, PositionError> {
		if range.end < range.start {
			return Err(PositionError::InvertedRange);
		}
		Ok(LinkedRange::new(self.position_at(range.start)?, self.position_at(range.end)?))
	}

	/// Applies a batch of edits expressed against this snapshot and returns
	/// the next version.
	///
	/// Edits must not overlap; their order in the batch does not matter.
	pub fn apply<S: AsRef<str>>(&self, edits: &[(StdRange<CharIdx>, S)]) -> Result<DocumentSnapshot, PositionError> {
		let len = self.text.len_chars();
		let mut sorted: Vec<&(StdRange<CharIdx>, S)> = edits.iter().collect();
		sorted.sort_by_key(|(range, _)| (range.start, range.end));

		let mut prev_end = 0;
		for (i, (range, _)) in sorted.iter().enumerate() {
			if range.end < range.start {
				return Err(PositionError::InvertedRange);
			}
			if range.end > len {
				return Err(PositionError::OffsetOutOfBounds { offset: range.end, len });
			}
			if i > 0 && range.start < prev_end {
				return Err(PositionError::OverlappingEdit { offset: range.start });
			}
			prev_end = range.end;
		}

		let mut text = self.text.clone();
		for (range, replacement) in sorted.into_iter().rev() {
			text.remove(range.clone());
			text.insert(range.start, replacement.as_ref());
		}

		Ok(Self {
			id: self.id,
			version: self.version.wrapping_add(1),
			language: self.language.clone(),
			text,
		})
	}
}

/// A position in the text, measured in characters (not bytes).
///
/// This is the canonical offset space for snapshots and range bookkeeping.
pub type CharIdx = usize;

/// A length or count in the text, measured in characters (not bytes).
///
/// This is distinct from CharIdx to avoid accidentally passing an index
/// where a length is expected or vice versa.
pub type CharLen = usize;

/// Line/character position in a document.
///
/// `character` counts chars within the line, matching the rope's indexing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextPosition {
	/// Zero-based line index.
	pub line: u32,
	/// Zero-based character offset in the line.
	pub character: u32,
}

impl TextPosition {
	/// Creates a new position.
	pub const fn new(line: u32, character: u32) -> Self {
		Self { line, character }
	}
}

/// Half-open span `[start, end)` that is edited in lockstep with its siblings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LinkedRange {
	/// Start position (inclusive).
	pub start: TextPosition,
	/// End position (exclusive).
	pub end: TextPosition,
}

impl LinkedRange {
	/// Creates a new range.
	pub const fn new(start: TextPosition, end: TextPosition) -> Self {
		Self { start, end }
	}

	/// Creates a zero-length range at a position.
	pub const fn point(pos: TextPosition) -> Self {
		Self { start: pos, end: pos }
	}

	/// Returns true if start equals end.
	pub fn is_empty(&self) -> bool {
		self.start == self.end
	}

	/// Returns true if the end does not precede the start.
	pub fn is_ordered(&self) -> bool {
		self.start <= self.end
	}

	/// Returns true if the two ranges share at least one character.
	pub fn overlaps(&self, other: &LinkedRange) -> bool {
		self.start < other.end && other.start < self.end
	}
}

//! Decides whether a content change can be mirrored across linked ranges.
//!
//! Only one shape is mirrored: a single pure insertion that lands inside the
//! primary range, boundaries included. Everything else ends the session.
//!
//! All offsets are chars. Input ranges are in the coordinates of the document
//! before the user's change; [`MirrorPlan::targets`] are in the coordinates
//! after it (the document the mirror edits are applied to) and
//! [`MirrorPlan::ranges`] are in the coordinates after the mirror edits.

use std::ops::Range as StdRange;

use lockstep_primitives::{CharIdx, CharLen, TextChange};

/// Why a change could not be mirrored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
	/// There are no linked ranges to mirror into.
	NoPrimary,
	/// The event carried more than one change.
	NotSingleEdit,
	/// The change removed text.
	NotInsertion,
	/// The insertion point lies outside the primary range.
	OutsidePrimary,
}

impl Rejection {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::NoPrimary => "no_primary",
			Self::NotSingleEdit => "not_single_edit",
			Self::NotInsertion => "not_insertion",
			Self::OutsidePrimary => "outside_primary",
		}
	}
}

/// How to replay a primary insertion into every mirror range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorPlan {
	/// The inserted text.
	pub text: String,
	/// Insertion offset relative to the primary range's start.
	pub relative_offset: CharLen,
	/// One insertion point per mirror, in order.
	pub targets: Vec<CharIdx>,
	/// Every linked range once the mirror insertions are applied. Primary first.
	pub ranges: Vec<StdRange<CharIdx>>,
}

/// Outcome of [`classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditClass {
	/// Nothing changed; keep the current ranges.
	Unchanged,
	Mirror(MirrorPlan),
	Rejected(Rejection),
}

/// Classifies `changes` against the linked `ranges` (primary first).
pub fn classify(ranges: &[StdRange<CharIdx>], changes: &[TextChange]) -> EditClass {
	let Some(primary) = ranges.first() else {
		return EditClass::Rejected(Rejection::NoPrimary);
	};
	let change = match changes {
		[] => return EditClass::Unchanged,
		[change] => change,
		_ => return EditClass::Rejected(Rejection::NotSingleEdit),
	};
	if !change.is_insertion() {
		return EditClass::Rejected(Rejection::NotInsertion);
	}
	if change.text.is_empty() {
		return EditClass::Unchanged;
	}

	let at = change.range_offset;
	if at < primary.start || at > primary.end {
		return EditClass::Rejected(Rejection::OutsidePrimary);
	}

	let len = change.text_len();
	let relative_offset = at - primary.start;

	let mut shifted = Vec::with_capacity(ranges.len());
	shifted.push(primary.start..primary.end + len);
	for mirror in &ranges[1..] {
		let moves_start = mirror.start >= at;
		let start = if moves_start { mirror.start + len } else { mirror.start };
		let end = if moves_start || mirror.end > at { mirror.end + len } else { mirror.end };
		shifted.push(start..end);
	}

	let targets: Vec<CharIdx> = shifted[1..]
		.iter()
		.map(|mirror| (mirror.start + relative_offset).min(mirror.end))
		.collect();

	let ranges = shifted
		.iter()
		.enumerate()
		.map(|(index, range)| {
			let before = targets
				.iter()
				.enumerate()
				.filter(|&(mirror, &target)| mirror + 1 != index && target <= range.start)
				.count();
			let shift = before * len;
			let own = if index == 0 { 0 } else { len };
			range.start + shift..range.end + shift + own
		})
		.collect();

	EditClass::Mirror(MirrorPlan {
		text: change.text.clone(),
		relative_offset,
		targets,
		ranges,
	})
}

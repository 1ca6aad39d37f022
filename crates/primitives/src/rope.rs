//! Rope utilities and extensions.

use ropey::RopeSlice;

use crate::range::CharLen;

/// Returns the number of chars in a line, excluding its trailing line break.
///
/// Recognizes every break ropey splits lines on: `\r\n` as one break, and
/// each of `\n`, `\r`, VT, FF, NEL, LS and PS on its own.
pub fn line_content_len(line: RopeSlice) -> CharLen {
	let len = line.len_chars();
	if len == 0 {
		return 0;
	}
	match line.char(len - 1) {
		'\n' if len > 1 && line.char(len - 2) == '\r' => len - 2,
		c if is_line_break(c) => len - 1,
		_ => len,
	}
}

fn is_line_break(c: char) -> bool {
	matches!(c, '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}')
}

//! Block segmentation: maximal runs of non-separator lines.
//!
//! A separator line is blank, whitespace-only, or a heading (`#{1,6}` plus
//! whitespace). Every other line belongs to exactly one block, bounded by
//! the document start, a separator, or the document end. Blocks are derived
//! on demand and never stored.
//!
//! Line numbers at this surface are 1-based, matching how operations address
//! lines everywhere else.

use ropey::RopeSlice;

use crate::{Tendril, text};

/// Whether a line's text delimits blocks: empty, whitespace-only, or a
/// heading of one to six `#` followed by whitespace.
pub fn is_separator_line(line: &str) -> bool {
  if line.chars().all(char::is_whitespace) {
    return true;
  }
  let hashes = line.chars().take_while(|&c| c == '#').count();
  (1..=6).contains(&hashes)
    && line
      .chars()
      .nth(hashes)
      .is_some_and(char::is_whitespace)
}

/// Whether `line_number` (1-based) starts a block: it is not a separator
/// itself and is either the first line or preceded by a separator.
/// Out-of-range line numbers are never block starts.
pub fn is_block_start(text: RopeSlice, line_number: usize) -> bool {
  let Some(line) = checked_line(text, line_number) else {
    return false;
  };
  if is_separator_line(&text::line_text(text, line)) {
    return false;
  }
  line == 0 || is_separator_line(&text::line_text(text, line - 1))
}

/// Collect the lines of the block starting at `start_line_number` (1-based),
/// forward until a separator or the document end. Returns an empty sequence
/// when the line is not a block start; callers are expected to check
/// [`is_block_start`] first.
pub fn block_lines_from(text: RopeSlice, start_line_number: usize) -> Vec<Tendril> {
  if !is_block_start(text, start_line_number) {
    return Vec::new();
  }
  let start = start_line_number - 1;
  let mut lines = Vec::new();
  for line in start..text.len_lines() {
    let line_text = text::line_text(text, line);
    if is_separator_line(&line_text) {
      break;
    }
    lines.push(Tendril::from(line_text));
  }
  lines
}

/// The 1-based inclusive line-number range of the block containing
/// `line_number`, or `None` when the line is a separator or out of range.
pub fn block_range(text: RopeSlice, line_number: usize) -> Option<(usize, usize)> {
  let line = checked_line(text, line_number)?;
  if is_separator_line(&text::line_text(text, line)) {
    return None;
  }

  let mut first = line;
  while first > 0 && !is_separator_line(&text::line_text(text, first - 1)) {
    first -= 1;
  }
  let mut last = line;
  while last + 1 < text.len_lines() && !is_separator_line(&text::line_text(text, last + 1)) {
    last += 1;
  }
  Some((first + 1, last + 1))
}

/// Convert a 1-based line number into a 0-based line index, rejecting 0 and
/// anything past the last line.
fn checked_line(text: RopeSlice, line_number: usize) -> Option<usize> {
  if line_number == 0 || line_number > text.len_lines() {
    return None;
  }
  Some(line_number - 1)
}

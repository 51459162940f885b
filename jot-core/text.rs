//! Rope text helpers for a newline-delimited document.
//!
//! The host text widget normalizes input to `\n` line endings, so unlike a
//! general-purpose editor core this module only knows about LF. Lines are
//! addressed 0-based here; the 1-based addressing of the public operation
//! surface lives one layer up.

use ropey::RopeSlice;
use unicode_segmentation::GraphemeCursor;

/// Char index of the first char of `line`.
pub fn line_start(text: RopeSlice, line: usize) -> usize {
  text.line_to_char(line)
}

/// Char index just past the last content char of `line`, excluding the
/// trailing `\n` if present.
pub fn line_end(text: RopeSlice, line: usize) -> usize {
  let start = text.line_to_char(line);
  let slice = text.line(line);
  let mut end = start + slice.len_chars();
  if slice.len_chars() > 0 && slice.char(slice.len_chars() - 1) == '\n' {
    end -= 1;
  }
  end
}

/// The text of `line` without its line ending.
pub fn line_text(text: RopeSlice, line: usize) -> String {
  text
    .slice(line_start(text, line)..line_end(text, line))
    .to_string()
}

/// Whether `line` is empty or whitespace-only.
pub fn line_is_blank(text: RopeSlice, line: usize) -> bool {
  text
    .slice(line_start(text, line)..line_end(text, line))
    .chars()
    .all(char::is_whitespace)
}

/// Whether `line` is the document's last line. Ropey reports a final empty
/// line after a trailing `\n`; that phantom line still counts as last.
pub fn is_last_line(text: RopeSlice, line: usize) -> bool {
  line + 1 >= text.len_lines()
}

/// Snap a char offset backwards onto a grapheme boundary within its line.
///
/// Marker widths and indentation are ASCII so the line transforms never
/// produce mid-grapheme offsets themselves, but offsets arriving from hit
/// testing (pointer coordinates) can land inside a multi-codepoint cluster.
pub fn snap_to_grapheme_boundary(text: RopeSlice, char_idx: usize) -> usize {
  let char_idx = char_idx.min(text.len_chars());
  let line = text.char_to_line(char_idx);
  let start = line_start(text, line);
  let line_str = line_text(text, line);

  let col = char_idx - start;
  let byte_col = line_str
    .char_indices()
    .nth(col)
    .map(|(i, _)| i)
    .unwrap_or(line_str.len());

  let mut cursor = GraphemeCursor::new(byte_col, line_str.len(), true);
  if cursor.is_boundary(&line_str, 0).unwrap_or(true) {
    return char_idx;
  }
  let snapped_byte = cursor
    .prev_boundary(&line_str, 0)
    .ok()
    .flatten()
    .unwrap_or(0);
  start + line_str[..snapped_byte].chars().count()
}

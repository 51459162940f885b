//! Export filter: outline text to plain paragraph text.
//!
//! Export splits the document into blocks on blank lines (export keeps
//! headings inside their paragraph, unlike editing-time segmentation), drops
//! every block whose first line starts with the excluded marker, and rejoins
//! the survivors with a blank line between them. Line markup is flattened
//! for external consumption: one space per indent level instead of two, and
//! bullet/checkbox markers removed.

use jot_core::line::parse_line;

use crate::document::Document;

/// Blocks whose first line starts with this glyph are private notes and are
/// dropped from the export.
pub const EXCLUDED_MARKER: char = '📝';

/// Flatten one line: single-space indentation, no markers.
fn normalize_line(line: &str) -> String {
  let shape = parse_line(line);
  let mut out = String::with_capacity(shape.indent + shape.content.len());
  for _ in 0..shape.indent {
    out.push(' ');
  }
  out.push_str(&shape.content);
  out
}

/// Build the externally-consumable text of a document body.
pub fn build_export_text(text: &ropey::Rope) -> String {
  let mut paragraphs: Vec<String> = Vec::new();
  let mut current: Vec<String> = Vec::new();
  let mut current_excluded = false;

  let mut flush = |current: &mut Vec<String>, excluded: &mut bool| {
    if !current.is_empty() && !*excluded {
      paragraphs.push(current.join("\n"));
    }
    current.clear();
    *excluded = false;
  };

  let text = text.slice(..);
  for line in 0..text.len_lines() {
    let line_text = jot_core::text::line_text(text, line);
    if line_text.chars().all(char::is_whitespace) {
      flush(&mut current, &mut current_excluded);
      continue;
    }
    if current.is_empty() && line_text.starts_with(EXCLUDED_MARKER) {
      current_excluded = true;
    }
    current.push(normalize_line(&line_text));
  }
  flush(&mut current, &mut current_excluded);

  paragraphs.join("\n\n")
}

/// Title plus filtered body, the string handed to a share/save action.
pub fn export_with_title(doc: &Document) -> String {
  let body = build_export_text(doc.text());
  let title = doc.title().trim();
  if title.is_empty() {
    body
  } else if body.is_empty() {
    title.to_string()
  } else {
    format!("{title}\n\n{body}")
  }
}

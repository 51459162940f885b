//! Per-line data for the rendering/decoration surface.
//!
//! The model does no DOM work itself; it hands the view layer, per visible
//! line, everything needed to decorate it: a structural class, the
//! hanging-indent prefix width (chars consumed by indent + bullet +
//! checkbox, so wrapped text can align under the content), and which block
//! the line belongs to (for grouping UI).

use jot_core::{
  block,
  line::{Checkbox, parse_line},
};

use crate::document::Document;

/// Structural class of a line, from most to least specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
  Heading,
  Checked,
  Checkbox,
  List,
  Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInfo {
  pub class:          LineClass,
  /// Chars consumed by the structural prefix in canonical form.
  pub hanging_indent: usize,
  /// 1-based inclusive line range of the containing block; `None` for
  /// separator lines, which belong to no block.
  pub block:          Option<(usize, usize)>,
  /// Whether this line opens its block.
  pub block_start:    bool,
}

/// Decoration data for one line, or `None` when the line number is out of
/// range.
pub fn line_info(doc: &Document, line_number: usize) -> Option<LineInfo> {
  let text = doc.line_text(line_number)?;
  let shape = parse_line(&text);

  let class = if block::is_separator_line(&text) && !text.chars().all(char::is_whitespace) {
    LineClass::Heading
  } else {
    match (shape.is_list, shape.checkbox) {
      (true, Checkbox::Checked) => LineClass::Checked,
      (true, Checkbox::Unchecked) => LineClass::Checkbox,
      (true, Checkbox::None) => LineClass::List,
      (false, _) => LineClass::Plain,
    }
  };

  let rope = doc.text().slice(..);
  Some(LineInfo {
    class,
    hanging_indent: shape.marker_len(),
    block: block::block_range(rope, line_number),
    block_start: block::is_block_start(rope, line_number),
  })
}

/// Decoration data for every line of the document.
pub fn line_infos(doc: &Document) -> Vec<LineInfo> {
  (1..=doc.line_count())
    .filter_map(|n| line_info(doc, n))
    .collect()
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn classes_cover_the_markup() {
    let doc = Document::from_str("# head\nplain\n- item\n- [ ] todo\n- [x] done");
    let classes: Vec<_> = line_infos(&doc).iter().map(|i| i.class).collect();
    assert_eq!(classes, vec![
      LineClass::Heading,
      LineClass::Plain,
      LineClass::List,
      LineClass::Checkbox,
      LineClass::Checked,
    ]);
  }

  #[test]
  fn hanging_indent_counts_prefix() {
    let doc = Document::from_str("  - [ ] wrapped text");
    let info = line_info(&doc, 1).unwrap();
    assert_eq!(info.hanging_indent, 8);
  }

  #[test]
  fn separator_lines_belong_to_no_block() {
    let doc = Document::from_str("a\n\nb\nc");
    let infos = line_infos(&doc);
    assert_eq!(infos[0].block, Some((1, 1)));
    assert!(infos[0].block_start);
    assert_eq!(infos[1].block, None);
    assert_eq!(infos[2].block, Some((3, 4)));
    assert!(infos[2].block_start);
    assert!(!infos[3].block_start);
  }

  #[test]
  fn out_of_range_line_has_no_info() {
    let doc = Document::from_str("a");
    assert!(line_info(&doc, 2).is_none());
  }
}

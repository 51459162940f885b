//! The line transformation engine.
//!
//! Every operation here takes the current document (text + selection) and
//! produces one [`Transaction`]: an atomic change-set plus the selection the
//! editor should hold afterwards. Operations whose precondition fails
//! (invalid line number, non-list line for outdent, cursor not on an empty
//! line for the backspace merge) return an *empty* transaction rather than
//! an error; applying it is a no-op. Only contract violations inside the
//! engine itself surface as `Err`.
//!
//! Line numbers are 1-based. Rewriting a line always emits canonical
//! spacing, so non-canonical indentation is normalized by whichever edit
//! first touches the line.
//!
//! # Cursor tracking
//!
//! Single-line rewrites only change the structural prefix, never the
//! content, so selection endpoints inside a rewritten line keep their offset
//! relative to the content start; endpoints inside the old prefix are
//! clamped to the new prefix. Endpoints on later lines shift by the
//! accumulated length delta. Multi-line variants apply the same rule per
//! line with cumulative deltas, so the same logical span stays selected.

use smallvec::SmallVec;

use jot_core::line::{Checkbox, LineShape, build_line, parse_line};

use crate::{
  Tendril,
  document::Document,
  export,
  selection::Range,
  transaction::{Result, Transaction},
};

/// The logical, input-method-agnostic command surface. Keyboard chords,
/// pointer gestures, and on-screen buttons all funnel into these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
  Indent,
  Outdent,
  MoveUp,
  MoveDown,
  ToggleListOrCheckbox,
  SmartEnter,
  SmartBackspace,
  Export,
}

/// What executing a command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
  /// An edit to apply to the document. May be empty (no-op).
  Edit(Transaction),
  /// The export text, handed to an external consumer.
  Export(String),
}

/// Dispatch a command against the current document state. Commands that
/// operate on lines act on the selection's line span when it is non-empty,
/// on the cursor's line otherwise.
pub fn execute(doc: &Document, command: Command) -> Result<Outcome> {
  let selection = doc.selection();
  let line = doc.line_number_at(selection.head);

  let tx = match command {
    Command::Indent if !selection.is_empty() => indent_selection(doc)?,
    Command::Indent => indent_line(doc, line)?,
    Command::Outdent if !selection.is_empty() => outdent_selection(doc)?,
    Command::Outdent => outdent_line(doc, line)?,
    Command::ToggleListOrCheckbox if !selection.is_empty() => toggle_selection(doc)?,
    Command::ToggleListOrCheckbox => toggle_list_or_checkbox(doc, line)?,
    Command::MoveUp => move_by(doc, -1)?,
    Command::MoveDown => move_by(doc, 1)?,
    Command::SmartEnter => smart_enter(doc)?,
    Command::SmartBackspace => smart_backspace(doc)?,
    Command::Export => return Ok(Outcome::Export(export::export_with_title(doc))),
  };
  Ok(Outcome::Edit(tx))
}

/// A planned single-line rewrite, in pre-mutation offsets.
struct LineEdit {
  start:      usize,
  old_end:    usize,
  old_prefix: usize,
  new_text:   Tendril,
  new_prefix: usize,
}

impl LineEdit {
  fn delta(&self) -> isize {
    self.new_text.chars().count() as isize - (self.old_end - self.start) as isize
  }
}

/// Map a selection endpoint through a sorted list of line rewrites.
fn map_point(edits: &[LineEdit], p: usize) -> usize {
  let mut shifted = p as isize;
  for edit in edits {
    if p > edit.old_end {
      shifted += edit.delta();
    } else if p >= edit.start {
      let col = p - edit.start;
      let new_col = if col >= edit.old_prefix {
        col - edit.old_prefix + edit.new_prefix
      } else {
        col.min(edit.new_prefix)
      };
      return (edit.start as isize + (shifted - p as isize) + new_col as isize) as usize;
    }
  }
  shifted as usize
}

fn transaction_from_edits(doc: &Document, edits: Vec<LineEdit>) -> Result<Transaction> {
  if edits.is_empty() {
    return Ok(Transaction::new(doc.text()));
  }
  let selection = doc.selection();
  let new_selection = Range::new(
    map_point(&edits, selection.anchor),
    map_point(&edits, selection.head),
  );
  let tx = Transaction::change(
    doc.text(),
    edits
      .into_iter()
      .map(|e| (e.start, e.old_end, Some(e.new_text))),
  )?;
  Ok(tx.with_selection(new_selection))
}

/// Plan replacing `line_number` with the canonical text of `shape`. Returns
/// `None` when nothing would change.
fn plan_rewrite(doc: &Document, line_number: usize, shape: &LineShape) -> Option<LineEdit> {
  let (start, old_end) = doc.line_span(line_number)?;
  let old_text = doc.line_text(line_number)?;
  let new_text = build_line(shape);
  if new_text == old_text.as_str() {
    return None;
  }
  let old_prefix = old_text.chars().count() - shape.content.chars().count();
  Some(LineEdit {
    start,
    old_end,
    old_prefix,
    new_prefix: shape.marker_len(),
    new_text,
  })
}

// Single-line transforms.
//

/// The shape `indent` produces: non-lists become lists at level zero,
/// lists gain a level.
fn indented(shape: LineShape) -> LineShape {
  if shape.is_list {
    LineShape {
      indent: shape.indent + 1,
      ..shape
    }
  } else {
    LineShape {
      indent: 0,
      is_list: true,
      checkbox: Checkbox::None,
      content: shape.content,
    }
  }
}

/// The shape `outdent` produces, or `None` for non-lists (no-op).
fn outdented(shape: LineShape) -> Option<LineShape> {
  if !shape.is_list {
    return None;
  }
  Some(if shape.indent > 0 {
    LineShape {
      indent: shape.indent - 1,
      ..shape
    }
  } else {
    LineShape {
      indent: 0,
      is_list: false,
      checkbox: Checkbox::None,
      content: shape.content,
    }
  })
}

/// The keyboard/tap toggle cycle:
/// plain -> `- ` -> `- [ ] ` -> `- [x] ` -> plain.
fn toggled(shape: LineShape) -> LineShape {
  match (shape.is_list, shape.checkbox) {
    (false, _) => LineShape {
      is_list: true,
      checkbox: Checkbox::None,
      ..shape
    },
    (true, Checkbox::None) => LineShape {
      checkbox: Checkbox::Unchecked,
      ..shape
    },
    (true, Checkbox::Unchecked) => LineShape {
      checkbox: Checkbox::Checked,
      ..shape
    },
    (true, Checkbox::Checked) => LineShape {
      is_list: false,
      checkbox: Checkbox::None,
      ..shape
    },
  }
}

pub fn indent_line(doc: &Document, line_number: usize) -> Result<Transaction> {
  let Some(text) = doc.line_text(line_number) else {
    return Ok(Transaction::new(doc.text()));
  };
  let shape = indented(parse_line(&text));
  let edits = plan_rewrite(doc, line_number, &shape).into_iter().collect();
  transaction_from_edits(doc, edits)
}

pub fn outdent_line(doc: &Document, line_number: usize) -> Result<Transaction> {
  let Some(text) = doc.line_text(line_number) else {
    return Ok(Transaction::new(doc.text()));
  };
  let Some(shape) = outdented(parse_line(&text)) else {
    return Ok(Transaction::new(doc.text()));
  };
  let edits = plan_rewrite(doc, line_number, &shape).into_iter().collect();
  transaction_from_edits(doc, edits)
}

pub fn toggle_list_or_checkbox(doc: &Document, line_number: usize) -> Result<Transaction> {
  let Some(text) = doc.line_text(line_number) else {
    return Ok(Transaction::new(doc.text()));
  };
  let shape = toggled(parse_line(&text));
  let edits = plan_rewrite(doc, line_number, &shape).into_iter().collect();
  transaction_from_edits(doc, edits)
}

/// The narrower pointer-click cycle on the bullet glyph. `offset` is the
/// clicked char position; the click must land within the glyph span (2 chars
/// for a plain bullet, 6 with a checkbox) measured from the first non-indent
/// character, otherwise the click is ignored. Non-list lines are ignored.
///
/// Cycle: bullet -> `[ ]` -> `[x]` -> bullet (the bullet itself stays).
pub fn toggle_checkbox_at(doc: &Document, offset: usize) -> Result<Transaction> {
  let noop = Transaction::new(doc.text());
  if offset > doc.text().len_chars() {
    return Ok(noop);
  }
  let line_number = doc.line_number_at(offset);
  let Some((start, _)) = doc.line_span(line_number) else {
    return Ok(noop);
  };
  let text = doc.line_text(line_number).unwrap_or_default();
  let shape = parse_line(&text);
  let Some(span) = shape.glyph_span() else {
    return Ok(noop);
  };

  // Glyph span starts at the first non-indent char of the *actual* text.
  let ws_len = text.chars().take_while(|c| c.is_whitespace()).count();
  let glyph_from = start + ws_len;
  if offset < glyph_from || offset > glyph_from + span {
    return Ok(noop);
  }

  let next = LineShape {
    checkbox: match shape.checkbox {
      Checkbox::None => Checkbox::Unchecked,
      Checkbox::Unchecked => Checkbox::Checked,
      Checkbox::Checked => Checkbox::None,
    },
    ..shape
  };
  let edits = plan_rewrite(doc, line_number, &next).into_iter().collect();
  transaction_from_edits(doc, edits)
}

// Range (multi-line) variants.
//

fn selected_lines(doc: &Document) -> (usize, usize) {
  let selection = doc.selection();
  let (first, last) = selection.line_range(doc.text().slice(..));
  (first + 1, last + 1)
}

fn transform_selected_lines(
  doc: &Document,
  transform: impl Fn(LineShape) -> Option<LineShape>,
) -> Result<Transaction> {
  let (first, last) = selected_lines(doc);
  let mut edits = Vec::new();
  for line_number in first..=last {
    let Some(text) = doc.line_text(line_number) else {
      continue;
    };
    let Some(shape) = transform(parse_line(&text)) else {
      continue;
    };
    if let Some(edit) = plan_rewrite(doc, line_number, &shape) {
      edits.push(edit);
    }
  }
  transaction_from_edits(doc, edits)
}

pub fn indent_selection(doc: &Document) -> Result<Transaction> {
  transform_selected_lines(doc, |shape| Some(indented(shape)))
}

pub fn outdent_selection(doc: &Document) -> Result<Transaction> {
  transform_selected_lines(doc, outdented)
}

pub fn toggle_selection(doc: &Document) -> Result<Transaction> {
  transform_selected_lines(doc, |shape| Some(toggled(shape)))
}

// Line movement.
//

/// Move line `from` so it lands next to `to`: directly after `to` when
/// moving down, directly before it when moving up. No-op when the numbers
/// are equal or either is out of range.
pub fn move_line(doc: &Document, from: usize, to: usize) -> Result<Transaction> {
  move_lines(doc, from, from, to)
}

/// Move the contiguous block of lines `first..=last` the way [`move_line`]
/// moves a single line. The selection keeps its offsets relative to the
/// moved block when it sits inside it.
pub fn move_lines(doc: &Document, first: usize, last: usize, to: usize) -> Result<Transaction> {
  let noop = Transaction::new(doc.text());
  if first > last || (first..=last).contains(&to) {
    return Ok(noop);
  }
  if !doc.is_valid_line(first) || !doc.is_valid_line(last) || !doc.is_valid_line(to) {
    return Ok(noop);
  }

  let len = doc.text().len_chars();
  let (Some((first_start, _)), Some((_, last_end))) =
    (doc.line_span(first), doc.line_span(last))
  else {
    return Ok(noop);
  };
  let block_is_tail = last == doc.line_count();

  let block_text: Tendril = doc
    .text()
    .slice(first_start..last_end)
    .to_string()
    .into();

  // Deleting a tail block eats the newline before it instead of a trailing
  // one it doesn't have.
  let (delete_from, delete_to) = if block_is_tail {
    (first_start.saturating_sub(1), last_end)
  } else {
    (first_start, last_end + 1)
  };

  let mut changes: SmallVec<[(usize, usize, Option<Tendril>); 2]> = SmallVec::new();
  let new_block_start;

  if to < first {
    // Moving up: insert before the target line.
    let Some((to_start, _)) = doc.line_span(to) else {
      return Ok(noop);
    };
    let mut inserted = block_text;
    inserted.push('\n');
    changes.push((to_start, to_start, Some(inserted)));
    changes.push((delete_from, delete_to, None));
    new_block_start = to_start;
  } else {
    // Moving down: insert after the target line (after its newline, or at
    // the very end when the target is the last line).
    let removed = delete_to - delete_from;
    if to == doc.line_count() {
      let Some((to_start, to_end)) = doc.line_span(to) else {
        return Ok(noop);
      };
      if to_start == to_end && to_end == len && len > 0 {
        // A trailing newline opens an empty final line. Landing there keeps
        // the block's own newline, so the document still ends in one.
        let mut inserted = block_text;
        inserted.push('\n');
        changes.push((delete_from, delete_to, None));
        changes.push((len, len, Some(inserted)));
        new_block_start = len - removed;
      } else {
        let mut inserted = Tendril::from("\n");
        inserted.push_str(&block_text);
        changes.push((delete_from, delete_to, None));
        changes.push((len, len, Some(inserted)));
        new_block_start = len - removed + 1;
      }
    } else {
      let Some((_, to_end)) = doc.line_span(to) else {
        return Ok(noop);
      };
      let mut inserted = block_text;
      inserted.push('\n');
      changes.push((delete_from, delete_to, None));
      changes.push((to_end + 1, to_end + 1, Some(inserted)));
      new_block_start = to_end + 1 - removed;
    }
  }

  let tx = Transaction::change(doc.text(), changes)?;

  // Keep the selection riding along when it sits inside the moved block.
  let selection = doc.selection();
  let tx = if selection.from() >= first_start && selection.to() <= last_end {
    let delta = new_block_start as isize - first_start as isize;
    tx.with_selection(Range::new(
      (selection.anchor as isize + delta) as usize,
      (selection.head as isize + delta) as usize,
    ))
  } else {
    tx
  };
  Ok(tx)
}

/// Move the cursor's line (or the selected block) up or down one position.
fn move_by(doc: &Document, direction: isize) -> Result<Transaction> {
  let selection = doc.selection();
  let (first, last) = if selection.is_empty() {
    let n = doc.line_number_at(selection.head);
    (n, n)
  } else {
    selected_lines(doc)
  };
  let target = if direction < 0 {
    first.checked_sub(1)
  } else {
    Some(last + 1)
  };
  match target {
    Some(to) if to >= 1 && doc.is_valid_line(to) => move_lines(doc, first, last, to),
    _ => Ok(Transaction::new(doc.text())),
  }
}

// Smart keys.
//

/// List-aware Enter. On a list line with content, split at the cursor and
/// open the next line with a fresh marker (keeping an unchecked box when the
/// line had any checkbox). On a list line with empty content, delete the
/// marker instead (list exit). On anything else, empty transaction: the
/// caller falls through to plain newline insertion.
pub fn smart_enter(doc: &Document) -> Result<Transaction> {
  let noop = Transaction::new(doc.text());
  let selection = doc.selection();
  if !selection.is_empty() {
    return Ok(noop);
  }

  let pos = selection.head;
  let line_number = doc.line_number_at(pos);
  let Some((start, end)) = doc.line_span(line_number) else {
    return Ok(noop);
  };
  let text = doc.line_text(line_number).unwrap_or_default();
  let shape = parse_line(&text);
  if !shape.is_list {
    return Ok(noop);
  }

  if shape.content.is_empty() {
    // List exit: the marker (indent included) goes away.
    let tx = Transaction::change(doc.text(), vec![(start, end, None)])?
      .with_selection(Range::point(start));
    return Ok(tx);
  }

  let marker = build_line(&LineShape {
    indent:   shape.indent,
    is_list:  true,
    checkbox: if shape.checkbox == Checkbox::None {
      Checkbox::None
    } else {
      Checkbox::Unchecked
    },
    content:  Tendril::new(),
  });
  let marker_len = marker.chars().count();

  let mut inserted = Tendril::from("\n");
  inserted.push_str(&marker);
  let tx = Transaction::change(doc.text(), vec![(pos, pos, Some(inserted))])?
    .with_selection(Range::point(pos + 1 + marker_len));
  Ok(tx)
}

/// Empty-line Backspace. When the cursor sits at the start of an empty line
/// that is not line 1, merge with the previous line by deleting the newline
/// between them. Anything else is left to the default backspace.
pub fn smart_backspace(doc: &Document) -> Result<Transaction> {
  let noop = Transaction::new(doc.text());
  let selection = doc.selection();
  if !selection.is_empty() {
    return Ok(noop);
  }

  let pos = selection.head;
  let line_number = doc.line_number_at(pos);
  let Some((start, end)) = doc.line_span(line_number) else {
    return Ok(noop);
  };
  if start != end || pos != start || line_number == 1 {
    return Ok(noop);
  }

  let tx = Transaction::change(doc.text(), vec![(start - 1, start, None)])?
    .with_selection(Range::point(start - 1));
  Ok(tx)
}

/// Pointer-press on an empty line pins the cursor to the line start. Returns
/// the corrected selection, or `None` when the clicked line has content.
pub fn clamp_to_line_start_if_blank(doc: &Document, offset: usize) -> Option<Range> {
  let line_number = doc.line_number_at(offset.min(doc.text().len_chars()));
  let (start, end) = doc.line_span(line_number)?;
  (start == end).then(|| Range::point(start))
}

#[cfg(test)]
mod test {
  use super::*;

  fn doc_with_cursor(text: &str, cursor: usize) -> Document {
    let mut doc = Document::from_str(text);
    doc.set_selection(Range::point(cursor));
    doc
  }

  fn apply(doc: &mut Document, tx: Transaction) {
    doc.apply_transaction(&tx).unwrap();
  }

  mod indent_outdent {
    use super::*;

    #[test]
    fn plain_line_becomes_list() {
      let mut doc = doc_with_cursor("note", 2);
      let tx = indent_line(&doc, 1).unwrap();
      apply(&mut doc, tx);
      assert_eq!(doc.text().to_string(), "- note");
      // Cursor keeps its content-relative offset.
      assert_eq!(doc.selection(), Range::point(4));
    }

    #[test]
    fn list_line_gains_a_level() {
      let mut doc = doc_with_cursor("- note", 4);
      let tx = indent_line(&doc, 1).unwrap();
      apply(&mut doc, tx);
      assert_eq!(doc.text().to_string(), "  - note");
      assert_eq!(doc.selection(), Range::point(6));
    }

    #[test]
    fn outdent_non_list_is_noop() {
      let doc = doc_with_cursor("plain", 0);
      let tx = outdent_line(&doc, 1).unwrap();
      assert!(tx.changes().is_empty());
    }

    #[test]
    fn outdent_level_zero_strips_marker() {
      let mut doc = doc_with_cursor("- [x] done", 8);
      let tx = outdent_line(&doc, 1).unwrap();
      apply(&mut doc, tx);
      assert_eq!(doc.text().to_string(), "done");
      assert_eq!(doc.selection(), Range::point(2));
    }

    #[test]
    fn outdent_inverts_indent_on_lists() {
      let original = "  - item";
      let mut doc = doc_with_cursor(original, 5);
      let tx = indent_line(&doc, 1).unwrap();
      apply(&mut doc, tx);
      let tx = outdent_line(&doc, 1).unwrap();
      apply(&mut doc, tx);
      assert_eq!(doc.text().to_string(), original);
    }

    #[test]
    fn invalid_line_numbers_are_noops() {
      let doc = doc_with_cursor("a\nb", 0);
      assert!(indent_line(&doc, 0).unwrap().changes().is_empty());
      assert!(indent_line(&doc, 99).unwrap().changes().is_empty());
      assert!(outdent_line(&doc, 99).unwrap().changes().is_empty());
    }

    #[test]
    fn indent_only_touches_its_line() {
      let mut doc = doc_with_cursor("a\nb\nc", 2);
      let tx = indent_line(&doc, 2).unwrap();
      apply(&mut doc, tx);
      assert_eq!(doc.text().to_string(), "a\n- b\nc");
    }
  }

  mod toggle {
    use super::*;

    #[test]
    fn cycle_closes_after_four_steps() {
      let mut doc = doc_with_cursor("water plants", 0);
      let expected = [
        "- water plants",
        "- [ ] water plants",
        "- [x] water plants",
        "water plants",
      ];
      for step in expected {
        let tx = toggle_list_or_checkbox(&doc, 1).unwrap();
        apply(&mut doc, tx);
        assert_eq!(doc.text().to_string(), step);
      }
    }

    #[test]
    fn click_within_glyph_cycles_checkbox() {
      let mut doc = doc_with_cursor("  - [ ] task", 0);
      // Glyph span starts after the two indent chars.
      let tx = toggle_checkbox_at(&doc, 3).unwrap();
      apply(&mut doc, tx);
      assert_eq!(doc.text().to_string(), "  - [x] task");

      let tx = toggle_checkbox_at(&doc, 3).unwrap();
      apply(&mut doc, tx);
      assert_eq!(doc.text().to_string(), "  - task");

      let tx = toggle_checkbox_at(&doc, 3).unwrap();
      apply(&mut doc, tx);
      assert_eq!(doc.text().to_string(), "  - [ ] task");
    }

    #[test]
    fn click_outside_glyph_is_ignored() {
      let doc = doc_with_cursor("- [ ] task", 0);
      // Span is 6 chars from the bullet; char 8 is inside "task".
      let tx = toggle_checkbox_at(&doc, 8).unwrap();
      assert!(tx.changes().is_empty());
    }

    #[test]
    fn click_on_plain_line_is_ignored() {
      let doc = doc_with_cursor("no list here", 0);
      let tx = toggle_checkbox_at(&doc, 0).unwrap();
      assert!(tx.changes().is_empty());
    }
  }

  mod movement {
    use super::*;

    #[test]
    fn move_down_then_up_restores_document() {
      let original = "a\nb\nc";
      let mut doc = doc_with_cursor(original, 0);

      let tx = move_line(&doc, 1, 2).unwrap();
      apply(&mut doc, tx);
      assert_eq!(doc.text().to_string(), "b\na\nc");

      let tx = move_line(&doc, 2, 1).unwrap();
      apply(&mut doc, tx);
      assert_eq!(doc.text().to_string(), original);
    }

    #[test]
    fn move_last_line_up_and_back() {
      let original = "a\nb";
      let mut doc = doc_with_cursor(original, 0);

      let tx = move_line(&doc, 2, 1).unwrap();
      apply(&mut doc, tx);
      assert_eq!(doc.text().to_string(), "b\na");

      let tx = move_line(&doc, 1, 2).unwrap();
      apply(&mut doc, tx);
      assert_eq!(doc.text().to_string(), original);
    }

    #[test]
    fn move_down_on_trailing_newline_doc_keeps_text() {
      // "a\nb\n" ends in a newline, so ropey reports an empty final line.
      // Moving the last content line down lands on it and must not
      // manufacture a blank line.
      let mut doc = doc_with_cursor("a\nb\n", 2);
      let Outcome::Edit(tx) = execute(&doc, Command::MoveDown).unwrap() else {
        panic!("expected an edit");
      };
      apply(&mut doc, tx);
      assert_eq!(doc.text().to_string(), "a\nb\n");
    }

    #[test]
    fn move_first_line_below_trailing_newline() {
      let mut doc = doc_with_cursor("a\nb\n", 0);
      let tx = move_line(&doc, 1, 3).unwrap();
      apply(&mut doc, tx);
      assert_eq!(doc.text().to_string(), "b\na\n");
    }

    #[test]
    fn move_to_invalid_target_is_noop() {
      let doc = doc_with_cursor("a\nb", 0);
      assert!(move_line(&doc, 1, 1).unwrap().changes().is_empty());
      assert!(move_line(&doc, 1, 0).unwrap().changes().is_empty());
      assert!(move_line(&doc, 1, 9).unwrap().changes().is_empty());
      assert!(move_line(&doc, 9, 1).unwrap().changes().is_empty());
    }

    #[test]
    fn selection_block_moves_as_one() {
      // Select "b\nc" (chars 2..5) and move the block below "d".
      let mut doc = Document::from_str("a\nb\nc\nd");
      doc.set_selection(Range::new(2, 5));

      let tx = move_lines(&doc, 2, 3, 4).unwrap();
      apply(&mut doc, tx);
      assert_eq!(doc.text().to_string(), "a\nd\nb\nc");
      // Relative offsets inside the block are preserved.
      assert_eq!(doc.selection(), Range::new(4, 7));
    }

    #[test]
    fn cursor_rides_moved_line() {
      let mut doc = doc_with_cursor("ab\ncd", 1);
      let tx = move_line(&doc, 1, 2).unwrap();
      apply(&mut doc, tx);
      assert_eq!(doc.text().to_string(), "cd\nab");
      assert_eq!(doc.selection(), Range::point(4));
    }
  }

  mod selection_variants {
    use super::*;

    #[test]
    fn indent_selection_keeps_logical_span() {
      // Four list lines; select all of lines 2-3.
      let mut doc = Document::from_str("- a\n- b\n- c\n- d");
      let (from, _) = doc.line_span(2).unwrap();
      let (_, to) = doc.line_span(3).unwrap();
      doc.set_selection(Range::new(from, to));

      let tx = indent_selection(&doc).unwrap();
      apply(&mut doc, tx);
      assert_eq!(doc.text().to_string(), "- a\n  - b\n  - c\n- d");

      let (from, _) = doc.line_span(2).unwrap();
      let (_, to) = doc.line_span(3).unwrap();
      assert_eq!(doc.selection(), Range::new(from, to));
    }

    #[test]
    fn unchanged_lines_contribute_no_delta() {
      // Outdent over a mix of list and plain lines: plain lines are no-ops.
      let mut doc = Document::from_str("plain\n- item\nplain");
      doc.set_selection(Range::new(0, doc.text().len_chars()));

      let tx = outdent_selection(&doc).unwrap();
      apply(&mut doc, tx);
      assert_eq!(doc.text().to_string(), "plain\nitem\nplain");
      assert_eq!(doc.selection(), Range::new(0, doc.text().len_chars()));
    }

    #[test]
    fn toggle_selection_cycles_every_line() {
      let mut doc = Document::from_str("a\n- b");
      doc.set_selection(Range::new(0, doc.text().len_chars()));

      let tx = toggle_selection(&doc).unwrap();
      apply(&mut doc, tx);
      assert_eq!(doc.text().to_string(), "- a\n- [ ] b");
    }
  }

  mod smart_keys {
    use super::*;

    #[test]
    fn enter_splits_list_line_with_marker() {
      // Cursor right after "buy".
      let mut doc = doc_with_cursor("- [ ] buy milk", 9);
      let tx = smart_enter(&doc).unwrap();
      apply(&mut doc, tx);
      assert_eq!(doc.text().to_string(), "- [ ] buy\n- [ ]  milk");
    }

    #[test]
    fn enter_split_places_cursor_after_new_marker() {
      let mut doc = doc_with_cursor("- ab", 4);
      let tx = smart_enter(&doc).unwrap();
      apply(&mut doc, tx);
      assert_eq!(doc.text().to_string(), "- ab\n- ");
      assert_eq!(doc.selection(), Range::point(7));
    }

    #[test]
    fn enter_keeps_indent_and_resets_checkbox() {
      let mut doc = doc_with_cursor("  - [x] done", 12);
      let tx = smart_enter(&doc).unwrap();
      apply(&mut doc, tx);
      assert_eq!(doc.text().to_string(), "  - [x] done\n  - [ ] ");
    }

    #[test]
    fn enter_on_empty_list_line_exits_the_list() {
      let mut doc = doc_with_cursor("- a\n  - ", 8);
      let tx = smart_enter(&doc).unwrap();
      apply(&mut doc, tx);
      assert_eq!(doc.text().to_string(), "- a\n");
      assert_eq!(doc.selection(), Range::point(4));
    }

    #[test]
    fn enter_on_plain_line_defers() {
      let doc = doc_with_cursor("plain text", 5);
      let tx = smart_enter(&doc).unwrap();
      assert!(tx.changes().is_empty());
    }

    #[test]
    fn backspace_merges_empty_line_with_previous() {
      let mut doc = doc_with_cursor("ab\n\ncd", 3);
      let tx = smart_backspace(&doc).unwrap();
      apply(&mut doc, tx);
      assert_eq!(doc.text().to_string(), "ab\ncd");
      assert_eq!(doc.selection(), Range::point(2));
    }

    #[test]
    fn backspace_defers_elsewhere() {
      // Non-empty line.
      let doc = doc_with_cursor("ab\ncd", 3);
      assert!(smart_backspace(&doc).unwrap().changes().is_empty());
      // Line 1.
      let doc = doc_with_cursor("\nab", 0);
      assert!(smart_backspace(&doc).unwrap().changes().is_empty());
    }

    #[test]
    fn blank_line_click_pins_cursor_to_line_start() {
      let doc = Document::from_str("ab\n\ncd");
      assert_eq!(
        clamp_to_line_start_if_blank(&doc, 3),
        Some(Range::point(3))
      );
      assert_eq!(clamp_to_line_start_if_blank(&doc, 1), None);
    }
  }

  mod dispatch {
    use super::*;

    #[test]
    fn execute_routes_to_selection_variant() {
      let mut doc = Document::from_str("a\nb");
      doc.set_selection(Range::new(0, 3));
      let Outcome::Edit(tx) = execute(&doc, Command::Indent).unwrap() else {
        panic!("expected an edit");
      };
      apply(&mut doc, tx);
      assert_eq!(doc.text().to_string(), "- a\n- b");
    }

    #[test]
    fn execute_move_down_acts_on_cursor_line() {
      let mut doc = doc_with_cursor("a\nb", 0);
      let Outcome::Edit(tx) = execute(&doc, Command::MoveDown).unwrap() else {
        panic!("expected an edit");
      };
      apply(&mut doc, tx);
      assert_eq!(doc.text().to_string(), "b\na");
    }

    #[test]
    fn export_command_produces_text() {
      let doc = Document::from_str("keep this");
      let outcome = execute(&doc, Command::Export).unwrap();
      assert_eq!(outcome, Outcome::Export("keep this".into()));
    }
  }
}

//! Document state: text, selection, title, and history.
//!
//! The document is the single writer target of the whole system. Every user
//! action and every accepted remote update goes through
//! [`Document::apply_transaction`], which applies exactly one change-set
//! atomically, recomputes the selection (explicit override or
//! change-mapping), and records one undo revision. There is no incremental
//! hand-editing of stored text.
//!
//! Line numbers on this surface are 1-based, matching the addressing used
//! by the line transforms in [`crate::commands`].

use ropey::Rope;
use thiserror::Error;

use crate::{
  Tendril,
  history::{History, HistoryError, State},
  selection::Range,
  transaction::{Transaction, TransactionError},
};

pub type Result<T> = std::result::Result<T, DocumentError>;

#[derive(Debug, Error)]
pub enum DocumentError {
  #[error("transaction error: {0}")]
  Transaction(#[from] TransactionError),
  #[error("history error: {0}")]
  History(#[from] HistoryError),
}

#[derive(Debug, Default)]
pub struct Document {
  text:      Rope,
  selection: Range,
  title:     Tendril,
  history:   History,
  version:   u64,
  modified:  bool,
}

impl Document {
  pub fn new(text: Rope) -> Self {
    Self {
      text,
      ..Self::default()
    }
  }

  pub fn from_str(text: &str) -> Self {
    Self::new(Rope::from(text))
  }

  pub fn text(&self) -> &Rope {
    &self.text
  }

  pub fn selection(&self) -> Range {
    self.selection
  }

  /// Move the selection without touching text. Offsets are clamped to the
  /// document and snapped to grapheme boundaries, so a pointer position
  /// landing inside a multi-codepoint cluster cannot produce an invalid
  /// offset.
  pub fn set_selection(&mut self, selection: Range) {
    self.selection = self.clamp_range(selection);
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn set_title(&mut self, title: impl Into<Tendril>) {
    self.title = title.into();
    self.modified = true;
  }

  /// Bumped on every text mutation; lets observers cheaply detect change.
  pub fn version(&self) -> u64 {
    self.version
  }

  pub fn is_modified(&self) -> bool {
    self.modified
  }

  pub fn mark_saved(&mut self) {
    self.modified = false;
  }

  pub fn history(&self) -> &History {
    &self.history
  }

  // 1-based line addressing.
  //

  /// Total number of lines. A trailing `\n` opens a final empty line, which
  /// counts: `"a\n"` has two lines.
  pub fn line_count(&self) -> usize {
    self.text.len_lines()
  }

  pub fn is_valid_line(&self, line_number: usize) -> bool {
    line_number >= 1 && line_number <= self.line_count()
  }

  /// 1-based line number containing `offset` (clamped to the end).
  pub fn line_number_at(&self, offset: usize) -> usize {
    let offset = offset.min(self.text.len_chars());
    self.text.char_to_line(offset) + 1
  }

  /// Char span of a line's content, excluding the trailing newline.
  pub fn line_span(&self, line_number: usize) -> Option<(usize, usize)> {
    if !self.is_valid_line(line_number) {
      return None;
    }
    let line = line_number - 1;
    let text = self.text.slice(..);
    Some((
      jot_core::text::line_start(text, line),
      jot_core::text::line_end(text, line),
    ))
  }

  pub fn line_text(&self, line_number: usize) -> Option<String> {
    if !self.is_valid_line(line_number) {
      return None;
    }
    Some(jot_core::text::line_text(self.text.slice(..), line_number - 1))
  }

  // Mutation.
  //

  /// Apply one transaction atomically: text, then selection, then one undo
  /// revision. Empty transactions leave everything untouched, including the
  /// version counter.
  pub fn apply_transaction(&mut self, transaction: &Transaction) -> Result<()> {
    if transaction.changes().is_empty() {
      if let Some(selection) = transaction.selection() {
        self.set_selection(selection);
      }
      return Ok(());
    }

    let original = State {
      doc:       self.text.clone(),
      selection: self.selection,
    };

    transaction.apply(&mut self.text)?;

    self.selection = match transaction.selection() {
      Some(selection) => self.clamp_range(selection),
      None => self.clamp_range(self.selection.map(transaction.changes())?),
    };

    self.history.commit_revision(transaction, &original)?;
    self.version += 1;
    self.modified = true;
    Ok(())
  }

  /// Replace the entire text in one step, as remote updates and initial
  /// loads do. The cursor stays on the same line and column where the new
  /// text allows it.
  pub fn replace_all(&mut self, text: impl Into<Tendril>) -> Result<()> {
    let len = self.text.len_chars();
    let tx = Transaction::change(&self.text, vec![(0, len, Some(text.into()))])?
      .with_selection(self.selection);
    self.apply_transaction(&tx)
  }

  pub fn undo(&mut self) -> Result<bool> {
    let Some(tx) = self.history.undo() else {
      return Ok(false);
    };
    self.apply_history_step(&tx)?;
    Ok(true)
  }

  pub fn redo(&mut self) -> Result<bool> {
    let Some(tx) = self.history.redo() else {
      return Ok(false);
    };
    self.apply_history_step(&tx)?;
    Ok(true)
  }

  fn apply_history_step(&mut self, transaction: &Transaction) -> Result<()> {
    transaction.apply(&mut self.text)?;
    self.selection = match transaction.selection() {
      Some(selection) => self.clamp_range(selection),
      None => self.clamp_range(self.selection.map(transaction.changes())?),
    };
    self.version += 1;
    self.modified = true;
    Ok(())
  }

  fn clamp_range(&self, range: Range) -> Range {
    let text = self.text.slice(..);
    Range {
      anchor: jot_core::text::snap_to_grapheme_boundary(text, range.anchor),
      head:   jot_core::text::snap_to_grapheme_boundary(text, range.head),
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::transaction::Transaction;

  #[test]
  fn apply_maps_selection() {
    let mut doc = Document::from_str("abc");
    doc.set_selection(Range::point(1));

    let tx = Transaction::change(doc.text(), vec![(0, 0, Some("x".into()))]).unwrap();
    doc.apply_transaction(&tx).unwrap();

    assert_eq!(doc.text().to_string(), "xabc");
    assert_eq!(doc.selection(), Range::point(2));
  }

  #[test]
  fn explicit_selection_overrides_mapping() {
    let mut doc = Document::from_str("abc");
    doc.set_selection(Range::point(1));

    let tx = Transaction::change(doc.text(), vec![(2, 2, Some("x".into()))])
      .unwrap()
      .with_selection(Range::point(0));
    doc.apply_transaction(&tx).unwrap();

    assert_eq!(doc.selection(), Range::point(0));
  }

  #[test]
  fn undo_redo_roundtrip() {
    let mut doc = Document::from_str("hello");
    let tx = Transaction::change(doc.text(), vec![(5, 5, Some("!".into()))]).unwrap();
    doc.apply_transaction(&tx).unwrap();
    assert_eq!(doc.text().to_string(), "hello!");

    assert!(doc.undo().unwrap());
    assert_eq!(doc.text().to_string(), "hello");

    assert!(doc.redo().unwrap());
    assert_eq!(doc.text().to_string(), "hello!");

    assert!(!doc.redo().unwrap());
  }

  #[test]
  fn empty_transaction_does_not_bump_version() {
    let mut doc = Document::from_str("abc");
    let before = doc.version();
    doc.apply_transaction(&Transaction::new(doc.text())).unwrap();
    assert_eq!(doc.version(), before);
    assert!(doc.history().is_empty());
  }

  #[test]
  fn line_addressing_is_one_based() {
    let doc = Document::from_str("ab\ncd\n");
    assert_eq!(doc.line_count(), 3);
    assert_eq!(doc.line_text(1).as_deref(), Some("ab"));
    assert_eq!(doc.line_text(2).as_deref(), Some("cd"));
    assert_eq!(doc.line_text(3).as_deref(), Some(""));
    assert_eq!(doc.line_text(4), None);
    assert_eq!(doc.line_span(2), Some((3, 5)));
    assert_eq!(doc.line_number_at(4), 2);
  }

  #[test]
  fn replace_all_keeps_history() {
    let mut doc = Document::from_str("old");
    doc.replace_all("new text").unwrap();
    assert_eq!(doc.text().to_string(), "new text");
    assert!(doc.undo().unwrap());
    assert_eq!(doc.text().to_string(), "old");
  }
}

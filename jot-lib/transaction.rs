//! Atomic change-sets and transactions over a document.
//!
//! A [`ChangeSet`] is an ordered list of [`Operation`]s (retain / delete /
//! insert, applied from the start of the document) that transforms a
//! document of a known length into a new one. A [`Transaction`] pairs a
//! change-set with an optional explicit selection for after the edit; when
//! no selection is given, callers map their old selection through the
//! change-set instead.
//!
//! Every line transform in [`crate::commands`] is expressed as one
//! transaction built from non-overlapping `(from, to, replacement)` spans in
//! pre-mutation offsets, applied all-or-nothing: the change-set refuses to
//! touch a document whose length does not match what it was built against.
//!
//! # Position mapping
//!
//! [`ChangeSet::map_pos`] shifts a pre-edit char offset to its post-edit
//! location. [`Assoc`] decides which side of an insertion at exactly that
//! offset the position sticks to.
//!
//! # Inversion
//!
//! [`ChangeSet::invert`] built against the pre-edit document yields the
//! undo change-set; applying one then the other restores the original text.

use ropey::{Rope, RopeSlice};
use thiserror::Error;

use crate::{Tendril, selection::Range};

pub type Result<T> = std::result::Result<T, TransactionError>;

/// (from, to) replacement in pre-mutation char offsets.
pub type Change = (usize, usize, Option<Tendril>);

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransactionError {
  #[error("changeset length mismatch: expected {expected}, got {actual}")]
  LengthMismatch { expected: usize, actual: usize },
  #[error("invalid change range: start {from} is after end {to}")]
  InvalidRange { from: usize, to: usize },
  #[error("change range {from}..{to} is out of bounds for document length {len}")]
  RangeOutOfBounds {
    from: usize,
    to:   usize,
    len:  usize,
  },
  #[error("change range {from}..{to} overlaps previous end {prev_end}")]
  OverlappingRange {
    prev_end: usize,
    from:     usize,
    to:       usize,
  },
  #[error("position {pos} is out of bounds for changeset length {len}")]
  PositionOutOfBounds { pos: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
  /// Keep n characters unchanged.
  Retain(usize),

  /// Delete n characters.
  Delete(usize),

  /// Insert text at position.
  Insert(Tendril),
}

impl Operation {
  pub fn len_chars(&self) -> usize {
    match self {
      Operation::Retain(n) | Operation::Delete(n) => *n,
      Operation::Insert(s) => s.chars().count(),
    }
  }
}

/// Which side of an insertion a mapped position associates with.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Assoc {
  /// Stay before text inserted at the position.
  Before,
  /// Move past text inserted at the position.
  After,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeSet {
  changes:   Vec<Operation>,
  /// The required document length. Application is refused unless it matches.
  len:       usize,
  len_after: usize,
}

impl ChangeSet {
  #[must_use]
  pub fn new(doc: RopeSlice) -> Self {
    let len = doc.len_chars();
    Self {
      changes: Vec::new(),
      len,
      len_after: len,
    }
  }

  fn with_capacity(capacity: usize) -> Self {
    Self {
      changes:   Vec::with_capacity(capacity),
      len:       0,
      len_after: 0,
    }
  }

  pub fn changes(&self) -> &[Operation] {
    &self.changes
  }

  /// The document length this changeset applies to.
  pub fn len(&self) -> usize {
    self.len
  }

  /// The document length after applying this changeset.
  pub fn len_after(&self) -> usize {
    self.len_after
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.changes.is_empty() || self.changes == [Operation::Retain(self.len)]
  }

  // Changeset builder operations: delete/insert/retain.
  //

  pub fn delete(&mut self, n: usize) {
    use Operation::*;

    if n == 0 {
      return;
    }

    self.len += n;

    if let Some(Delete(count)) = self.changes.last_mut() {
      *count += n;
    } else {
      self.changes.push(Delete(n))
    }
  }

  pub fn insert(&mut self, fragment: Tendril) {
    use Operation::*;

    if fragment.is_empty() {
      return;
    }

    self.len_after += fragment.chars().count();

    let new_last = match self.changes.as_mut_slice() {
      [.., Insert(prev)] | [.., Insert(prev), Delete(_)] => {
        prev.push_str(&fragment);
        return;
      },
      [.., last @ Delete(_)] => std::mem::replace(last, Insert(fragment)),
      _ => Insert(fragment),
    };

    self.changes.push(new_last);
  }

  pub fn retain(&mut self, n: usize) {
    use Operation::*;

    if n == 0 {
      return;
    }

    self.len += n;
    self.len_after += n;

    if let Some(Retain(count)) = self.changes.last_mut() {
      *count += n;
    } else {
      self.changes.push(Retain(n))
    }
  }

  fn ensure_len(&self, text_len: usize) -> Result<()> {
    if text_len != self.len {
      return Err(TransactionError::LengthMismatch {
        expected: self.len,
        actual:   text_len,
      });
    }
    Ok(())
  }

  /// Apply this changeset in-place. All-or-nothing: the length check up
  /// front is the only way application can fail, so a returned error means
  /// the document was not touched.
  pub fn apply(&self, text: &mut Rope) -> Result<()> {
    self.ensure_len(text.len_chars())?;
    let mut pos = 0;

    for change in &self.changes {
      use Operation::*;
      match change {
        Retain(n) => pos += n,
        Delete(n) => text.remove(pos..pos + *n),
        Insert(s) => {
          text.insert(pos, s);
          pos += s.chars().count();
        },
      }
    }

    Ok(())
  }

  /// Returns a new changeset that reverts this one. The document parameter
  /// expects the original document before this change was applied.
  pub fn invert(&self, original_doc: &Rope) -> Result<Self> {
    if self.changes.is_empty() {
      return Ok(ChangeSet {
        changes:   Vec::new(),
        len:       self.len_after,
        len_after: self.len,
      });
    }

    self.ensure_len(original_doc.len_chars())?;

    let mut changes = Self::with_capacity(self.changes.len());
    let mut pos = 0;

    for change in &self.changes {
      use Operation::*;
      match change {
        Retain(n) => {
          changes.retain(*n);
          pos += n;
        },
        Delete(n) => {
          let text = std::borrow::Cow::from(original_doc.slice(pos..pos + *n));
          changes.insert(Tendril::from(text.as_ref()));
          pos += n;
        },
        Insert(s) => {
          let chars = s.chars().count();
          changes.delete(chars);
        },
      }
    }

    Ok(changes)
  }

  /// Map a position through the changes.
  ///
  /// `assoc` indicates which side to associate the position with: `Before`
  /// keeps it before insertions at that point, `After` moves it past them.
  /// Positions inside a deleted span collapse to the deletion point.
  pub fn map_pos(&self, pos: usize, assoc: Assoc) -> Result<usize> {
    use Operation::*;

    if pos > self.len {
      return Err(TransactionError::PositionOutOfBounds { pos, len: self.len });
    }

    let mut old_pos = 0;
    let mut new_pos = 0;

    for change in &self.changes {
      match change {
        Retain(n) => {
          if pos < old_pos + n {
            return Ok(new_pos + (pos - old_pos));
          }
          old_pos += n;
          new_pos += n;
        },
        Delete(n) => {
          if pos < old_pos + n {
            return Ok(new_pos);
          }
          old_pos += n;
        },
        Insert(s) => {
          if pos == old_pos && assoc == Assoc::Before {
            return Ok(new_pos);
          }
          new_pos += s.chars().count();
        },
      }
    }

    // pos sits in the implicit trailing retain (or at the very end).
    Ok(new_pos + (pos - old_pos))
  }
}

/// A changeset plus an optional explicit post-edit selection.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Transaction {
  changes:   ChangeSet,
  selection: Option<Range>,
}

impl From<ChangeSet> for Transaction {
  fn from(changes: ChangeSet) -> Self {
    Self {
      changes,
      selection: None,
    }
  }
}

impl Transaction {
  /// An empty transaction against `doc`; applying it is a no-op.
  pub fn new(doc: &Rope) -> Self {
    Self {
      changes:   ChangeSet::new(doc.slice(..)),
      selection: None,
    }
  }

  /// Changes made to the buffer.
  pub fn changes(&self) -> &ChangeSet {
    &self.changes
  }

  /// When set, explicitly overrides the post-edit selection.
  pub fn selection(&self) -> Option<Range> {
    self.selection
  }

  pub fn with_selection(mut self, selection: Range) -> Self {
    self.selection = Some(selection);
    self
  }

  /// Apply this transaction in-place.
  pub fn apply(&self, doc: &mut Rope) -> Result<()> {
    self.changes.apply(doc)
  }

  /// Generate a transaction that reverts this one.
  pub fn invert(&self, original: &Rope) -> Result<Self> {
    let changes = self.changes.invert(original)?;

    Ok(Self {
      changes,
      selection: None,
    })
  }

  /// Generate a transaction from a set of changes. Spans must be sorted by
  /// position and must not overlap.
  pub fn change<I>(doc: &Rope, changes: I) -> Result<Self>
  where
    I: IntoIterator<Item = Change>,
  {
    let len = doc.len_chars();
    let changes = changes.into_iter();
    let (lower, upper) = changes.size_hint();
    let size = upper.unwrap_or(lower);
    let mut changeset = ChangeSet::with_capacity(2 * size + 1); // rough estimate

    let mut last = 0;
    for (from, to, tendril) in changes {
      if from > to {
        return Err(TransactionError::InvalidRange { from, to });
      }
      if to > len {
        return Err(TransactionError::RangeOutOfBounds { from, to, len });
      }
      if from < last {
        return Err(TransactionError::OverlappingRange {
          prev_end: last,
          from,
          to,
        });
      }

      // Retain from last "to" to current "from".
      changeset.retain(from - last);
      let span = to - from;
      match tendril {
        Some(text) => {
          changeset.insert(text);
          changeset.delete(span);
        },
        None => changeset.delete(span),
      }
      last = to;
    }

    changeset.retain(len - last);

    Ok(Self::from(changeset))
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn change_applies_replacement() {
    let mut doc = Rope::from("hello world");
    let tx = Transaction::change(&doc, vec![(6, 11, Some("rust".into()))]).unwrap();
    tx.apply(&mut doc).unwrap();
    assert_eq!(doc.to_string(), "hello rust");
  }

  #[test]
  fn multiple_spans_apply_atomically() {
    let mut doc = Rope::from("a b c");
    let tx = Transaction::change(&doc, vec![
      (0, 1, Some("x".into())),
      (2, 3, Some("y".into())),
      (4, 5, None),
    ])
    .unwrap();
    tx.apply(&mut doc).unwrap();
    assert_eq!(doc.to_string(), "x y ");
  }

  #[test]
  fn overlapping_spans_are_rejected() {
    let doc = Rope::from("abcdef");
    let err = Transaction::change(&doc, vec![
      (0, 3, Some("x".into())),
      (2, 4, Some("y".into())),
    ])
    .unwrap_err();
    assert!(matches!(err, TransactionError::OverlappingRange { .. }));
  }

  #[test]
  fn length_mismatch_refuses_application() {
    let doc = Rope::from("abc");
    let tx = Transaction::change(&doc, vec![(0, 1, None)]).unwrap();
    let mut other = Rope::from("something else");
    let err = tx.apply(&mut other).unwrap_err();
    assert!(matches!(err, TransactionError::LengthMismatch { .. }));
    assert_eq!(other.to_string(), "something else");
  }

  #[test]
  fn invert_restores_original() {
    let original = Rope::from("hello world");
    let mut doc = original.clone();
    let tx = Transaction::change(&doc, vec![(0, 5, Some("goodbye".into()))]).unwrap();
    let inverted = tx.invert(&original).unwrap();

    tx.apply(&mut doc).unwrap();
    assert_eq!(doc.to_string(), "goodbye world");
    inverted.apply(&mut doc).unwrap();
    assert_eq!(doc, original);
  }

  #[test]
  fn map_pos_through_insertion() {
    let doc = Rope::from("abcd");
    let tx = Transaction::change(&doc, vec![(2, 2, Some("XY".into()))]).unwrap();
    let cs = tx.changes();

    assert_eq!(cs.map_pos(1, Assoc::Before).unwrap(), 1);
    assert_eq!(cs.map_pos(2, Assoc::Before).unwrap(), 2);
    assert_eq!(cs.map_pos(2, Assoc::After).unwrap(), 4);
    assert_eq!(cs.map_pos(3, Assoc::Before).unwrap(), 5);
  }

  #[test]
  fn map_pos_inside_deletion_collapses() {
    let doc = Rope::from("abcdef");
    let tx = Transaction::change(&doc, vec![(1, 4, None)]).unwrap();
    let cs = tx.changes();

    assert_eq!(cs.map_pos(2, Assoc::Before).unwrap(), 1);
    assert_eq!(cs.map_pos(5, Assoc::Before).unwrap(), 2);
  }

  #[test]
  fn map_pos_out_of_bounds() {
    let doc = Rope::from("ab");
    let tx = Transaction::change(&doc, Vec::new()).unwrap();
    assert!(matches!(
      tx.changes().map_pos(5, Assoc::Before),
      Err(TransactionError::PositionOutOfBounds { .. })
    ));
  }

  #[test]
  fn empty_transaction_is_noop() {
    let mut doc = Rope::from("abc");
    let tx = Transaction::new(&doc);
    assert!(tx.changes().is_empty());
    tx.apply(&mut doc).unwrap();
    assert_eq!(doc.to_string(), "abc");
  }
}

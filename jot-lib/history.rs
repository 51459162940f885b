//! Linear undo/redo history.
//!
//! The host widget this model powers exposes plain linear undo, so unlike a
//! full editor history there is no revision tree and no time-based
//! navigation: a vector of revisions and an index into it. Each revision
//! stores the transaction that produced it and a precomputed inversion
//! (delete operations do not carry the deleted text, so the inversion must
//! be built against the pre-edit document at commit time).
//!
//! Committing while undone truncates the redo tail; there is one timeline.

use thiserror::Error;

use crate::{
  selection::Range,
  transaction::{Transaction, TransactionError},
};

pub type Result<T> = std::result::Result<T, HistoryError>;

#[derive(Debug, Error)]
pub enum HistoryError {
  #[error("transaction error: {0}")]
  Transaction(#[from] TransactionError),
}

/// A document state snapshot taken before a transaction is applied.
#[derive(Debug, Clone)]
pub struct State {
  pub doc:       ropey::Rope,
  pub selection: Range,
}

#[derive(Debug, Clone)]
struct Revision {
  transaction: Transaction,
  // Needed for undo because delete operations don't store deleted text.
  inversion:   Transaction,
  /// Selection to restore when this revision is undone.
  selection_before: Range,
}

/// Stores the history of changes to a document.
///
/// `current` counts applied revisions: 0 means the root state with nothing
/// to undo, `revisions.len()` means nothing to redo.
#[derive(Debug, Default)]
pub struct History {
  revisions: Vec<Revision>,
  current:   usize,
}

impl History {
  /// Record a transaction that was just applied. `original` is the state
  /// the document had before application.
  pub fn commit_revision(&mut self, transaction: &Transaction, original: &State) -> Result<()> {
    let inversion = transaction
      .invert(&original.doc)?
      .with_selection(original.selection);

    self.revisions.truncate(self.current);
    self.revisions.push(Revision {
      transaction: transaction.clone(),
      inversion,
      selection_before: original.selection,
    });
    self.current += 1;
    Ok(())
  }

  /// Step back one revision. Returns the transaction to apply, already
  /// carrying the selection to restore.
  pub fn undo(&mut self) -> Option<Transaction> {
    if self.current == 0 {
      return None;
    }
    self.current -= 1;
    Some(self.revisions[self.current].inversion.clone())
  }

  /// Step forward one revision.
  pub fn redo(&mut self) -> Option<Transaction> {
    let revision = self.revisions.get(self.current)?;
    self.current += 1;
    Some(revision.transaction.clone())
  }

  pub fn can_undo(&self) -> bool {
    self.current > 0
  }

  pub fn can_redo(&self) -> bool {
    self.current < self.revisions.len()
  }

  /// Number of committed revisions (not counting the root state).
  pub fn len(&self) -> usize {
    self.revisions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.revisions.is_empty()
  }
}

//! The main selection: an anchor/head pair of char offsets.
//!
//! The editor surface exposes exactly one selection. `head` is where the
//! cursor visually sits, `anchor` is the other end; when they coincide the
//! range is a plain cursor.
//!
//! ```text
//! anchor=2, head=7: "he[llo w]orld"  (forward selection)
//! anchor=7, head=2: "he]llo w[orld"  (backward selection)
//! anchor=5, head=5: "hello|world"    (cursor)
//! ```
//!
//! After a document mutation the selection is either overridden explicitly
//! by the transaction or carried through the change-set with [`Range::map`].

use ropey::RopeSlice;

use crate::transaction::{Assoc, ChangeSet, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Range {
  pub anchor: usize,
  pub head:   usize,
}

impl Range {
  pub fn new(anchor: usize, head: usize) -> Self {
    Self { anchor, head }
  }

  /// An empty range (cursor) at `pos`.
  pub fn point(pos: usize) -> Self {
    Self {
      anchor: pos,
      head:   pos,
    }
  }

  /// Start of the range, regardless of direction.
  #[inline]
  pub fn from(&self) -> usize {
    self.anchor.min(self.head)
  }

  /// End of the range, regardless of direction.
  #[inline]
  pub fn to(&self) -> usize {
    self.anchor.max(self.head)
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.anchor == self.head
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.to() - self.from()
  }

  pub fn contains(&self, pos: usize) -> bool {
    self.from() <= pos && pos < self.to()
  }

  /// The 0-based (first, last) line indices spanned by this range.
  pub fn line_range(&self, text: RopeSlice) -> (usize, usize) {
    let first = text.char_to_line(self.from());
    let last = text.char_to_line(self.to());
    (first, last)
  }

  /// Carry this range through `changes`. Insertions exactly at an endpoint
  /// push it forward, so a cursor tracks text typed at its position.
  pub fn map(self, changes: &ChangeSet) -> Result<Self> {
    let anchor = changes.map_pos(self.anchor, Assoc::After)?;
    let head = changes.map_pos(self.head, Assoc::After)?;
    Ok(Self { anchor, head })
  }
}

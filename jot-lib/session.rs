//! The editor session: one context owning the cross-cutting editing state.
//!
//! The flags that gate remote synchronization (`applying_remote`,
//! `composing`, `local_editing`, `initializing`) live here as explicit
//! fields instead of globals scattered across modules, together with the
//! debounced-save clock and all transient gesture state. The document has
//! exactly one writer at a time: the local input handler or the remote-sync
//! handler, arbitrated by [`EditorSession::remote_updates_allowed`] rather
//! than a lock.
//!
//! Like the gesture machines, the session takes `Instant`s as arguments so
//! the debounce logic is deterministic under test.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::gesture::{EdgeDragTracker, LongPress, MoveMode, SwipeTracker};

/// Quiet period after the last edit before the document is persisted. Saves
/// are coalesced: only the latest state is written, never a queue of
/// intermediate ones.
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Default)]
pub struct EditorSession {
  /// A remote update is being applied to the document right now.
  applying_remote: bool,
  /// A local edit handler is on the stack.
  local_editing:   bool,
  /// An IME composition is in progress.
  composing:       bool,
  /// Initial load has not finished yet.
  initializing:    bool,
  /// The editor holds input focus.
  focused:         bool,

  /// Deadline of the pending debounced save, if any.
  save_due: Option<Instant>,

  // Transient per-interaction input state, cleared on terminal events.
  pub swipe:      SwipeTracker,
  pub edge_drag:  EdgeDragTracker,
  pub long_press: LongPress,
  pub move_mode:  MoveMode,
}

impl EditorSession {
  pub fn new() -> Self {
    Self {
      initializing: true,
      ..Self::default()
    }
  }

  pub fn finish_initializing(&mut self) {
    self.initializing = false;
  }

  pub fn is_initializing(&self) -> bool {
    self.initializing
  }

  // Single-writer arbitration.
  //

  /// Whether an incoming remote update may be applied now. Suppressed while
  /// a local edit is in flight, while the editor is focused, during IME
  /// composition, and before initial load finishes; applying it then would
  /// clobber in-progress keystrokes.
  pub fn remote_updates_allowed(&self) -> bool {
    !self.initializing
      && !self.local_editing
      && !self.applying_remote
      && !self.composing
      && !self.focused
  }

  pub fn begin_remote_apply(&mut self) {
    self.applying_remote = true;
  }

  pub fn end_remote_apply(&mut self) {
    self.applying_remote = false;
  }

  pub fn is_applying_remote(&self) -> bool {
    self.applying_remote
  }

  pub fn begin_local_edit(&mut self) {
    self.local_editing = true;
  }

  pub fn end_local_edit(&mut self) {
    self.local_editing = false;
  }

  pub fn set_composing(&mut self, composing: bool) {
    self.composing = composing;
  }

  pub fn set_focused(&mut self, focused: bool) {
    self.focused = focused;
    if !focused {
      // Blur abandons a pending move source.
      self.move_mode.clear();
    }
  }

  // Debounced, coalesced saves.
  //

  /// Record that the document changed; (re)starts the debounce window.
  pub fn note_edit(&mut self, now: Instant) {
    self.save_due = Some(now + SAVE_DEBOUNCE);
  }

  /// Whether the debounced save is due. Clears the deadline when it fires;
  /// the caller persists the *current* document state.
  pub fn take_due_save(&mut self, now: Instant) -> bool {
    match self.save_due {
      Some(due) if now >= due => {
        self.save_due = None;
        true
      },
      _ => false,
    }
  }

  pub fn has_pending_save(&self) -> bool {
    self.save_due.is_some()
  }

  /// Terminal pointer event (`touchend` already resolved, `pointercancel`):
  /// clear every per-interaction tracker so no gesture state survives into
  /// the next interaction. Move mode is not cleared; a cancel does not
  /// change it.
  pub fn clear_interaction_state(&mut self) {
    debug!("clearing per-interaction gesture state");
    self.swipe.cancel();
    self.edge_drag.end();
    self.long_press.cancel();
  }
}

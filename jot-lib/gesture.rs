//! Touch/pointer gesture recognition as explicit state machines.
//!
//! The input layer feeds raw events (coordinates, timestamps, selection
//! snapshots) into these trackers and receives logical commands back. All
//! per-interaction state lives here, not on rendering objects, and every
//! terminal event (`end`/`cancel`) clears it so no gesture state leaks into
//! the next interaction.
//!
//! Timing is passed in explicitly (`Instant` arguments) rather than read
//! from a clock, which keeps the machines deterministic and testable.

use std::time::{Duration, Instant};

use crate::selection::Range;

/// Horizontal drag distance before a swipe counts as an indent command.
pub const SWIPE_THRESHOLD_PX: f32 = 40.0;

/// Vertical drag distance before an edge drag moves a line.
pub const EDGE_DRAG_THRESHOLD_PX: f32 = 40.0;

/// Hold duration that turns a press into a long-press.
pub const LONG_PRESS_DURATION: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeAction {
  Indent,
  Outdent,
}

#[derive(Debug, Default)]
struct SwipeStart {
  x:         f32,
  y:         f32,
  /// Selection at touch start; a changed selection at touch end means the
  /// drag was an incidental scroll/select, not a command.
  selection: Range,
}

/// Recognizes horizontal swipes for indent/outdent.
#[derive(Debug, Default)]
pub struct SwipeTracker {
  start: Option<SwipeStart>,
}

impl SwipeTracker {
  pub fn begin(&mut self, x: f32, y: f32, selection: Range) {
    self.start = Some(SwipeStart { x, y, selection });
  }

  /// Resolve the gesture at touch end. Always clears the tracker.
  pub fn end(&mut self, x: f32, y: f32, selection: Range) -> Option<SwipeAction> {
    let start = self.start.take()?;
    if selection != start.selection {
      return None;
    }
    let dx = x - start.x;
    let dy = y - start.y;
    if dx.abs() < SWIPE_THRESHOLD_PX || dx.abs() < dy.abs() {
      return None;
    }
    Some(if dx > 0.0 {
      SwipeAction::Indent
    } else {
      SwipeAction::Outdent
    })
  }

  pub fn cancel(&mut self) {
    self.start = None;
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalMove {
  Up,
  Down,
}

/// Recognizes vertical drags in the dedicated edge region. Fires at most
/// once per discrete gesture.
#[derive(Debug, Default)]
pub struct EdgeDragTracker {
  start_y: Option<f32>,
  fired:   bool,
}

impl EdgeDragTracker {
  pub fn begin(&mut self, y: f32) {
    self.start_y = Some(y);
    self.fired = false;
  }

  /// Feed a drag position. Returns a move exactly once per gesture, when
  /// the threshold is first crossed.
  pub fn update(&mut self, y: f32) -> Option<VerticalMove> {
    let start_y = self.start_y?;
    if self.fired {
      return None;
    }
    let dy = y - start_y;
    if dy.abs() < EDGE_DRAG_THRESHOLD_PX {
      return None;
    }
    self.fired = true;
    Some(if dy < 0.0 {
      VerticalMove::Up
    } else {
      VerticalMove::Down
    })
  }

  pub fn end(&mut self) {
    self.start_y = None;
    self.fired = false;
  }
}

/// What a press turned out to be once released or polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
  /// Released before the long-press threshold.
  ShortTap,
  /// Already reported as a long-press; the release is consumed.
  Consumed,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum PressState {
  #[default]
  Idle,
  Pending(Instant),
  Fired,
}

/// Long-press detection: Idle -> Pending -> Fired.
///
/// The host calls [`LongPress::poll`] from its timer tick; a press held for
/// [`LONG_PRESS_DURATION`] without release fires exactly once.
#[derive(Debug, Default)]
pub struct LongPress {
  state: PressState,
}

impl LongPress {
  pub fn press(&mut self, now: Instant) {
    self.state = PressState::Pending(now);
  }

  /// Returns true exactly when the pending press crosses the threshold.
  pub fn poll(&mut self, now: Instant) -> bool {
    match self.state {
      PressState::Pending(since) if now.duration_since(since) >= LONG_PRESS_DURATION => {
        self.state = PressState::Fired;
        true
      },
      _ => false,
    }
  }

  pub fn release(&mut self, now: Instant) -> Option<PressOutcome> {
    let outcome = match self.state {
      PressState::Idle => None,
      PressState::Pending(since) => {
        if now.duration_since(since) >= LONG_PRESS_DURATION {
          Some(PressOutcome::Consumed)
        } else {
          Some(PressOutcome::ShortTap)
        }
      },
      PressState::Fired => Some(PressOutcome::Consumed),
    };
    self.state = PressState::Idle;
    outcome
  }

  pub fn cancel(&mut self) {
    self.state = PressState::Idle;
  }
}

/// What a short tap on a line should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapAction {
  /// No move source armed: the surface's default action applies (move the
  /// current line down one, or toggle, depending on surface).
  Default,
  /// A source was armed by a long-press; relocate it to the tapped line.
  Move { from: usize, to: usize },
}

/// The long-press-initiated move mode: Idle -> SourceSelected -> Idle.
///
/// A pointer cancel does not change state; an unrelated edit or blur should
/// clear it via [`MoveMode::clear`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MoveMode {
  #[default]
  Idle,
  SourceSelected(usize),
}

impl MoveMode {
  /// A long-press on `line` arms it as the move source.
  pub fn long_press(&mut self, line: usize) {
    *self = MoveMode::SourceSelected(line);
  }

  /// A short tap either performs the armed move or falls through to the
  /// surface default. Always returns to idle after an armed move.
  pub fn short_tap(&mut self, line: usize) -> TapAction {
    match *self {
      MoveMode::Idle => TapAction::Default,
      MoveMode::SourceSelected(from) => {
        *self = MoveMode::Idle;
        TapAction::Move { from, to: line }
      },
    }
  }

  pub fn source(&self) -> Option<usize> {
    match *self {
      MoveMode::Idle => None,
      MoveMode::SourceSelected(line) => Some(line),
    }
  }

  pub fn clear(&mut self) {
    *self = MoveMode::Idle;
  }
}

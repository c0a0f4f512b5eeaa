//! Per-overlay state machine.
//!
//! `Closed -> Opening -> Open -> Closing -> Closed`, with `Destroyed`
//! reachable from every other state and terminal. `Opening` lasts until the
//! deferred `open` notification is delivered on the next tick.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayState {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    BeginOpen,
    Settle,
    BeginClose,
    FinishClose,
    Destroy,
}

impl OverlayState {
    /// Next state for `transition`, or `None` when it is not allowed here.
    pub fn apply(self, transition: Transition) -> Option<OverlayState> {
        use OverlayState::*;
        use Transition::*;
        match (self, transition) {
            (Destroyed, _) => None,
            (_, Destroy) => Some(Destroyed),
            (Closed, BeginOpen) => Some(Opening),
            (Opening, Settle) => Some(Open),
            (Opening | Open, BeginClose) => Some(Closing),
            (Closing, FinishClose) => Some(Closed),
            _ => None,
        }
    }

    /// In the stack: opened and not yet fully closed.
    pub fn is_open(self) -> bool {
        matches!(self, OverlayState::Opening | OverlayState::Open)
    }
}

impl fmt::Display for OverlayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OverlayState::Closed => "closed",
            OverlayState::Opening => "opening",
            OverlayState::Open => "open",
            OverlayState::Closing => "closing",
            OverlayState::Destroyed => "destroyed",
        };
        write!(f, "{s}")
    }
}

/// Wraps the current state and logs rejected transitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lifecycle {
    state: OverlayState,
}

impl Lifecycle {
    pub fn state(&self) -> OverlayState {
        self.state
    }

    /// Apply `transition`; returns false (leaving the state untouched) when
    /// the move is not legal from the current state.
    pub fn advance(&mut self, transition: Transition) -> bool {
        match self.state.apply(transition) {
            Some(next) => {
                self.state = next;
                true
            }
            None => {
                tracing::warn!(state = %self.state, ?transition, "rejected overlay transition");
                false
            }
        }
    }
}

//! `StepRecord`: one processed action, as delivered to the observer.

use gw_core::{Action, Coord, Millis};

/// The structured result of one processed action.
///
/// For an action absorbed by [`pause_next`][crate::TaskController::pause_next]
/// the spatial fields and `reward` are `None`; only the action and the
/// timestamps are meaningful.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepRecord {
    pub state:              Option<Coord>,
    pub state_feature:      Option<char>,
    pub action:             Action,
    pub next_state:         Option<Coord>,
    pub next_state_feature: Option<char>,
    pub reward:             Option<f64>,
    /// When input (re)opened for this step.
    pub start_ms:           Millis,
    /// When the key was pressed.
    pub response_ms:        Millis,
}

impl StepRecord {
    /// Record for an action absorbed while paused.
    pub fn paused(action: Action, start_ms: Millis, response_ms: Millis) -> Self {
        StepRecord {
            state:              None,
            state_feature:      None,
            action,
            next_state:         None,
            next_state_feature: None,
            reward:             None,
            start_ms,
            response_ms,
        }
    }

    /// `true` if this action was absorbed rather than executed.
    #[inline]
    pub fn is_paused_step(&self) -> bool {
        self.next_state.is_none()
    }

    /// Response time (press minus start), in ms.
    #[inline]
    pub fn response_time_ms(&self) -> u64 {
        self.response_ms.since(self.start_ms)
    }
}

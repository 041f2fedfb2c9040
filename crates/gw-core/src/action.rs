//! Player actions shared by the grid model and the task controller.
//!
//! Every action has a one-character code used in experiment data files:
//! `^` up, `v` down, `<` left, `>` right, `x` wait.  The wait action is only
//! legal on grids built with `include_wait`; the grid model decides that, not
//! this type.

use std::fmt;

use crate::GwError;

/// A move the participant can request.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "char", try_from = "char")
)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    /// Stay in place for one step.
    Wait,
}

impl Action {
    /// The four movement actions.
    pub const DIRECTIONS: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    /// Movement actions followed by `Wait`.
    pub const ALL: [Action; 5] = [
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
        Action::Wait,
    ];

    /// Unit direction vector `(dx, dy)`; `Wait` maps to `(0, 0)`.
    #[inline]
    pub fn vector(self) -> (i32, i32) {
        match self {
            Action::Up    => (0, 1),
            Action::Down  => (0, -1),
            Action::Left  => (-1, 0),
            Action::Right => (1, 0),
            Action::Wait  => (0, 0),
        }
    }

    /// One-character data-file code.
    pub fn code(self) -> char {
        match self {
            Action::Up    => '^',
            Action::Down  => 'v',
            Action::Left  => '<',
            Action::Right => '>',
            Action::Wait  => 'x',
        }
    }

    /// Parse a data-file code.
    pub fn from_code(code: char) -> Option<Action> {
        match code {
            '^' => Some(Action::Up),
            'v' => Some(Action::Down),
            '<' => Some(Action::Left),
            '>' => Some(Action::Right),
            'x' => Some(Action::Wait),
            _ => None,
        }
    }

    #[inline]
    pub fn is_wait(self) -> bool {
        matches!(self, Action::Wait)
    }
}

impl From<Action> for char {
    fn from(a: Action) -> char {
        a.code()
    }
}

impl TryFrom<char> for Action {
    type Error = GwError;

    fn try_from(code: char) -> Result<Action, GwError> {
        Action::from_code(code).ok_or(GwError::UnknownAction(code))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

//! MDP-subsystem error type.

use thiserror::Error;

use gw_core::{Action, Coord, GwError};

/// Errors produced by `gw-mdp`.
///
/// Everything except [`MdpError::IllegalAction`] and
/// [`MdpError::OutOfBounds`] is a configuration error: the trial was authored
/// wrong and should not run.
#[derive(Debug, Error)]
pub enum MdpError {
    #[error("feature grid is empty")]
    EmptyGrid,

    #[error("feature grid row {row} has {got} cells, expected {expected}")]
    RaggedRow {
        row:      usize,
        expected: usize,
        got:      usize,
    },

    #[error("feature {feature:?} refers to unknown transition rule {rule:?}")]
    UnknownRule { feature: char, rule: String },

    #[error("{what} {coord} lies outside the {width}x{height} grid")]
    OutOfBounds {
        what:   &'static str,
        coord:  Coord,
        width:  i32,
        height: i32,
    },

    #[error("action {0} is not available on this grid")]
    IllegalAction(Action),

    #[error("trial parameter error: {0}")]
    Params(String),

    #[error(transparent)]
    Core(#[from] GwError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MdpResult<T> = Result<T, MdpError>;

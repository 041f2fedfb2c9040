//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `GwError` as one variant
//! via `#[from]`.

use thiserror::Error;

/// The error type for `gw-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum GwError {
    #[error("unknown action code {0:?}")]
    UnknownAction(char),

    #[error("cannot parse coordinate from {0:?}: expected \"x,y\"")]
    ParseCoord(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `gw-core`.
pub type GwResult<T> = Result<T, GwError>;

use gw_core::Coord;
use gw_mdp::MdpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task controller used before init()")]
    NotInitialized,

    #[error("trial has no avatar position; the grid spec omitted init_state")]
    NoPosition,

    #[error("{0} lies outside the grid")]
    OffGrid(Coord),

    #[error("task configuration error: {0}")]
    Config(String),

    #[error("grid model error: {0}")]
    Mdp(#[from] MdpError),
}

pub type TaskResult<T> = Result<T, TaskError>;

//! Error types for the engine

use thiserror::Error;

/// Errors raised by the game engine.
///
/// Physics outcomes (leaving the grid, hitting a trail) are not errors: they
/// eliminate the player inside the transition function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("invalid action: {0:?}")]
    InvalidAction(String),

    #[error("illegal state: {0}")]
    IllegalState(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GameError {
    pub(crate) fn illegal(msg: impl Into<String>) -> Self {
        GameError::IllegalState(msg.into())
    }
}

/// Errors raised while reading or writing replays
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("replay i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("replay json is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

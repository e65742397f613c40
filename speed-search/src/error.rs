//! Error types for search and configuration

use speed_core::GameError;
use thiserror::Error;

/// Failures inside a search. Never escapes `Policy::act`: the policy turns
/// it into its best-so-far or fallback action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("search deadline exceeded")]
    DeadlineExceeded,

    #[error(transparent)]
    Game(#[from] GameError),
}

/// Invalid or unreadable policy/heuristic configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Game(#[from] GameError),
}

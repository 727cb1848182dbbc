//! Error types shared by the rules engine, the search and the wire layer.

use thiserror::Error;

use crate::oracle::OracleError;

/// Main error type for the library.
#[derive(Debug, Error)]
pub enum QuoridorError {
    /// The action index is not among the legal actions of the position.
    #[error("invalid action {action}: not legal in this position")]
    InvalidAction { action: usize },

    /// The operation is not defined for the current game state
    /// (scoring an unfinished game, searching a finished one).
    #[error("state error: {0}")]
    State(String),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("wire format error: {0}")]
    Wire(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for convenience.
pub type Result<T> = std::result::Result<T, QuoridorError>;

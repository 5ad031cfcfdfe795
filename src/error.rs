//! Error types for board operations.

use thiserror::Error;

use crate::permissions::{Permission, Role};

/// Result type for TrackFlow operations.
pub type Result<T> = std::result::Result<T, TrackflowError>;

/// Errors raised by the board repository and its collaborators.
///
/// Repository errors are always raised before any state is touched, so a
/// caller can report them and carry on with the unchanged state.
#[derive(Debug, Error)]
pub enum TrackflowError {
    /// A required field was empty or otherwise invalid.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A referenced board, column or task does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The operation would break a structural invariant.
    #[error("operation rejected: {0}")]
    InvariantViolation(String),

    /// The current user's role does not grant the permission.
    #[error("{role} role lacks the '{permission}' permission")]
    Forbidden { role: Role, permission: Permission },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl TrackflowError {
    pub fn board_not_found(id: impl Into<String>) -> Self {
        Self::NotFound { kind: "board", id: id.into() }
    }

    pub fn column_not_found(id: impl Into<String>) -> Self {
        Self::NotFound { kind: "column", id: id.into() }
    }

    pub fn task_not_found(id: impl Into<String>) -> Self {
        Self::NotFound { kind: "task", id: id.into() }
    }

    /// True for stale references, which gesture handlers treat as a no-op.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

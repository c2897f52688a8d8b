// src/error.rs

use thiserror::Error;

/// Errors surfaced by the engine's public operations.
///
/// `InvariantViolation` is always a programming error on the caller's side
/// (an operation invoked in a state that forbids it). The rest are expected
/// conditions the caller is supposed to handle or present to the user.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("operation '{operation}' is not valid in state '{state}'")]
    InvariantViolation {
        operation: &'static str,
        state: String,
    },

    #[error("an in-progress session already exists for challenge '{challenge_id}'")]
    DuplicateActiveSession { challenge_id: String },

    #[error("hint {index} was already revealed")]
    HintAlreadyUsed { index: usize },

    #[error("quiz has no questions")]
    EmptyQuiz,

    #[error("no session exists for challenge '{challenge_id}'")]
    UnknownSession { challenge_id: String },

    #[error("code execution failed: {0}")]
    ExecutionFailed(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("malformed seed content: {0}")]
    SeedContent(#[from] serde_json::Error),
}

impl EngineError {
    pub(crate) fn invariant(operation: &'static str, state: impl ToString) -> Self {
        EngineError::InvariantViolation {
            operation,
            state: state.to_string(),
        }
    }
}

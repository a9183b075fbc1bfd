//! Error types shared by every engine.

use thiserror::Error;

/// How a caller should treat a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Bad input; retrying with the same arguments fails again.
    Validation,
    /// The world is in the wrong state right now (no tokens, mid-battle).
    Recoverable,
    /// Persisted state is corrupt and must not be repaired silently.
    Fatal,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    #[error("invalid parameters: {0}")]
    Validation(String),

    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    #[error("insufficient {resource}: need {needed}, have {available}")]
    InsufficientResource {
        resource: &'static str,
        needed: u64,
        available: u64,
    },

    #[error("{0}")]
    StateConflict(String),

    #[error("malformed dungeon state: {0}")]
    MalformedState(String),
}

impl GameError {
    pub fn not_found(kind: &'static str, key: impl ToString) -> Self {
        GameError::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            GameError::Validation(_) | GameError::NotFound { .. } => ErrorSeverity::Validation,
            GameError::InsufficientResource { .. } | GameError::StateConflict(_) => {
                ErrorSeverity::Recoverable
            }
            GameError::MalformedState(_) => ErrorSeverity::Fatal,
        }
    }
}

pub type GameResult<T> = Result<T, GameError>;

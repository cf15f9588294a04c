//! Error types for calendar operations.

use thiserror::Error;

/// Errors that can come out of a calendar operation.
///
/// `NotFound` is a distinct variant so that callers can branch on a missing
/// record instead of inspecting transport errors for it.
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid input: {0}")]
    Validation(String),
}

impl CalendarError {
    /// Wrap any displayable error as a transport failure.
    pub fn transport(err: impl std::fmt::Display) -> Self {
        CalendarError::Transport(err.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CalendarError::NotFound(_))
    }
}

/// Result type alias for calendar operations.
pub type CalendarResult<T> = Result<T, CalendarError>;

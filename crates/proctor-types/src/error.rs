use thiserror::Error;

use crate::session::SessionId;

/// Errors from the proctoring core.
///
/// Every variant is a deterministic validation outcome. None of them is
/// worth retrying; the boundary layer decides how each one is surfaced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProctorError {
    /// Missing or malformed perceptual signal, counts map or identifier.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A counter name outside the recognized violation kinds.
    #[error("invalid violation kind: {0:?}")]
    InvalidViolationKind(String),

    /// The session was never created, was closed, or was evicted.
    #[error("no active session: {0}")]
    SessionNotFound(SessionId),

    /// Configuration rejected at load time.
    #[error("config error: {0}")]
    Config(String),
}

impl ProctorError {
    /// Whether the caller sent something the core refuses to process.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ProctorError::InvalidInput(_) | ProctorError::InvalidViolationKind(_)
        )
    }

    /// Whether the error reports a missing session.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProctorError::SessionNotFound(_))
    }
}

pub type ProctorResult<T> = Result<T, ProctorError>;

//! Common error types for Trilha

use thiserror::Error;

/// Common result type for Trilha operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for the progression engine and its collaborators
///
/// Access and eligibility failures are raised locally, before any network
/// round-trip, so the caller gets synchronous feedback. `Transport` is the
/// only retryable variant; retry policy belongs to the caller, never to the
/// engine.
#[derive(Error, Debug)]
pub enum Error {
    /// Action requires an active enrollment
    #[error("Not enrolled in course")]
    NotEnrolled,

    /// Sequential-access violation: prior lessons are not all completed
    #[error("Lesson is locked: complete the previous lessons first")]
    LessonLocked,

    /// An active enrollment already exists for this learner and course
    #[error("Already enrolled in course")]
    AlreadyEnrolled,

    /// Caller is not permitted to perform this action (role check failed)
    #[error("Not permitted: {0}")]
    NotPermitted(String),

    /// Duplicate or malformed order values in the course hierarchy.
    /// Conservative signal: the engine denies access rather than guessing
    /// an order.
    #[error("Inconsistent course hierarchy: {0}")]
    InconsistentHierarchy(String),

    /// Network or backend failure; the caller may retry
    #[error("Transport error: {0}")]
    Transport(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid payload received at the collaborator boundary
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the caller may usefully retry the failed operation.
    ///
    /// Only transport failures are retryable; everything else is a stable
    /// local fact until the underlying state changes.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

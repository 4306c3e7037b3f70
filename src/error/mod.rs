//! Error types for the runner core.
//!
//! - [`ProtocolViolation`] — Session-fatal integration errors (scope misuse,
//!   unknown payloads, malformed frames).
//! - [`FatalRunnerError`] — Process-fatal startup/integrity errors.
//! - [`SessionError`] — Umbrella for everything that terminates the session.
//!
//! User-code failures are never modeled here; they are captured as
//! [`FailureRecord`](crate::execution::FailureRecord) data at the method
//! executor boundary and travel inside status responses.

pub mod fatal;
pub mod protocol;

pub use fatal::FatalRunnerError;
pub use protocol::ProtocolViolation;

use thiserror::Error;

/// Convenience alias for runner-level results.
pub type RunnerResult<T> = Result<T, SessionError>;

/// Errors that terminate the current test-run session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Protocol(#[from] ProtocolViolation),
    #[error(transparent)]
    Fatal(#[from] FatalRunnerError),
    #[error("I/O error on session channel: {0}")]
    Io(#[from] std::io::Error),
}

//! Session-fatal protocol violations.

use thiserror::Error;

use crate::sandbox::ScopeKind;

/// Integration errors between the orchestrator and this runner.
///
/// These are never converted into failure records: continuing after one
/// would leave the scope stack in an undefined state, so they propagate and
/// terminate the session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolViolation {
    #[error("scope stack underflow: no scope to end")]
    ScopeUnderflow,
    #[error("scope kind mismatch: tried to end {requested:?} but {current:?} is active")]
    ScopeKindMismatch {
        requested: ScopeKind,
        current: ScopeKind,
    },
    #[error("scope {requested:?} does not nest under {current:?}")]
    ScopeNesting {
        requested: ScopeKind,
        current: Option<ScopeKind>,
    },
    #[error("no handler registered for payload kind: {0}")]
    UnknownPayload(String),
    #[error("duplicate handler registered for payload kind: {0}")]
    DuplicateHandler(String),
    #[error("malformed request frame: {0}")]
    MalformedFrame(String),
}

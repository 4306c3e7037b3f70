//! Hook descriptors and the callable capability trait.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::FatalRunnerError;
use crate::execution::ExecutionInfo;
use crate::tags::TagExpression;

/// Lifecycle operation a hook is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HookOperation {
    BeforeSuite,
    AfterSuite,
    BeforeSpec,
    AfterSpec,
    BeforeScenario,
    AfterScenario,
    BeforeStep,
    AfterStep,
}

/// Error surface of a user callable.
///
/// `Failure` is data: the method executor turns it into a failure record
/// and the run continues. `Fatal` is the runner's own integrity check
/// escaping through user code; it is never caught and terminates the
/// session (the split mandated for the executor boundary).
#[derive(Debug, Error)]
pub enum CallableError {
    #[error("{message}")]
    Failure {
        message: String,
        details: String,
        recoverable: bool,
    },
    #[error(transparent)]
    Fatal(#[from] FatalRunnerError),
}

impl CallableError {
    pub fn failure(message: impl Into<String>) -> Self {
        CallableError::Failure {
            message: message.into(),
            details: String::new(),
            recoverable: true,
        }
    }

    pub fn unrecoverable(message: impl Into<String>) -> Self {
        CallableError::Failure {
            message: message.into(),
            details: String::new(),
            recoverable: false,
        }
    }
}

/// Capability interface standing in for reflective method invocation: the
/// loader generates one adapter per discovered user method and registers
/// it here, so the registry never holds raw reflective handles.
#[async_trait]
pub trait HookCallable: Send + Sync {
    async fn invoke(&self, info: &ExecutionInfo) -> Result<(), CallableError>;
}

/// A registered hook: callable, operation, optional tag filter, origin.
///
/// Identity is the callable itself; no ordering key is stored. Invocation
/// order is computed at dispatch time from registration order and the
/// processor's [`HookOrdering`].
#[derive(Clone)]
pub struct HookDescriptor {
    pub callable: Arc<dyn HookCallable>,
    pub operation: HookOperation,
    pub tag_expression: Option<TagExpression>,
    pub declaring_module: String,
}

impl fmt::Debug for HookDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookDescriptor")
            .field("operation", &self.operation)
            .field("tag_expression", &self.tag_expression)
            .field("declaring_module", &self.declaring_module)
            .finish_non_exhaustive()
    }
}

/// Which group of applicable hooks runs first.
///
/// Untagged-first is the conventional choice (unconditional setup/teardown
/// brackets conditional hooks); tagged-first exists because the underlying
/// selection is identical and some processors legitimately want it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HookOrdering {
    #[default]
    UntaggedFirst,
    TaggedFirst,
}

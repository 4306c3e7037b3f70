//! Lifecycle and step processors.
//!
//! One processor instance handles one payload kind. The lifecycle family
//! shares a single driver ([`lifecycle::LifecycleProcessor`]) parameterized
//! by hook operation, applicable tag scope, and scope push/pop choreography.

pub mod datastore;
pub mod lifecycle;
pub mod steps;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ProtocolViolation, SessionError};
use crate::execution::MethodExecutor;
use crate::protocol::{RequestPayload, ResponsePayload};
use crate::registry::{RegistrySlot, StepRegistry};
use crate::sandbox::Sandbox;

pub use datastore::DataStoreInitProcessor;
pub use lifecycle::LifecycleProcessor;
pub use steps::{
    AuthoringRejectionProcessor, ExecuteStepProcessor, RefactorProcessor, StepNamesProcessor,
    StepSource, ValidateStepProcessor,
};

/// Mutable per-session state threaded through every processor.
///
/// Owned by the single session loop; requests are strictly sequential, so
/// no processor ever observes another mid-flight.
pub struct RunnerContext {
    /// Identifies this test-run session in logs.
    pub session_id: String,
    pub sandbox: Sandbox,
    pub hooks: RegistrySlot,
    pub steps: Arc<StepRegistry>,
    pub executor: MethodExecutor,
}

impl RunnerContext {
    pub fn new(hooks: RegistrySlot, steps: Arc<StepRegistry>) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            sandbox: Sandbox::new(),
            hooks,
            steps,
            executor: MethodExecutor::new(),
        }
    }
}

/// One registered request handler.
#[async_trait]
pub trait MessageProcessor: Send + Sync {
    async fn process(
        &self,
        ctx: &mut RunnerContext,
        payload: RequestPayload,
    ) -> Result<ResponsePayload, SessionError>;
}

/// A payload routed to a processor that cannot handle its shape is a
/// programming error in the handler table, not a user failure.
pub(crate) fn wrong_payload(payload: &RequestPayload) -> SessionError {
    ProtocolViolation::UnknownPayload(payload.kind().to_string()).into()
}

//! Data-store initialization processors.

use async_trait::async_trait;

use super::{MessageProcessor, RunnerContext};
use crate::error::SessionError;
use crate::execution::{ExecutionStatusResponse, FailureRecord};
use crate::protocol::{RequestPayload, ResponsePayload};
use crate::sandbox::ScopeKind;

/// Clears the data store of one scope kind on orchestrator request.
///
/// Clearing a scope that is not currently active is answered with a failed
/// status rather than a session-fatal violation: the orchestrator may probe
/// datastore init before the corresponding lifecycle event.
pub struct DataStoreInitProcessor {
    kind: ScopeKind,
}

impl DataStoreInitProcessor {
    pub fn suite() -> Self {
        Self {
            kind: ScopeKind::Suite,
        }
    }

    pub fn spec() -> Self {
        Self {
            kind: ScopeKind::Spec,
        }
    }

    pub fn scenario() -> Self {
        Self {
            kind: ScopeKind::Scenario,
        }
    }
}

#[async_trait]
impl MessageProcessor for DataStoreInitProcessor {
    async fn process(
        &self,
        ctx: &mut RunnerContext,
        _payload: RequestPayload,
    ) -> Result<ResponsePayload, SessionError> {
        if ctx.sandbox.clear_store(self.kind) {
            Ok(ResponsePayload::status(ExecutionStatusResponse::passed()))
        } else {
            Ok(ResponsePayload::status(
                ExecutionStatusResponse::failed_with(FailureRecord::recoverable(
                    format!("no active {:?} scope to initialize", self.kind),
                    String::new(),
                )),
            ))
        }
    }
}

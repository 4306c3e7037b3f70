//! Request routing: one fixed handler table, one response per request.

use std::collections::HashMap;

use tracing::trace;

use crate::error::{ProtocolViolation, SessionError};
use crate::processors::{MessageProcessor, RunnerContext};
use crate::protocol::{MessageKind, RequestEnvelope, ResponseEnvelope};

/// Routes request envelopes to their registered processor.
///
/// The table is assembled once at startup; registering two handlers for
/// one payload kind, or dispatching a kind with no handler, is a protocol
/// violation and terminates the session.
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<MessageKind, Box<dyn MessageProcessor>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        kind: MessageKind,
        processor: Box<dyn MessageProcessor>,
    ) -> Result<(), ProtocolViolation> {
        if self.handlers.contains_key(&kind) {
            return Err(ProtocolViolation::DuplicateHandler(kind.to_string()));
        }
        self.handlers.insert(kind, processor);
        Ok(())
    }

    pub fn has_handler(&self, kind: MessageKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Process one envelope. User-code failures come back as data inside
    /// the response; only session-fatal errors surface as `Err`.
    pub async fn dispatch(
        &self,
        ctx: &mut RunnerContext,
        envelope: RequestEnvelope,
    ) -> Result<ResponseEnvelope, SessionError> {
        let kind = envelope.payload.kind();
        trace!(id = envelope.id, %kind, "dispatching request");
        let handler = self
            .handlers
            .get(&kind)
            .ok_or_else(|| ProtocolViolation::UnknownPayload(kind.to_string()))?;
        let response = handler.process(ctx, envelope.payload).await?;
        Ok(ResponseEnvelope {
            id: envelope.id,
            response,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::ExecutionStatusResponse;
    use crate::protocol::{RequestPayload, ResponsePayload};
    use crate::registry::{HookRegistryBuilder, RegistrySlot, StepRegistry};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Ack;

    #[async_trait]
    impl MessageProcessor for Ack {
        async fn process(
            &self,
            _ctx: &mut RunnerContext,
            _payload: RequestPayload,
        ) -> Result<ResponsePayload, SessionError> {
            Ok(ResponsePayload::status(ExecutionStatusResponse::passed()))
        }
    }

    fn context() -> RunnerContext {
        RunnerContext::new(
            RegistrySlot::new(HookRegistryBuilder::new().build()),
            Arc::new(StepRegistry::default()),
        )
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .register(MessageKind::StepNames, Box::new(Ack))
            .unwrap();
        let err = dispatcher
            .register(MessageKind::StepNames, Box::new(Ack))
            .unwrap_err();
        assert_eq!(
            err,
            ProtocolViolation::DuplicateHandler("StepNames".to_string())
        );
    }

    #[tokio::test]
    async fn test_unknown_payload_is_violation() {
        let dispatcher = Dispatcher::new();
        let mut ctx = context();
        let err = dispatcher
            .dispatch(
                &mut ctx,
                RequestEnvelope {
                    id: 1,
                    payload: RequestPayload::StepNames,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Protocol(ProtocolViolation::UnknownPayload(_))
        ));
    }

    #[tokio::test]
    async fn test_response_carries_request_id() {
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .register(MessageKind::KillProcess, Box::new(Ack))
            .unwrap();
        let mut ctx = context();
        let response = dispatcher
            .dispatch(
                &mut ctx,
                RequestEnvelope {
                    id: 42,
                    payload: RequestPayload::KillProcess,
                },
            )
            .await
            .unwrap();
        assert_eq!(response.id, 42);
    }
}

//! Step execution, validation, listing, and refactor processors.

use async_trait::async_trait;
use tracing::debug;

use super::{wrong_payload, MessageProcessor, RunnerContext};
use crate::error::SessionError;
use crate::execution::{ExecutionStatusResponse, FailureRecord};
use crate::protocol::{RequestPayload, ResponsePayload};

/// Where step texts come from: the loaded project's registry (full surface)
/// or a statically parsed list (authoring surface, nothing executable).
#[derive(Debug, Clone)]
pub enum StepSource {
    Registry,
    Static(Vec<String>),
}

/// Runs a step implementation between the step-scope machinery.
pub struct ExecuteStepProcessor;

#[async_trait]
impl MessageProcessor for ExecuteStepProcessor {
    async fn process(
        &self,
        ctx: &mut RunnerContext,
        payload: RequestPayload,
    ) -> Result<ResponsePayload, SessionError> {
        let RequestPayload::ExecuteStep {
            info,
            step_text,
            parameters,
        } = payload
        else {
            return Err(wrong_payload(&payload));
        };

        let Some(implementation) = ctx.steps.lookup(&step_text).cloned() else {
            return Ok(ResponsePayload::status(
                ExecutionStatusResponse::failed_with(FailureRecord::recoverable(
                    format!("no implementation found for step: {step_text}"),
                    String::new(),
                )),
            ));
        };

        debug!(%step_text, module = %implementation.declaring_module, "executing step");
        let outcome = ctx
            .executor
            .run_step(&implementation, &info, &parameters)
            .await?;

        let mut status = ExecutionStatusResponse::passed();
        status.record(outcome.duration, outcome.failure);
        Ok(ResponsePayload::status(status))
    }
}

/// Answers step validation requests against the configured source.
pub struct ValidateStepProcessor {
    source: StepSource,
}

impl ValidateStepProcessor {
    pub fn new(source: StepSource) -> Self {
        Self { source }
    }
}

#[async_trait]
impl MessageProcessor for ValidateStepProcessor {
    async fn process(
        &self,
        ctx: &mut RunnerContext,
        payload: RequestPayload,
    ) -> Result<ResponsePayload, SessionError> {
        let RequestPayload::ValidateStep { step_text } = payload else {
            return Err(wrong_payload(&payload));
        };

        let (is_valid, is_duplicate) = match &self.source {
            StepSource::Registry => (
                ctx.steps.is_implemented(&step_text),
                ctx.steps.is_duplicate(&step_text),
            ),
            StepSource::Static(steps) => {
                let occurrences = steps.iter().filter(|s| *s == &step_text).count();
                (occurrences > 0, occurrences > 1)
            }
        };
        let message = if is_valid {
            String::new()
        } else {
            format!("no implementation found for step: {step_text}")
        };
        Ok(ResponsePayload::StepValidation {
            is_valid,
            is_duplicate,
            message,
        })
    }
}

/// Lists every known step text.
pub struct StepNamesProcessor {
    source: StepSource,
}

impl StepNamesProcessor {
    pub fn new(source: StepSource) -> Self {
        Self { source }
    }
}

#[async_trait]
impl MessageProcessor for StepNamesProcessor {
    async fn process(
        &self,
        ctx: &mut RunnerContext,
        payload: RequestPayload,
    ) -> Result<ResponsePayload, SessionError> {
        if payload != RequestPayload::StepNames {
            return Err(wrong_payload(&payload));
        }
        let steps = match &self.source {
            StepSource::Registry => ctx.steps.all_step_texts(),
            StepSource::Static(steps) => steps.clone(),
        };
        Ok(ResponsePayload::StepNames { steps })
    }
}

/// Reports which module implements a step so the authoring side can apply
/// a rename; the source rewrite itself belongs to the external tooling.
pub struct RefactorProcessor;

#[async_trait]
impl MessageProcessor for RefactorProcessor {
    async fn process(
        &self,
        ctx: &mut RunnerContext,
        payload: RequestPayload,
    ) -> Result<ResponsePayload, SessionError> {
        let RequestPayload::Refactor { old_text, new_text } = payload else {
            return Err(wrong_payload(&payload));
        };

        match ctx.steps.lookup(&old_text) {
            Some(implementation) => Ok(ResponsePayload::Refactor {
                success: true,
                message: format!("rename '{old_text}' to '{new_text}'"),
                files_changed: vec![implementation.declaring_module.clone()],
            }),
            None => Ok(ResponsePayload::Refactor {
                success: false,
                message: format!("no implementation found for step: {old_text}"),
                files_changed: Vec::new(),
            }),
        }
    }
}

/// Answers execution requests on the authoring surface: nothing runs, the
/// caller gets a failed status instead of a dropped request.
pub struct AuthoringRejectionProcessor;

#[async_trait]
impl MessageProcessor for AuthoringRejectionProcessor {
    async fn process(
        &self,
        _ctx: &mut RunnerContext,
        payload: RequestPayload,
    ) -> Result<ResponsePayload, SessionError> {
        Ok(ResponsePayload::status(
            ExecutionStatusResponse::failed_with(FailureRecord::fatal(
                format!(
                    "{} is not available: the target project failed to build (authoring mode)",
                    payload.kind()
                ),
                String::new(),
            )),
        ))
    }
}

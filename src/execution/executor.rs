//! The method executor: the isolation boundary around user code.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use futures::FutureExt;
use serde_json::Value;
use tracing::warn;

use super::{ExecutionInfo, FailureRecord};
use crate::error::FatalRunnerError;
use crate::registry::{CallableError, HookDescriptor, StepImplementation};

/// Outcome of one guarded invocation: how long it took, and the failure
/// record if the callable failed or panicked.
#[derive(Debug)]
pub struct HookRunOutcome {
    pub duration: Duration,
    pub failure: Option<FailureRecord>,
}

impl HookRunOutcome {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

/// Invokes hook and step callables without letting a single failure crash
/// the process. Returned failures and panics become [`FailureRecord`] data;
/// [`FatalRunnerError`]s raised by the runner's own integrity checks are
/// the one thing allowed through.
#[derive(Debug, Default)]
pub struct MethodExecutor;

impl MethodExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn run_hook(
        &self,
        descriptor: &HookDescriptor,
        info: &ExecutionInfo,
    ) -> Result<HookRunOutcome, FatalRunnerError> {
        self.guarded(&descriptor.declaring_module, descriptor.callable.invoke(info))
            .await
    }

    pub async fn run_step(
        &self,
        implementation: &StepImplementation,
        info: &ExecutionInfo,
        parameters: &[Value],
    ) -> Result<HookRunOutcome, FatalRunnerError> {
        self.guarded(
            &implementation.declaring_module,
            implementation.callable.invoke(info, parameters),
        )
        .await
    }

    async fn guarded<F>(
        &self,
        origin: &str,
        callable: F,
    ) -> Result<HookRunOutcome, FatalRunnerError>
    where
        F: Future<Output = Result<(), CallableError>>,
    {
        let start = Instant::now();
        let result = AssertUnwindSafe(callable).catch_unwind().await;
        let duration = start.elapsed();

        let failure = match result {
            Ok(Ok(())) => None,
            Ok(Err(CallableError::Failure {
                message,
                details,
                recoverable,
            })) => {
                warn!(origin, %message, recoverable, "callable reported failure");
                Some(FailureRecord {
                    message,
                    stack_trace: details,
                    recoverable,
                })
            }
            Ok(Err(CallableError::Fatal(fatal))) => return Err(fatal),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(origin, %message, "callable panicked");
                Some(FailureRecord::recoverable(
                    message,
                    format!("panic in {origin}"),
                ))
            }
        };
        Ok(HookRunOutcome { duration, failure })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "callable panicked".to_string()
    }
}

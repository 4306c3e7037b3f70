//! Service composition and the TCP front-end.
//!
//! At process start exactly one of two RPC surfaces is chosen: the full
//! execution surface when the target project built, or a reduced authoring
//! surface otherwise. The choice never changes for the process lifetime.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncWrite, BufReader, BufWriter};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::RunnerConfig;
use crate::dispatcher::Dispatcher;
use crate::error::{FatalRunnerError, ProtocolViolation, RunnerResult, SessionError};
use crate::execution::ExecutionStatusResponse;
use crate::processors::{
    AuthoringRejectionProcessor, DataStoreInitProcessor, ExecuteStepProcessor, LifecycleProcessor,
    MessageProcessor, RefactorProcessor, RunnerContext, StepNamesProcessor, StepSource,
    ValidateStepProcessor,
};
use crate::protocol::{
    read_request, write_response, MessageKind, RequestPayload, ResponseEnvelope, ResponsePayload,
};
use crate::registry::{HookRegistry, HookRegistryBuilder, RegistrySlot, StepRegistry};

/// Support-library series this runner is built against. A project loaded
/// with a different series would hand us adapters with the wrong shape.
pub const REQUIRED_SUPPORT_SERIES: &str = "0.2";

/// Outcome of the external project build, reported by the bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Success,
    Failed,
}

/// Everything the external loader hands over after (attempting) the build.
pub struct ProjectLoad {
    pub outcome: BuildOutcome,
    pub hooks: HookRegistry,
    pub steps: StepRegistry,
    /// Step texts recovered by static parsing, usable even without a build.
    pub static_steps: Vec<String>,
}

impl ProjectLoad {
    /// A load with no user registrations; real loaders populate the
    /// registries through their builders before handing the load over.
    pub fn empty(outcome: BuildOutcome) -> Self {
        Self {
            outcome,
            hooks: HookRegistryBuilder::new().build(),
            steps: StepRegistry::default(),
            static_steps: Vec::new(),
        }
    }
}

/// The RPC surface exposed for this process lifetime.
#[derive(Debug)]
pub enum ServiceSurface {
    Full {
        hooks: RegistrySlot,
        steps: Arc<StepRegistry>,
    },
    Authoring {
        static_steps: Vec<String>,
    },
}

/// Decide the surface exactly once from the build outcome.
pub fn compose_surface(
    project: ProjectLoad,
    config: &RunnerConfig,
) -> Result<ServiceSurface, FatalRunnerError> {
    match project.outcome {
        BuildOutcome::Success => Ok(ServiceSurface::Full {
            hooks: RegistrySlot::new(project.hooks),
            steps: Arc::new(project.steps),
        }),
        BuildOutcome::Failed if config.ignore_build_failures => {
            info!("target project failed to build; exposing authoring surface");
            Ok(ServiceSurface::Authoring {
                static_steps: project.static_steps,
            })
        }
        BuildOutcome::Failed => Err(FatalRunnerError::BuildFailed),
    }
}

/// Verify the loaded support library belongs to the required series.
pub fn ensure_support_compatibility(found: Option<&str>) -> Result<(), FatalRunnerError> {
    let Some(found) = found else {
        // No version reported means the bundled library is in use.
        return Ok(());
    };
    let compatible = found == REQUIRED_SUPPORT_SERIES
        || found.starts_with(&format!("{REQUIRED_SUPPORT_SERIES}."));
    if compatible {
        Ok(())
    } else {
        Err(FatalRunnerError::IncompatibleSupportLibrary {
            found: found.to_string(),
            required: REQUIRED_SUPPORT_SERIES.to_string(),
        })
    }
}

/// Acknowledges a kill request; the session loop ends after the response.
struct KillProcessAck;

#[async_trait]
impl MessageProcessor for KillProcessAck {
    async fn process(
        &self,
        _ctx: &mut RunnerContext,
        _payload: RequestPayload,
    ) -> Result<ResponsePayload, SessionError> {
        Ok(ResponsePayload::status(ExecutionStatusResponse::passed()))
    }
}

/// Assemble the handler table and session context for the chosen surface.
pub fn compose_dispatcher(
    surface: ServiceSurface,
) -> Result<(Dispatcher, RunnerContext), ProtocolViolation> {
    let mut dispatcher = Dispatcher::new();
    let ctx = match surface {
        ServiceSurface::Full { hooks, steps } => {
            dispatcher.register(
                MessageKind::SuiteExecutionStarting,
                Box::new(LifecycleProcessor::suite_starting()),
            )?;
            dispatcher.register(
                MessageKind::SuiteExecutionEnding,
                Box::new(LifecycleProcessor::suite_ending()),
            )?;
            dispatcher.register(
                MessageKind::SpecExecutionStarting,
                Box::new(LifecycleProcessor::spec_starting()),
            )?;
            dispatcher.register(
                MessageKind::SpecExecutionEnding,
                Box::new(LifecycleProcessor::spec_ending()),
            )?;
            dispatcher.register(
                MessageKind::ScenarioExecutionStarting,
                Box::new(LifecycleProcessor::scenario_starting()),
            )?;
            dispatcher.register(
                MessageKind::ScenarioExecutionEnding,
                Box::new(LifecycleProcessor::scenario_ending()),
            )?;
            dispatcher.register(
                MessageKind::StepExecutionStarting,
                Box::new(LifecycleProcessor::step_starting()),
            )?;
            dispatcher.register(
                MessageKind::StepExecutionEnding,
                Box::new(LifecycleProcessor::step_ending()),
            )?;
            dispatcher.register(MessageKind::ExecuteStep, Box::new(ExecuteStepProcessor))?;
            dispatcher.register(
                MessageKind::ValidateStep,
                Box::new(ValidateStepProcessor::new(StepSource::Registry)),
            )?;
            dispatcher.register(
                MessageKind::StepNames,
                Box::new(StepNamesProcessor::new(StepSource::Registry)),
            )?;
            dispatcher.register(MessageKind::Refactor, Box::new(RefactorProcessor))?;
            dispatcher.register(
                MessageKind::SuiteDataStoreInit,
                Box::new(DataStoreInitProcessor::suite()),
            )?;
            dispatcher.register(
                MessageKind::SpecDataStoreInit,
                Box::new(DataStoreInitProcessor::spec()),
            )?;
            dispatcher.register(
                MessageKind::ScenarioDataStoreInit,
                Box::new(DataStoreInitProcessor::scenario()),
            )?;
            dispatcher.register(MessageKind::KillProcess, Box::new(KillProcessAck))?;
            RunnerContext::new(hooks, steps)
        }
        ServiceSurface::Authoring { static_steps } => {
            dispatcher.register(
                MessageKind::StepNames,
                Box::new(StepNamesProcessor::new(StepSource::Static(
                    static_steps.clone(),
                ))),
            )?;
            dispatcher.register(
                MessageKind::ValidateStep,
                Box::new(ValidateStepProcessor::new(StepSource::Static(static_steps))),
            )?;
            dispatcher.register(MessageKind::KillProcess, Box::new(KillProcessAck))?;
            for kind in MessageKind::ALL {
                if !dispatcher.has_handler(kind) {
                    dispatcher.register(kind, Box::new(AuthoringRejectionProcessor))?;
                }
            }
            RunnerContext::new(
                RegistrySlot::new(HookRegistryBuilder::new().build()),
                Arc::new(StepRegistry::default()),
            )
        }
    };
    Ok((dispatcher, ctx))
}

/// The single-session TCP front-end.
pub struct RunnerServer {
    listener: TcpListener,
    port: u16,
}

impl RunnerServer {
    /// Bind an ephemeral local port. The caller prints it to stdout for the
    /// orchestrator to parse.
    pub async fn bind() -> Result<Self, FatalRunnerError> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(FatalRunnerError::Bind)?;
        let port = listener
            .local_addr()
            .map_err(FatalRunnerError::Bind)?
            .port();
        Ok(Self { listener, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Accept a connection and process its requests strictly sequentially
    /// until the peer disconnects or asks us to die. In daemon mode the
    /// orchestrator reconnects after project rebuilds, so the listener keeps
    /// accepting; the external loader swaps hook generations through its
    /// [`crate::registry::RegistrySlot`] clone between sessions.
    ///
    /// A session-fatal error is reported to the peer as one final error
    /// frame before the stream closes.
    pub async fn serve(
        self,
        dispatcher: Dispatcher,
        mut ctx: RunnerContext,
        daemon: bool,
    ) -> RunnerResult<()> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            info!(%peer, session = %ctx.session_id, "orchestrator connected");

            let (read_half, write_half) = stream.into_split();
            let mut reader = BufReader::new(read_half);
            let mut writer = BufWriter::new(write_half);

            loop {
                let request = match read_request(&mut reader).await {
                    Ok(Some(request)) => request,
                    Ok(None) => break,
                    Err(err) => {
                        report_session_error(&mut writer, 0, &err).await;
                        return Err(err);
                    }
                };
                let id = request.id;
                let kill_requested = request.payload.kind() == MessageKind::KillProcess;
                let response = match dispatcher.dispatch(&mut ctx, request).await {
                    Ok(response) => response,
                    Err(err) => {
                        report_session_error(&mut writer, id, &err).await;
                        return Err(err);
                    }
                };
                write_response(&mut writer, &response).await?;
                if kill_requested {
                    info!("kill requested; ending session");
                    return Ok(());
                }
            }
            info!("session closed");
            if !daemon {
                return Ok(());
            }
        }
    }
}

/// Best-effort delivery of the termination reason; the session is over
/// either way, so a write failure here is not reported further.
async fn report_session_error<W>(writer: &mut W, id: u64, err: &SessionError)
where
    W: AsyncWrite + Unpin,
{
    let frame = ResponseEnvelope {
        id,
        response: ResponsePayload::Error {
            message: err.to_string(),
        },
    };
    let _ = write_response(writer, &frame).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config(ignore_build_failures: bool) -> RunnerConfig {
        RunnerConfig {
            project_root: PathBuf::from("/tmp/project"),
            daemon: false,
            ignore_build_failures,
        }
    }

    #[test]
    fn test_successful_build_gets_full_surface() {
        let surface =
            compose_surface(ProjectLoad::empty(BuildOutcome::Success), &config(false)).unwrap();
        assert!(matches!(surface, ServiceSurface::Full { .. }));
    }

    #[test]
    fn test_failed_build_without_override_is_fatal() {
        let err =
            compose_surface(ProjectLoad::empty(BuildOutcome::Failed), &config(false)).unwrap_err();
        assert!(matches!(err, FatalRunnerError::BuildFailed));
    }

    #[test]
    fn test_failed_build_with_override_degrades() {
        let mut project = ProjectLoad::empty(BuildOutcome::Failed);
        project.static_steps = vec!["Parsed step".into()];
        let surface = compose_surface(project, &config(true)).unwrap();
        assert!(matches!(surface, ServiceSurface::Authoring { .. }));
    }

    #[test]
    fn test_full_table_covers_every_kind() {
        let surface =
            compose_surface(ProjectLoad::empty(BuildOutcome::Success), &config(false)).unwrap();
        let (dispatcher, _ctx) = compose_dispatcher(surface).unwrap();
        for kind in MessageKind::ALL {
            assert!(dispatcher.has_handler(kind), "missing handler for {kind}");
        }
    }

    #[test]
    fn test_authoring_table_covers_every_kind() {
        let surface = ServiceSurface::Authoring {
            static_steps: vec![],
        };
        let (dispatcher, _ctx) = compose_dispatcher(surface).unwrap();
        for kind in MessageKind::ALL {
            assert!(dispatcher.has_handler(kind), "missing handler for {kind}");
        }
    }

    #[test]
    fn test_support_compatibility() {
        assert!(ensure_support_compatibility(None).is_ok());
        assert!(ensure_support_compatibility(Some("0.2")).is_ok());
        assert!(ensure_support_compatibility(Some("0.2.5")).is_ok());
        assert!(matches!(
            ensure_support_compatibility(Some("0.1.9")),
            Err(FatalRunnerError::IncompatibleSupportLibrary { .. })
        ));
        // "0.20" is a different series, not a prefix match.
        assert!(ensure_support_compatibility(Some("0.20")).is_err());
    }
}

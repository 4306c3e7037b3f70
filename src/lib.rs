//! # Gauntlet — execution runtime for a spec-test runner
//!
//! `gauntlet` is the out-of-process execution service behind a test
//! orchestrator: it accepts lifecycle events for one test run over a single
//! RPC channel, figures out which user hooks apply, runs them in a
//! deterministic order inside nested execution scopes, and answers every
//! request with exactly one status response.
//!
//! The moving parts:
//!
//! - **[`tags`]** — boolean tag expressions and the pure matcher deciding
//!   hook applicability.
//! - **[`registry`]** — immutable hook and step catalogs built once at
//!   startup; daemon mode swaps whole generations atomically.
//! - **[`sandbox`]** — the strict stack of suite/spec/scenario/step scopes,
//!   each with its own data store.
//! - **[`execution`]** — execution-info snapshots, status responses, and the
//!   method executor isolating user code from the dispatcher.
//! - **[`processors`]** — one processor per message kind; the lifecycle
//!   family shares a single driver.
//! - **[`dispatcher`]** — the fixed payload-kind → processor table.
//! - **[`service`]** — surface composition (full vs. authoring) and the
//!   single-session TCP front-end.
//!
//! Requests are processed strictly sequentially: scope state and data
//! stores are owned by one session loop and never mutated concurrently.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod execution;
pub mod processors;
pub mod protocol;
pub mod registry;
pub mod sandbox;
pub mod service;
pub mod tags;

pub use config::RunnerConfig;
pub use dispatcher::Dispatcher;
pub use error::{FatalRunnerError, ProtocolViolation, RunnerResult, SessionError};
pub use execution::{ExecutionInfo, ExecutionStatusResponse, FailureRecord, MethodExecutor};
pub use processors::{LifecycleProcessor, MessageProcessor, RunnerContext};
pub use protocol::{MessageKind, RequestEnvelope, RequestPayload, ResponseEnvelope, ResponsePayload};
pub use registry::{
    HookCallable, HookDescriptor, HookOperation, HookOrdering, HookRegistry, HookRegistryBuilder,
    RegistrySlot, StepCallable, StepImplementation, StepRegistry, StepRegistryBuilder,
};
pub use sandbox::{DataStore, ExecutionScope, Sandbox, ScopeKind};
pub use service::{
    compose_dispatcher, compose_surface, ensure_support_compatibility, BuildOutcome, ProjectLoad,
    RunnerServer, ServiceSurface,
};
pub use tags::{matches, parse_tag_expression, TagExpression};

//! The shared lifecycle driver and its per-event specializations.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::debug;

use super::{MessageProcessor, RunnerContext};
use crate::error::SessionError;
use crate::execution::{ExecutionInfo, ExecutionStatusResponse};
use crate::protocol::{RequestPayload, ResponsePayload};
use crate::registry::{HookOperation, HookOrdering};
use crate::sandbox::ScopeKind;

/// Which tags are applicable for hook selection at this event level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagScope {
    /// Suite events: no spec/scenario is active, only untagged hooks match.
    None,
    /// Spec events: the spec's own tags.
    Spec,
    /// Scenario and step events: union of spec and scenario tags.
    Scenario,
}

/// Scope stack choreography around the hook run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeAction {
    /// `*-starting`: push before any hook runs, so hooks observe the scope
    /// as already active.
    Push(ScopeKind),
    /// `*-ending`: pop after every hook has run.
    Pop(ScopeKind),
}

/// Processor for one lifecycle event kind.
///
/// Each specialization fixes the triggered hook operation, the applicable
/// tag scope, and the scope action; the `process` driver is shared.
pub struct LifecycleProcessor {
    operation: HookOperation,
    tag_scope: TagScope,
    scope_action: ScopeAction,
    ordering: HookOrdering,
}

impl LifecycleProcessor {
    fn new(operation: HookOperation, tag_scope: TagScope, scope_action: ScopeAction) -> Self {
        Self {
            operation,
            tag_scope,
            scope_action,
            ordering: HookOrdering::default(),
        }
    }

    /// Select the alternative tagged-first ordering for this processor.
    pub fn with_ordering(mut self, ordering: HookOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn suite_starting() -> Self {
        Self::new(
            HookOperation::BeforeSuite,
            TagScope::None,
            ScopeAction::Push(ScopeKind::Suite),
        )
    }

    pub fn suite_ending() -> Self {
        Self::new(
            HookOperation::AfterSuite,
            TagScope::None,
            ScopeAction::Pop(ScopeKind::Suite),
        )
    }

    pub fn spec_starting() -> Self {
        Self::new(
            HookOperation::BeforeSpec,
            TagScope::Spec,
            ScopeAction::Push(ScopeKind::Spec),
        )
    }

    pub fn spec_ending() -> Self {
        Self::new(
            HookOperation::AfterSpec,
            TagScope::Spec,
            ScopeAction::Pop(ScopeKind::Spec),
        )
    }

    pub fn scenario_starting() -> Self {
        Self::new(
            HookOperation::BeforeScenario,
            TagScope::Scenario,
            ScopeAction::Push(ScopeKind::Scenario),
        )
    }

    pub fn scenario_ending() -> Self {
        Self::new(
            HookOperation::AfterScenario,
            TagScope::Scenario,
            ScopeAction::Pop(ScopeKind::Scenario),
        )
    }

    pub fn step_starting() -> Self {
        Self::new(
            HookOperation::BeforeStep,
            TagScope::Scenario,
            ScopeAction::Push(ScopeKind::Step),
        )
    }

    pub fn step_ending() -> Self {
        Self::new(
            HookOperation::AfterStep,
            TagScope::Scenario,
            ScopeAction::Pop(ScopeKind::Step),
        )
    }

    fn active_tags(&self, info: &ExecutionInfo) -> HashSet<String> {
        match self.tag_scope {
            TagScope::None => HashSet::new(),
            TagScope::Spec => info.spec_tags(),
            TagScope::Scenario => info.scenario_tags(),
        }
    }
}

#[async_trait]
impl MessageProcessor for LifecycleProcessor {
    async fn process(
        &self,
        ctx: &mut RunnerContext,
        payload: RequestPayload,
    ) -> Result<ResponsePayload, SessionError> {
        let info = payload.execution_info().cloned().unwrap_or_default();

        if let ScopeAction::Push(kind) = self.scope_action {
            ctx.sandbox.start_scope(kind)?;
        }

        let registry = ctx.hooks.load();
        let active = self.active_tags(&info);
        let selected = registry.select(self.operation, &active, self.ordering);
        debug!(
            operation = ?self.operation,
            selected = selected.len(),
            generation = registry.generation(),
            "running lifecycle hooks"
        );

        // Every selected hook is attempted; failures accumulate instead of
        // short-circuiting. Only a fatal integrity error aborts the loop.
        let mut status = ExecutionStatusResponse::passed();
        for descriptor in &selected {
            let outcome = ctx.executor.run_hook(descriptor, &info).await?;
            status.record(outcome.duration, outcome.failure);
        }

        if let ScopeAction::Pop(kind) = self.scope_action {
            ctx.sandbox.end_scope(kind)?;
        }

        Ok(ResponsePayload::status(status))
    }
}

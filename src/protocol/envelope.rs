//! Request and response envelopes.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::execution::{ExecutionInfo, ExecutionStatusResponse};

/// Inbound message: a correlation id plus exactly one payload variant
/// (enforced by the enum representation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub id: u64,
    pub payload: RequestPayload,
}

/// All message kinds the runner accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RequestPayload {
    SuiteExecutionStarting {
        #[serde(default)]
        info: ExecutionInfo,
    },
    SuiteExecutionEnding {
        #[serde(default)]
        info: ExecutionInfo,
    },
    SpecExecutionStarting {
        info: ExecutionInfo,
    },
    SpecExecutionEnding {
        info: ExecutionInfo,
    },
    ScenarioExecutionStarting {
        info: ExecutionInfo,
    },
    ScenarioExecutionEnding {
        info: ExecutionInfo,
    },
    StepExecutionStarting {
        info: ExecutionInfo,
    },
    StepExecutionEnding {
        info: ExecutionInfo,
    },
    ExecuteStep {
        info: ExecutionInfo,
        step_text: String,
        #[serde(default)]
        parameters: Vec<Value>,
    },
    ValidateStep {
        step_text: String,
    },
    StepNames,
    Refactor {
        old_text: String,
        new_text: String,
    },
    SuiteDataStoreInit,
    SpecDataStoreInit,
    ScenarioDataStoreInit,
    KillProcess,
}

impl RequestPayload {
    /// Routing key for the dispatcher's handler table.
    pub fn kind(&self) -> MessageKind {
        match self {
            RequestPayload::SuiteExecutionStarting { .. } => MessageKind::SuiteExecutionStarting,
            RequestPayload::SuiteExecutionEnding { .. } => MessageKind::SuiteExecutionEnding,
            RequestPayload::SpecExecutionStarting { .. } => MessageKind::SpecExecutionStarting,
            RequestPayload::SpecExecutionEnding { .. } => MessageKind::SpecExecutionEnding,
            RequestPayload::ScenarioExecutionStarting { .. } => {
                MessageKind::ScenarioExecutionStarting
            }
            RequestPayload::ScenarioExecutionEnding { .. } => MessageKind::ScenarioExecutionEnding,
            RequestPayload::StepExecutionStarting { .. } => MessageKind::StepExecutionStarting,
            RequestPayload::StepExecutionEnding { .. } => MessageKind::StepExecutionEnding,
            RequestPayload::ExecuteStep { .. } => MessageKind::ExecuteStep,
            RequestPayload::ValidateStep { .. } => MessageKind::ValidateStep,
            RequestPayload::StepNames => MessageKind::StepNames,
            RequestPayload::Refactor { .. } => MessageKind::Refactor,
            RequestPayload::SuiteDataStoreInit => MessageKind::SuiteDataStoreInit,
            RequestPayload::SpecDataStoreInit => MessageKind::SpecDataStoreInit,
            RequestPayload::ScenarioDataStoreInit => MessageKind::ScenarioDataStoreInit,
            RequestPayload::KillProcess => MessageKind::KillProcess,
        }
    }

    /// The execution-info snapshot carried by lifecycle and step payloads.
    pub fn execution_info(&self) -> Option<&ExecutionInfo> {
        match self {
            RequestPayload::SuiteExecutionStarting { info }
            | RequestPayload::SuiteExecutionEnding { info }
            | RequestPayload::SpecExecutionStarting { info }
            | RequestPayload::SpecExecutionEnding { info }
            | RequestPayload::ScenarioExecutionStarting { info }
            | RequestPayload::ScenarioExecutionEnding { info }
            | RequestPayload::StepExecutionStarting { info }
            | RequestPayload::StepExecutionEnding { info }
            | RequestPayload::ExecuteStep { info, .. } => Some(info),
            _ => None,
        }
    }
}

/// Fieldless mirror of [`RequestPayload`], used as the handler-table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    SuiteExecutionStarting,
    SuiteExecutionEnding,
    SpecExecutionStarting,
    SpecExecutionEnding,
    ScenarioExecutionStarting,
    ScenarioExecutionEnding,
    StepExecutionStarting,
    StepExecutionEnding,
    ExecuteStep,
    ValidateStep,
    StepNames,
    Refactor,
    SuiteDataStoreInit,
    SpecDataStoreInit,
    ScenarioDataStoreInit,
    KillProcess,
}

impl MessageKind {
    /// Every kind, for composing full handler tables.
    pub const ALL: [MessageKind; 16] = [
        MessageKind::SuiteExecutionStarting,
        MessageKind::SuiteExecutionEnding,
        MessageKind::SpecExecutionStarting,
        MessageKind::SpecExecutionEnding,
        MessageKind::ScenarioExecutionStarting,
        MessageKind::ScenarioExecutionEnding,
        MessageKind::StepExecutionStarting,
        MessageKind::StepExecutionEnding,
        MessageKind::ExecuteStep,
        MessageKind::ValidateStep,
        MessageKind::StepNames,
        MessageKind::Refactor,
        MessageKind::SuiteDataStoreInit,
        MessageKind::SpecDataStoreInit,
        MessageKind::ScenarioDataStoreInit,
        MessageKind::KillProcess,
    ];
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Outbound message, correlated to its request by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub id: u64,
    pub response: ResponsePayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ResponsePayload {
    ExecutionStatus {
        #[serde(flatten)]
        status: ExecutionStatusResponse,
    },
    StepValidation {
        is_valid: bool,
        is_duplicate: bool,
        #[serde(default)]
        message: String,
    },
    StepNames {
        steps: Vec<String>,
    },
    Refactor {
        success: bool,
        #[serde(default)]
        message: String,
        #[serde(default)]
        files_changed: Vec<String>,
    },
    /// Final frame of a terminating session: the orchestrator gets the
    /// reason instead of a bare disconnect. Never produced by processors.
    Error {
        message: String,
    },
}

impl ResponsePayload {
    pub fn status(status: ExecutionStatusResponse) -> Self {
        ResponsePayload::ExecutionStatus { status }
    }
}

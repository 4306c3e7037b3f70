//! Execution status responses and failure records.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One captured hook/step failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureRecord {
    pub message: String,
    #[serde(default)]
    pub stack_trace: String,
    /// True when the run may continue past this failure; false aborts the
    /// run at the orchestrator's side.
    pub recoverable: bool,
}

impl FailureRecord {
    pub fn recoverable(message: impl Into<String>, stack_trace: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack_trace: stack_trace.into(),
            recoverable: true,
        }
    }

    pub fn fatal(message: impl Into<String>, stack_trace: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack_trace: stack_trace.into(),
            recoverable: false,
        }
    }
}

/// Aggregated outcome of one processed request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStatusResponse {
    pub success: bool,
    /// Total elapsed time across all invoked callables, in milliseconds.
    pub execution_time: u64,
    #[serde(default)]
    pub errors: Vec<FailureRecord>,
}

impl ExecutionStatusResponse {
    pub fn passed() -> Self {
        Self {
            success: true,
            execution_time: 0,
            errors: Vec::new(),
        }
    }

    pub fn failed_with(record: FailureRecord) -> Self {
        Self {
            success: false,
            execution_time: 0,
            errors: vec![record],
        }
    }

    /// Fold one callable outcome into the aggregate. All failures are kept,
    /// in invocation order.
    pub fn record(&mut self, duration: Duration, failure: Option<FailureRecord>) {
        self.execution_time += duration.as_millis() as u64;
        if let Some(failure) = failure {
            self.success = false;
            self.errors.push(failure);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_all_failures_in_order() {
        let mut status = ExecutionStatusResponse::passed();
        status.record(Duration::from_millis(5), None);
        status.record(
            Duration::from_millis(7),
            Some(FailureRecord::recoverable("first", "")),
        );
        status.record(
            Duration::from_millis(3),
            Some(FailureRecord::fatal("second", "trace")),
        );

        assert!(!status.success);
        assert_eq!(status.execution_time, 15);
        assert_eq!(status.errors.len(), 2);
        assert_eq!(status.errors[0].message, "first");
        assert!(status.errors[0].recoverable);
        assert_eq!(status.errors[1].message, "second");
        assert!(!status.errors[1].recoverable);
    }

    #[test]
    fn test_wire_shape() {
        let status = ExecutionStatusResponse {
            success: false,
            execution_time: 12,
            errors: vec![FailureRecord::recoverable("boom", "at line 3")],
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["executionTime"], 12);
        assert_eq!(json["errors"][0]["message"], "boom");
        assert_eq!(json["errors"][0]["stackTrace"], "at line 3");
        assert_eq!(json["errors"][0]["recoverable"], true);
    }
}

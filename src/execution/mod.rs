//! Execution context snapshots, status responses, and the method executor.

pub mod executor;
pub mod info;
pub mod status;

pub use executor::{HookRunOutcome, MethodExecutor};
pub use info::{ExecutionInfo, ScenarioInfo, SpecInfo, StepInfo};
pub use status::{ExecutionStatusResponse, FailureRecord};

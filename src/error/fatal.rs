//! Process-fatal startup and integrity errors.

use thiserror::Error;

/// Errors that abort the process before or during service startup.
///
/// These are deliberately not caught at the method executor boundary: a
/// version mismatch or a broken registry means every subsequent answer
/// would be wrong, so the process logs and exits non-zero instead.
#[derive(Debug, Error)]
pub enum FatalRunnerError {
    #[error("incompatible support library: found {found}, runner requires {required}")]
    IncompatibleSupportLibrary { found: String, required: String },
    #[error("project root not configured (set GAUNTLET_PROJECT_ROOT)")]
    MissingProjectRoot,
    #[error("hook registry construction failed: {0}")]
    RegistryConstruction(String),
    #[error("target project failed to build and no ignore-build-failures override is set")]
    BuildFailed,
    #[error("failed to bind runner port: {0}")]
    Bind(#[source] std::io::Error),
}

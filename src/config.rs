//! Environment-provided runner configuration.

use std::env;
use std::path::PathBuf;

use crate::error::FatalRunnerError;

/// Settings the launching orchestrator passes through the environment.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Root directory of the user's test project.
    pub project_root: PathBuf,
    /// Daemon/continuous mode: keep serving and hot-reload registries on
    /// project rebuilds.
    pub daemon: bool,
    /// Start in the degraded authoring surface instead of exiting when the
    /// target project fails to build.
    pub ignore_build_failures: bool,
}

impl RunnerConfig {
    pub fn from_env() -> Result<Self, FatalRunnerError> {
        let project_root = env::var("GAUNTLET_PROJECT_ROOT")
            .map(PathBuf::from)
            .map_err(|_| FatalRunnerError::MissingProjectRoot)?;
        Ok(Self {
            project_root,
            daemon: flag(env::var("GAUNTLET_DAEMON").ok().as_deref()),
            ignore_build_failures: flag(
                env::var("GAUNTLET_IGNORE_BUILD_FAILURES").ok().as_deref(),
            ),
        })
    }
}

/// Lenient boolean parsing: `true`/`1` set, everything else (including
/// absence) clear.
pub fn flag(value: Option<&str>) -> bool {
    matches!(value, Some("true") | Some("1"))
}

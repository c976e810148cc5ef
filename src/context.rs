//! Project context resolution for prp-runner.
//!
//! The project root anchors everything else: task documents named with
//! `--prp` live under it, the agent runs in it, and the config and trace
//! files sit at its top level.

use crate::error::{Result, RunnerError};
use std::env;
use std::path::{Path, PathBuf};

/// Config file name at the project root.
pub const CONFIG_FILE_NAME: &str = "prp-runner.yaml";

/// Diagnostic trace written when a run fails unexpectedly.
pub const TRACE_FILE_NAME: &str = "prp-runner-trace.txt";

/// Resolved paths for one run. All paths are absolute.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    /// Project root; also the agent's working directory.
    pub root: PathBuf,

    /// Config file location (may not exist).
    pub config_path: PathBuf,

    /// Where the diagnostic trace goes.
    pub trace_path: PathBuf,
}

impl ProjectContext {
    /// Resolve the context from an optional root and config override.
    ///
    /// Relative paths are taken against the current working directory.
    pub fn resolve(root: Option<&Path>, config: Option<&Path>) -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            RunnerError::UserError(format!("failed to get current working directory: {}", e))
        })?;

        Ok(Self::resolve_from(&cwd, root, config))
    }

    /// Resolve the context relative to a known working directory.
    pub fn resolve_from(cwd: &Path, root: Option<&Path>, config: Option<&Path>) -> Self {
        let root = match root {
            Some(root) => cwd.join(root),
            None => cwd.to_path_buf(),
        };
        let config_path = match config {
            Some(config) => cwd.join(config),
            None => root.join(CONFIG_FILE_NAME),
        };
        let trace_path = root.join(TRACE_FILE_NAME);

        Self {
            root,
            config_path,
            trace_path,
        }
    }

    /// Path of the task document called `name`.
    pub fn prp_path(&self, prps_dir: &str, name: &str) -> PathBuf {
        self.root.join(prps_dir).join(format!("{}.md", name))
    }
}

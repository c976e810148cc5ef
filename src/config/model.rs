//! Config struct definition, loading and validation.

use crate::agent::{DEFAULT_ALLOWED_TOOLS, Driver, OutputFormat};
use crate::error::{Result, RunnerError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Configuration for prp-runner.
///
/// Command-line flags take precedence over every value here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Documents
    // =========================================================================
    /// Directory, relative to the project root, that `--prp NAME` looks in.
    #[serde(default = "default_prps_dir")]
    pub prps_dir: String,

    // =========================================================================
    // Agent selection
    // =========================================================================
    /// Driver used when `--driver` is not given.
    #[serde(default)]
    pub default_driver: Driver,

    /// Headless output format used when `--output-format` is not given.
    #[serde(default)]
    pub default_output_format: OutputFormat,

    /// Executable name per driver, replacing the canonical `codex`/`claude`.
    #[serde(default)]
    pub executables: BTreeMap<Driver, String>,

    /// Tools the claude driver is allowed to use.
    #[serde(default = "default_allowed_tools")]
    pub allowed_tools: Vec<String>,

    // =========================================================================
    // Output
    // =========================================================================
    /// Maximum characters of an assistant message shown while streaming.
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

fn default_prps_dir() -> String {
    "PRPs".to_string()
}

pub fn default_allowed_tools() -> Vec<String> {
    DEFAULT_ALLOWED_TOOLS.iter().map(|t| t.to_string()).collect()
}

fn default_preview_chars() -> usize {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prps_dir: default_prps_dir(),
            default_driver: Driver::default(),
            default_output_format: OutputFormat::default(),
            executables: BTreeMap::new(),
            allowed_tools: default_allowed_tools(),
            preview_chars: default_preview_chars(),
        }
    }
}

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            RunnerError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load config if the file exists, otherwise fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as null rather than an empty mapping.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(yaml).map_err(|e| {
            RunnerError::UserError(format!("failed to parse config YAML: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate config values.
    ///
    /// Validation rules:
    /// - `prps_dir` must be non-empty
    /// - `allowed_tools` must be non-empty, with non-empty entries free of commas
    /// - `preview_chars` must be positive
    /// - `executables` may only name real drivers, with non-empty names
    pub fn validate(&self) -> Result<()> {
        if self.prps_dir.trim().is_empty() {
            return Err(invalid("prps_dir must be non-empty"));
        }

        if self.allowed_tools.is_empty() {
            return Err(invalid("allowed_tools must list at least one tool"));
        }
        for tool in &self.allowed_tools {
            if tool.trim().is_empty() {
                return Err(invalid("allowed_tools entries must be non-empty"));
            }
            if tool.contains(',') {
                return Err(invalid(&format!(
                    "allowed_tools entries must not contain commas (found '{}'). List each tool separately.",
                    tool
                )));
            }
        }

        if self.preview_chars == 0 {
            return Err(invalid("preview_chars must be greater than 0"));
        }

        for (driver, name) in &self.executables {
            if !driver.is_real() {
                return Err(invalid(&format!(
                    "executables cannot be set for the '{}' driver",
                    driver
                )));
            }
            if name.trim().is_empty() {
                return Err(invalid(&format!(
                    "executables.{} must be non-empty",
                    driver
                )));
            }
        }

        Ok(())
    }
}

fn invalid(reason: &str) -> RunnerError {
    RunnerError::UserError(format!("config validation failed: {}", reason))
}

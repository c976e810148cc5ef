//! Driver and output-mode selectors plus the per-run invocation request.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Which agent CLI argument grammar to emit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Driver {
    /// Codex CLI: prompt flattened into one positional argument.
    #[default]
    #[value(alias = "a")]
    Codex,
    /// Claude CLI: prompt and options passed through flags.
    #[value(alias = "b")]
    Claude,
    /// Local simulation; never launches a process.
    #[value(alias = "no-operation")]
    Noop,
}

impl Driver {
    /// Canonical executable name for this driver, if it launches one.
    pub fn canonical_executable(self) -> Option<&'static str> {
        match self {
            Driver::Codex => Some("codex"),
            Driver::Claude => Some("claude"),
            Driver::Noop => None,
        }
    }

    /// Whether this driver launches an external process.
    pub fn is_real(self) -> bool {
        self != Driver::Noop
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Driver::Codex => "codex",
            Driver::Claude => "claude",
            Driver::Noop => "noop",
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How headless output is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Child output goes straight to the caller's terminal.
    #[default]
    Text,
    /// Child output is captured and parsed as one JSON document.
    Json,
    /// Child output is parsed line by line as it arrives.
    StreamJson,
}

impl OutputFormat {
    /// The value passed to an agent's `--output-format` flag.
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::StreamJson => "stream-json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to run the agent once.
///
/// Built once from parsed arguments and config; never mutated afterwards.
/// Degradations produce a new request rather than editing this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    /// Task document the prompt was built from.
    pub document: PathBuf,
    pub driver: Driver,
    /// Executable override; used verbatim when present.
    pub executable: Option<String>,
    pub interactive: bool,
    /// Ignored when `interactive` is set.
    pub output_format: OutputFormat,
}

impl InvocationRequest {
    /// Same request, but simulated locally.
    pub fn as_noop(&self) -> Self {
        Self {
            driver: Driver::Noop,
            executable: None,
            ..self.clone()
        }
    }

    /// Same driver and executable, run headless with plain text output.
    pub fn as_headless_text(&self) -> Self {
        Self {
            interactive: false,
            output_format: OutputFormat::Text,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> InvocationRequest {
        InvocationRequest {
            document: PathBuf::from("PRPs/feature.md"),
            driver: Driver::Claude,
            executable: Some("/opt/claude".to_string()),
            interactive: true,
            output_format: OutputFormat::StreamJson,
        }
    }

    #[test]
    fn canonical_executables() {
        assert_eq!(Driver::Codex.canonical_executable(), Some("codex"));
        assert_eq!(Driver::Claude.canonical_executable(), Some("claude"));
        assert_eq!(Driver::Noop.canonical_executable(), None);
    }

    #[test]
    fn default_driver_is_codex() {
        assert_eq!(Driver::default(), Driver::Codex);
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }

    #[test]
    fn driver_aliases_parse() {
        assert_eq!(Driver::from_str("a", true).unwrap(), Driver::Codex);
        assert_eq!(Driver::from_str("b", true).unwrap(), Driver::Claude);
        assert_eq!(Driver::from_str("no-operation", true).unwrap(), Driver::Noop);
        assert_eq!(Driver::from_str("noop", true).unwrap(), Driver::Noop);
        assert!(Driver::from_str("gemini", true).is_err());
    }

    #[test]
    fn output_format_names() {
        assert_eq!(OutputFormat::StreamJson.to_string(), "stream-json");
        assert_eq!(
            OutputFormat::from_str("stream-json", false).unwrap(),
            OutputFormat::StreamJson
        );
    }

    #[test]
    fn noop_degradation_drops_the_override() {
        let degraded = request().as_noop();
        assert_eq!(degraded.driver, Driver::Noop);
        assert_eq!(degraded.executable, None);
        assert!(degraded.interactive);
        assert_eq!(degraded.output_format, OutputFormat::StreamJson);
    }

    #[test]
    fn headless_retry_keeps_driver_and_executable() {
        let retry = request().as_headless_text();
        assert_eq!(retry.driver, Driver::Claude);
        assert_eq!(retry.executable.as_deref(), Some("/opt/claude"));
        assert!(!retry.interactive);
        assert_eq!(retry.output_format, OutputFormat::Text);
    }
}

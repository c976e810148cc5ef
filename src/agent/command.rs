//! Command vector construction, one strategy per driver.
//!
//! Each driver owns a builder function. Adding a driver means adding a
//! builder and a match arm in [`build_command`]; existing builders never
//! change for it.

use super::driver::{Driver, OutputFormat};

/// Tool allow-list handed to the claude CLI.
pub const DEFAULT_ALLOWED_TOOLS: &[&str] = &[
    "Edit",
    "Bash",
    "Write",
    "MultiEdit",
    "NotebookEdit",
    "WebFetch",
    "Agent",
    "LS",
    "Grep",
    "Read",
    "NotebookRead",
    "TodoRead",
    "TodoWrite",
    "WebSearch",
];

/// Inputs shared by every driver's builder.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec<'a> {
    pub interactive: bool,
    pub output_format: OutputFormat,
    /// Resolved executable path or name; becomes element 0.
    pub executable: &'a str,
    pub prompt: &'a str,
    /// Comma-joined allow-list for drivers that take one.
    pub allowed_tools: &'a str,
}

/// Build the command vector for a driver.
///
/// Returns `None` for [`Driver::Noop`], which never launches anything.
pub fn build_command(driver: Driver, spec: &CommandSpec<'_>) -> Option<Vec<String>> {
    match driver {
        Driver::Codex => Some(codex_command(spec)),
        Driver::Claude => Some(claude_command(spec)),
        Driver::Noop => None,
    }
}

/// Codex takes the prompt as one positional argument in both modes.
///
/// Multi-line arguments get truncated by some transports, so the prompt is
/// flattened first.
fn codex_command(spec: &CommandSpec<'_>) -> Vec<String> {
    vec![spec.executable.to_string(), flatten_prompt(spec.prompt)]
}

/// Claude reads the prompt from `-p` when headless. Interactive sessions get
/// only the allow-list; the user types into the session itself.
fn claude_command(spec: &CommandSpec<'_>) -> Vec<String> {
    if spec.interactive {
        return vec![
            spec.executable.to_string(),
            "--allowedTools".to_string(),
            spec.allowed_tools.to_string(),
        ];
    }

    vec![
        spec.executable.to_string(),
        "-p".to_string(),
        spec.prompt.to_string(),
        "--allowedTools".to_string(),
        spec.allowed_tools.to_string(),
        "--output-format".to_string(),
        spec.output_format.as_str().to_string(),
    ]
}

/// Trim every line and join them with single spaces.
pub fn flatten_prompt(prompt: &str) -> String {
    prompt
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Join an allow-list into the flag value the claude CLI expects.
pub fn join_allowed_tools<S: AsRef<str>>(tools: &[S]) -> String {
    tools
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<_>>()
        .join(",")
}

//! Launch state machine and output relay.
//!
//! A run moves through [`Stage`]s:
//!
//! ```text
//! Resolving ─┬─> Noop ──────────────> done
//!            ├─> LaunchInteractive ─> done | Noop | Resolving (headless text)
//!            └─> LaunchHeadless ────> done | Noop
//! ```
//!
//! Every edge other than "done" is a named [`Degradation`]. Transition
//! decisions are plain functions so the fallback policy can be tested
//! without launching anything.

use super::command::{CommandSpec, build_command};
use super::document::{parse_document, summarize};
use super::driver::{Driver, InvocationRequest, OutputFormat};
use super::noop;
use super::resolve::{Resolution, Resolver};
use super::stream::relay;
use crate::console::Console;
use crate::error::{Result, RunnerError};
use crate::exit_codes;
use crate::interrupt;
use anyhow::Context;
use std::collections::BTreeMap;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tracing::{debug, info, warn};

/// Where a run currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Find the executable for the request's driver.
    Resolving(InvocationRequest),
    /// Produce canned output without a process.
    Noop(InvocationRequest),
    /// Start the agent attached to the caller's terminal.
    LaunchInteractive {
        request: InvocationRequest,
        command: Vec<String>,
    },
    /// Start the agent and consume its output per the request's format.
    LaunchHeadless {
        request: InvocationRequest,
        command: Vec<String>,
    },
}

/// Named fallback edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degradation {
    /// A real driver's executable could not be resolved.
    ExecutableNotResolved,
    /// The resolved executable vanished before it could be started.
    ExecutableMissingAtLaunch,
    /// The OS refused an interactive launch (argument length limits and
    /// the like).
    InteractiveLaunchFailed,
}

impl Degradation {
    /// The stage this degradation leads to.
    pub fn apply(self, request: &InvocationRequest) -> Stage {
        match self {
            Degradation::ExecutableNotResolved | Degradation::ExecutableMissingAtLaunch => {
                Stage::Noop(request.as_noop())
            }
            Degradation::InteractiveLaunchFailed => Stage::Resolving(request.as_headless_text()),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Degradation::ExecutableNotResolved => {
                "CLI executable not found, falling back to the noop driver"
            }
            Degradation::ExecutableMissingAtLaunch => {
                "CLI executable missing at launch, falling back to the noop driver"
            }
            Degradation::InteractiveLaunchFailed => {
                "interactive launch failed, retrying headless with text output"
            }
        }
    }
}

/// Decide the next stage once resolution has run.
pub fn after_resolution(
    request: InvocationRequest,
    resolution: &Resolution,
    prompt: &str,
    allowed_tools: &str,
) -> Stage {
    let Some(executable) = resolution.executable() else {
        if request.driver.is_real() {
            return Degradation::ExecutableNotResolved.apply(&request);
        }
        return Stage::Noop(request);
    };

    let spec = CommandSpec {
        interactive: request.interactive,
        output_format: request.output_format,
        executable: &executable,
        prompt,
        allowed_tools,
    };

    match build_command(request.driver, &spec) {
        None => Stage::Noop(request),
        Some(command) if request.interactive => Stage::LaunchInteractive { request, command },
        Some(command) => Stage::LaunchHeadless { request, command },
    }
}

/// Which degradation, if any, a spawn error calls for.
///
/// `None` means the error is not one the fallback chain handles.
pub fn classify_launch_error(error: &io::Error, interactive: bool) -> Option<Degradation> {
    if error.kind() == io::ErrorKind::NotFound {
        return Some(Degradation::ExecutableMissingAtLaunch);
    }
    if interactive {
        return Some(Degradation::InteractiveLaunchFailed);
    }
    None
}

/// Settings the launcher needs beyond the request itself.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Working directory for the agent process.
    pub working_dir: PathBuf,
    /// Comma-joined tool allow-list.
    pub allowed_tools: String,
    /// Bound on assistant message previews in streamed output.
    pub preview_chars: usize,
    /// Executable names per driver, used when no override is given.
    pub executables: BTreeMap<Driver, String>,
}

/// Drives one invocation from resolution to a terminal state.
pub struct Launcher {
    resolver: Resolver,
    options: LaunchOptions,
    cancel: Arc<AtomicBool>,
}

impl Launcher {
    pub fn new(resolver: Resolver, options: LaunchOptions, cancel: Arc<AtomicBool>) -> Self {
        Self {
            resolver,
            options,
            cancel,
        }
    }

    /// Executable name for `driver`: configured name, else the canonical one.
    pub fn executable_name(&self, driver: Driver) -> Option<String> {
        self.options
            .executables
            .get(&driver)
            .cloned()
            .or_else(|| driver.canonical_executable().map(str::to_string))
    }

    /// Resolve and build the command without launching it.
    pub fn plan(&self, request: InvocationRequest, prompt: &str) -> Stage {
        self.resolve(request, prompt)
    }

    /// Run the request to completion.
    ///
    /// Returns `Ok` only when the agent (or its simulation) succeeded.
    pub fn run(
        &self,
        request: InvocationRequest,
        prompt: &str,
        console: &mut Console<'_>,
    ) -> Result<()> {
        let mut stage = Stage::Resolving(request);

        loop {
            debug!(?stage, "entering stage");
            stage = match stage {
                Stage::Resolving(request) => self.resolve(request, prompt),
                Stage::Noop(request) => {
                    noop::simulate(
                        request.interactive,
                        request.output_format,
                        prompt,
                        &mut *console.out,
                    )
                    .context("failed to write simulated output")?;
                    return Ok(());
                }
                Stage::LaunchInteractive { request, command } => {
                    console.flush().context("failed to flush output")?;
                    match self.command(&command).spawn() {
                        Ok(child) => return self.wait_attached(child, console),
                        Err(e) => degrade(&request, &command, e)?,
                    }
                }
                Stage::LaunchHeadless { request, command } => {
                    match self.launch_headless(&request, &command, console) {
                        Err(Launch::Spawn(e)) => degrade(&request, &command, e)?,
                        Err(Launch::Run(e)) => return Err(e),
                        Ok(()) => return Ok(()),
                    }
                }
            };
        }
    }

    fn resolve(&self, request: InvocationRequest, prompt: &str) -> Stage {
        let Some(name) = self.executable_name(request.driver) else {
            return Stage::Noop(request);
        };

        let resolution = self.resolver.resolve(&name, request.executable.as_deref());
        if resolution == Resolution::NotFound && request.driver.is_real() {
            warn!(
                executable = %name,
                "{}",
                Degradation::ExecutableNotResolved.describe()
            );
        }
        after_resolution(request, &resolution, prompt, &self.options.allowed_tools)
    }

    fn command(&self, argv: &[String]) -> Command {
        let mut command = Command::new(&argv[0]);
        command.args(&argv[1..]).current_dir(&self.options.working_dir);
        command
    }

    fn launch_headless(
        &self,
        request: &InvocationRequest,
        argv: &[String],
        console: &mut Console<'_>,
    ) -> std::result::Result<(), Launch> {
        match request.output_format {
            OutputFormat::Text => {
                console
                    .flush()
                    .context("failed to flush output")
                    .map_err(Launch::run)?;
                let child = self.command(argv).spawn().map_err(Launch::Spawn)?;
                self.wait_attached(child, console).map_err(Launch::Run)
            }
            OutputFormat::Json => {
                let child = self
                    .command(argv)
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .spawn()
                    .map_err(Launch::Spawn)?;
                consume_document(child, console).map_err(Launch::Run)
            }
            OutputFormat::StreamJson => {
                // Stderr goes to an anonymous file so a chatty agent can
                // never block on a full pipe while stdout is being read.
                let stderr_log = tempfile::tempfile()
                    .context("failed to create stderr capture file")
                    .map_err(Launch::run)?;
                let child_stderr = stderr_log
                    .try_clone()
                    .context("failed to share stderr capture file")
                    .map_err(Launch::run)?;

                let child = self
                    .command(argv)
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::from(child_stderr))
                    .spawn()
                    .map_err(Launch::Spawn)?;
                self.consume_stream(child, stderr_log, console)
                    .map_err(Launch::Run)
            }
        }
    }

    fn wait_attached(&self, mut child: Child, console: &mut Console<'_>) -> Result<()> {
        let status = child.wait().context("failed to wait for agent")?;
        check_status(status, None, console)
    }

    fn consume_stream(
        &self,
        mut child: Child,
        mut stderr_log: std::fs::File,
        console: &mut Console<'_>,
    ) -> Result<()> {
        interrupt::arm(&self.cancel);

        let stdout = child
            .stdout
            .take()
            .context("agent stdout was not captured")?;

        let outcome = match relay(
            BufReader::new(stdout),
            &self.cancel,
            self.options.preview_chars,
            console,
        ) {
            Ok(outcome) => outcome,
            Err(e) => {
                terminate(&mut child);
                return Err(e);
            }
        };

        if outcome.interrupted {
            terminate(&mut child);
            let _ = writeln!(console.err, "\nInterrupted by user");
            return Err(RunnerError::Interrupted);
        }

        info!(
            events = outcome.events,
            malformed = outcome.malformed,
            "stream finished"
        );

        let status = child.wait().context("failed to wait for agent")?;
        if status.success() {
            return Ok(());
        }

        let mut captured = String::new();
        stderr_log
            .seek(SeekFrom::Start(0))
            .and_then(|_| stderr_log.read_to_string(&mut captured))
            .context("failed to read captured stderr")?;
        check_status(status, Some(captured.as_str()), console)
    }
}

/// Failure of a headless launch, split by whether the process ever started.
enum Launch {
    Spawn(io::Error),
    Run(RunnerError),
}

impl Launch {
    fn run(error: anyhow::Error) -> Self {
        Launch::Run(error.into())
    }
}

/// Follow the fallback edge for a spawn error, or give up on it.
fn degrade(request: &InvocationRequest, argv: &[String], error: io::Error) -> Result<Stage> {
    match classify_launch_error(&error, request.interactive) {
        Some(degradation) => {
            warn!(
                executable = %argv[0],
                error = %error,
                "{}",
                degradation.describe()
            );
            Ok(degradation.apply(request))
        }
        None => Err(anyhow::Error::new(error)
            .context(format!("failed to launch '{}'", argv[0]))
            .into()),
    }
}

fn consume_document(child: Child, console: &mut Console<'_>) -> Result<()> {
    let output = child
        .wait_with_output()
        .context("failed to collect agent output")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return check_status(output.status, Some(&*stderr), console);
    }

    let doc = parse_document(&String::from_utf8_lossy(&output.stdout));
    let pretty = serde_json::to_string_pretty(&doc).context("failed to render JSON output")?;
    writeln!(console.out, "{}", pretty).context("failed to write JSON output")?;

    if let Some(summary) = summarize(&doc) {
        writeln!(console.err, "{}", summary).context("failed to write summary")?;
    }
    Ok(())
}

/// Turn a non-zero exit into `ChildFailed` after printing a diagnostic.
fn check_status(
    status: ExitStatus,
    stderr: Option<&str>,
    console: &mut Console<'_>,
) -> Result<()> {
    if status.success() {
        return Ok(());
    }

    let code = exit_codes::from_child(status.code());
    let _ = writeln!(console.err, "Runner failed with exit code {}", code);
    if let Some(stderr) = stderr {
        let _ = writeln!(console.err, "Error: {}", stderr);
    }
    Err(RunnerError::ChildFailed { code })
}

fn terminate(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(test)]
mod tests;

//! CLI argument parsing for prp-runner.
//!
//! Uses clap derive macros for declarative argument definitions. The run
//! itself lives in the `commands` module.

use crate::agent::{Driver, OutputFormat};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Run an AI coding agent against a Product Requirement Prompt (PRP).
///
/// The prompt is a fixed workflow preamble followed by the PRP document.
/// Without the selected agent CLI installed, the run falls back to the
/// local `noop` driver instead of failing.
#[derive(Parser, Debug)]
#[command(name = "prp-runner")]
#[command(author, version, about, long_about = None)]
#[command(group(
    clap::ArgGroup::new("document")
        .required(true)
        .args(["prp_path", "prp"])
))]
pub struct Cli {
    /// Path to a PRP markdown file, e.g. PRPs/feature.md.
    #[arg(long, value_name = "PATH")]
    pub prp_path: Option<PathBuf>,

    /// PRP name without the .md extension; resolves to PRPs/{NAME}.md.
    #[arg(long, value_name = "NAME")]
    pub prp: Option<String>,

    /// Launch an interactive chat session instead of a headless run.
    #[arg(long)]
    pub interactive: bool,

    /// Agent CLI to drive [default: codex, or the config's default_driver].
    #[arg(long, value_enum)]
    pub driver: Option<Driver>,

    /// Executable to launch instead of the driver's default.
    #[arg(long, value_name = "NAME")]
    pub cli: Option<String>,

    /// Output format for headless runs [default: text].
    #[arg(long, value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Project root: agent working directory and base for --prp.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Config file [default: <root>/prp-runner.yaml].
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the command that would run, without launching it.
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

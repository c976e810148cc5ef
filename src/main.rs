//! prp-runner: run an AI coding agent CLI against a Product Requirement Prompt.
//!
//! This is the main entry point. It parses arguments, runs the agent, and
//! turns the outcome into an exit code. Unexpected failures, panics
//! included, are caught here once and written to a trace file.

mod agent;
mod cli;
mod commands;
mod config;
mod console;
mod context;
mod diagnostics;
mod error;
mod exit_codes;
mod interrupt;
mod logging;
mod prompt;

use anyhow::anyhow;
use cli::Cli;
use console::Console;
use context::ProjectContext;
use error::RunnerError;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    logging::init(cli.verbose);

    let ctx = match ProjectContext::resolve(cli.root.as_deref(), cli.config.as_deref()) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::from(exit_codes::to_process(err.exit_code()));
        }
    };

    let mut stdout = io::stdout();
    let mut stderr = io::stderr();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut console = Console::new(&mut stdout, &mut stderr);
        commands::run(&cli, &ctx, &mut console)
    }))
    .unwrap_or_else(|payload| Err(RunnerError::Unexpected(panic_error(payload))));

    let args: Vec<String> = std::env::args().collect();
    let code = commands::finish(result, &ctx, &args, &mut stderr);
    ExitCode::from(exit_codes::to_process(code))
}

fn panic_error(payload: Box<dyn std::any::Any + Send>) -> anyhow::Error {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    anyhow!("panic: {}", message)
}

//! The `prp-runner` run: request assembly, dispatch, and final reporting.

use crate::agent::{
    InvocationRequest, LaunchOptions, Launcher, Resolver, Stage, join_allowed_tools,
};
use crate::cli::Cli;
use crate::config::Config;
use crate::console::Console;
use crate::context::ProjectContext;
use crate::diagnostics::write_trace;
use crate::error::{Result, RunnerError};
use crate::exit_codes;
use crate::prompt::build_prompt;
use anyhow::Context;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tracing::{info, warn};

/// Execute one run described by `cli`.
///
/// 1. Loads the optional config
/// 2. Resolves the PRP document and builds the prompt
/// 3. Hands the invocation to the launcher (or prints its plan for --dry-run)
pub fn run(cli: &Cli, ctx: &ProjectContext, console: &mut Console<'_>) -> Result<()> {
    let config = Config::load_or_default(&ctx.config_path)?;

    let document = resolve_document(cli, ctx, &config)?;
    let prompt = build_prompt(&document)?;

    let request = InvocationRequest {
        document,
        driver: cli.driver.unwrap_or(config.default_driver),
        executable: cli.cli.clone(),
        interactive: cli.interactive,
        output_format: cli.output_format.unwrap_or(config.default_output_format),
    };

    if request.interactive && cli.output_format.is_some() {
        warn!("--output-format has no effect on interactive runs");
    }

    info!(
        document = %request.document.display(),
        driver = %request.driver,
        interactive = request.interactive,
        output_format = %request.output_format,
        "running PRP"
    );

    let options = LaunchOptions {
        working_dir: ctx.root.clone(),
        allowed_tools: join_allowed_tools(&config.allowed_tools),
        preview_chars: config.preview_chars,
        executables: config.executables.clone(),
    };
    let launcher = Launcher::new(
        Resolver::from_env(&ctx.root),
        options,
        Arc::new(AtomicBool::new(false)),
    );

    if cli.dry_run {
        let stage = launcher.plan(request, &prompt);
        return print_plan(&stage, ctx, console);
    }

    launcher.run(request, &prompt, console)
}

/// Pick the PRP document from `--prp-path` or `--prp`.
fn resolve_document(cli: &Cli, ctx: &ProjectContext, config: &Config) -> Result<PathBuf> {
    if let Some(path) = &cli.prp_path {
        return Ok(path.clone());
    }
    if let Some(name) = &cli.prp {
        return Ok(ctx.prp_path(&config.prps_dir, name));
    }
    Err(RunnerError::UserError(
        "must supply --prp or --prp-path".to_string(),
    ))
}

fn print_plan(stage: &Stage, ctx: &ProjectContext, console: &mut Console<'_>) -> Result<()> {
    let (request, command) = match stage {
        Stage::LaunchInteractive { request, command }
        | Stage::LaunchHeadless { request, command } => (request, command),
        Stage::Noop(request) | Stage::Resolving(request) => {
            writeln!(
                console.out,
                "Driver:      {} (no process would be launched)",
                request.driver
            )
            .context("failed to write plan")?;
            return Ok(());
        }
    };

    let mode = if request.interactive {
        "interactive".to_string()
    } else {
        format!("headless, {}", request.output_format)
    };

    writeln!(console.out, "Driver:      {}", request.driver).context("failed to write plan")?;
    writeln!(console.out, "Mode:        {}", mode).context("failed to write plan")?;
    writeln!(console.out, "Executable:  {}", command[0]).context("failed to write plan")?;
    writeln!(console.out, "Working dir: {}", ctx.root.display())
        .context("failed to write plan")?;
    writeln!(console.out, "Command:     {}", shell_words::join(command))
        .context("failed to write plan")?;
    Ok(())
}

/// Report the outcome of a run and return the process exit code.
///
/// Unexpected errors get a trace file at `ctx.trace_path`; every other
/// error is a clean exit whose message (if any) goes to `err`.
pub fn finish(
    result: Result<()>,
    ctx: &ProjectContext,
    args: &[String],
    err: &mut dyn Write,
) -> i32 {
    let error = match result {
        Ok(()) => return exit_codes::SUCCESS,
        Err(error) => error,
    };

    if error.wants_trace() {
        if let Err(e) = write_trace(&ctx.trace_path, &error, args) {
            warn!(error = %e, "failed to write trace file");
        }
        let _ = writeln!(
            err,
            "An unexpected error occurred. See '{}' for details.",
            ctx.trace_path.display()
        );
    } else if matches!(error, RunnerError::UserError(_) | RunnerError::NotFound(_)) {
        let _ = writeln!(err, "Error: {}", error);
    }
    // ChildFailed and Interrupted already told the user what happened.

    error.exit_code()
}

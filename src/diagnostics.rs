//! Diagnostic trace file for unexpected failures.
//!
//! Only errors that want a trace (see [`RunnerError::wants_trace`]) end up
//! here. Clean exits never touch the file.

use crate::error::RunnerError;
use chrono::Utc;
use std::fmt::Write as _;
use std::path::Path;

/// Render the trace text for `error`.
///
/// The error's full cause chain is included, plus a backtrace when
/// `RUST_BACKTRACE` enabled one.
pub fn render_trace(error: &RunnerError, args: &[String]) -> String {
    let host = hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string());

    let mut trace = String::new();
    let _ = writeln!(trace, "prp-runner {}", env!("CARGO_PKG_VERSION"));
    let _ = writeln!(trace, "time: {}", Utc::now().to_rfc3339());
    let _ = writeln!(trace, "host: {}", host);
    let _ = writeln!(trace, "args: {}", shell_words::join(args));
    let _ = writeln!(trace);

    match error {
        RunnerError::Unexpected(inner) => {
            let _ = writeln!(trace, "{:?}", inner);
        }
        other => {
            let _ = writeln!(trace, "{}", other);
        }
    }
    trace
}

/// Write the trace for `error` to `path`.
pub fn write_trace(path: &Path, error: &RunnerError, args: &[String]) -> std::io::Result<()> {
    std::fs::write(path, render_trace(error, args))
}

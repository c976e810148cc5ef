//! Canned output for the no-operation driver.
//!
//! Each output mode gets a response shaped like what a real agent would
//! emit for it, so downstream tooling can be exercised without an agent
//! installed.

use super::driver::OutputFormat;
use serde_json::{Value, json};
use std::io::{self, Write};

/// Success marker every simulated run reports.
pub const MARKER: &str = "PRP TEST OK";

/// Session id reported by simulated runs.
pub const SESSION_ID: &str = "noop-session";

/// The single result document printed in `json` mode.
pub fn result_document() -> Value {
    json!({
        "type": "result",
        "subtype": "success",
        "result": MARKER,
        "is_error": false,
        "cost_usd": 0.0,
        "duration_ms": 1,
        "session_id": SESSION_ID,
    })
}

/// The event sequence printed in `stream-json` mode.
pub fn stream_events() -> Vec<Value> {
    vec![
        json!({"type": "system", "subtype": "init", "session_id": SESSION_ID}),
        json!({"type": "assistant", "message": {"content": "Reading PRP..."}}),
        json!({"type": "assistant", "message": {"content": MARKER}}),
        json!({
            "type": "result",
            "subtype": "success",
            "result": MARKER,
            "cost_usd": 0.0,
            "duration_ms": 1,
            "num_turns": 1,
        }),
    ]
}

/// Write the simulated response for the given mode to `out`.
pub fn simulate(
    interactive: bool,
    format: OutputFormat,
    prompt: &str,
    out: &mut dyn Write,
) -> io::Result<()> {
    if interactive {
        writeln!(out, "[noop] Interactive session start.\n")?;
        writeln!(out, "{}", prompt)?;
        writeln!(out, "\n[noop] {}", MARKER)?;
        return out.flush();
    }

    match format {
        OutputFormat::Text => writeln!(out, "{}", MARKER)?,
        OutputFormat::Json => writeln!(out, "{}", result_document())?,
        OutputFormat::StreamJson => {
            for event in stream_events() {
                writeln!(out, "{}", event)?;
            }
        }
    }
    out.flush()
}

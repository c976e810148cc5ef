//! Line-delimited JSON event streaming.
//!
//! [`EventStream`] is a blocking iterator over a child's stdout that yields
//! one parsed item per non-empty line. [`relay`] drives it, echoing every
//! event line as received and writing short progress lines for the shapes it
//! recognizes.

use crate::console::Console;
use crate::error::Result;
use anyhow::Context;
use serde_json::{Map, Value};
use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// One non-empty line of streamed output.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamItem {
    /// A JSON object, with the trimmed line it was parsed from.
    Event {
        event: Map<String, Value>,
        line: String,
    },
    /// Anything else: invalid JSON, or valid JSON that is not an object.
    Malformed { line: String, error: String },
}

/// Blocking iterator over the lines of a reader.
pub struct EventStream<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> EventStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for EventStream<R> {
    type Item = io::Result<StreamItem>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Some(Err(e)),
            }

            let line = String::from_utf8_lossy(&self.buf);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            return Some(Ok(parse_line(line)));
        }
    }
}

/// Parse a single trimmed line.
pub fn parse_line(line: &str) -> StreamItem {
    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(event)) => StreamItem::Event {
            event,
            line: line.to_string(),
        },
        Ok(other) => StreamItem::Malformed {
            line: line.to_string(),
            error: format!("expected a JSON object, found {}", json_kind(&other)),
        },
        Err(e) => StreamItem::Malformed {
            line: line.to_string(),
            error: e.to_string(),
        },
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Counters reported after a relay finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayOutcome {
    /// Events parsed and echoed.
    pub events: usize,
    /// Lines skipped with a warning.
    pub malformed: usize,
    /// Whether the cancel flag stopped the relay.
    pub interrupted: bool,
}

/// Consume `reader` until it ends or `cancel` is raised.
///
/// The flag is checked before each item and once after the stream ends.
/// Every event line is echoed unchanged to `console.out`; recognized events
/// also get a progress line on `console.err`.
pub fn relay<R: BufRead>(
    reader: R,
    cancel: &AtomicBool,
    preview_chars: usize,
    console: &mut Console<'_>,
) -> Result<RelayOutcome> {
    let mut outcome = RelayOutcome::default();

    for item in EventStream::new(reader) {
        if cancel.load(Ordering::SeqCst) {
            outcome.interrupted = true;
            return Ok(outcome);
        }

        match item.context("failed to read agent output")? {
            StreamItem::Event { event, line } => {
                if let Some(progress) = describe_event(&event, preview_chars) {
                    writeln!(console.err, "{}", progress)
                        .context("failed to write progress")?;
                }
                writeln!(console.out, "{}", line)
                    .context("failed to echo event")?;
                console.out.flush().context("failed to echo event")?;
                outcome.events += 1;
            }
            StreamItem::Malformed { line, error } => {
                warn!(%error, line = %line, "failed to parse JSON line");
                outcome.malformed += 1;
            }
        }
    }

    if cancel.load(Ordering::SeqCst) {
        outcome.interrupted = true;
    }
    Ok(outcome)
}

/// Human-readable progress text for the event shapes worth narrating.
pub fn describe_event(event: &Map<String, Value>, preview_chars: usize) -> Option<String> {
    let kind = event.get("type").and_then(Value::as_str)?;
    let subtype = event.get("subtype").and_then(Value::as_str);

    match (kind, subtype) {
        ("system", Some("init")) => {
            let session = event
                .get("session_id")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            Some(format!("Session started: {}", session))
        }
        ("assistant", _) => {
            let preview: String = message_text(event).chars().take(preview_chars).collect();
            Some(format!("Assistant: {}...", preview))
        }
        ("result", _) => {
            let mut text = format!(
                "\nFinal result:\n  Success: {}\n  Cost: ${:.4}\n  Duration: {}ms\n  Turns: {}",
                subtype == Some("success"),
                cost_usd(event),
                number_field(event, "duration_ms"),
                number_field(event, "num_turns")
            );
            if let Some(result) = text_field(event, "result").filter(|r| !r.is_empty()) {
                text.push_str(&format!("\n\nResult text:\n{}", result));
            }
            Some(text)
        }
        _ => None,
    }
}

/// `cost_usd` as a float; anything but a number counts as zero.
pub(crate) fn cost_usd(event: &Map<String, Value>) -> f64 {
    event.get("cost_usd").and_then(Value::as_f64).unwrap_or(0.0)
}

/// A numeric field as written by the agent, or `0` when absent or not a number.
pub(crate) fn number_field(event: &Map<String, Value>, key: &str) -> String {
    match event.get(key) {
        Some(Value::Number(n)) => n.to_string(),
        _ => "0".to_string(),
    }
}

/// A string field, with other non-null values rendered as JSON.
pub(crate) fn text_field(event: &Map<String, Value>, key: &str) -> Option<String> {
    match event.get(key)? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Text of an assistant message.
///
/// Content is either a plain string or a list of blocks; only text blocks
/// contribute.
fn message_text(event: &Map<String, Value>) -> String {
    match event.get("message").and_then(|m| m.get("content")) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(blocks)) => blocks
            .iter()
            .filter_map(|block| block.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(" "),
        None | Some(Value::Null) => String::new(),
        Some(other) => other.to_string(),
    }
}

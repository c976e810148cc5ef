//! Whole-document JSON output handling.

use super::stream::{cost_usd, number_field, text_field};
use serde_json::{Value, json};
use tracing::warn;

/// `error` value of the object that stands in for unparseable output.
pub const PARSE_FAILURE: &str = "parse failure";

/// Parse captured output as one JSON document.
///
/// Output that does not parse becomes `{"error": "parse failure", "raw": ...}`
/// so callers always have a document to pass on.
pub fn parse_document(output: &str) -> Value {
    match serde_json::from_str(output) {
        Ok(doc) => doc,
        Err(e) => {
            warn!(error = %e, "failed to parse JSON output");
            json!({ "error": PARSE_FAILURE, "raw": output })
        }
    }
}

/// Summary block for a `result` document; `None` for anything else.
///
/// Fields are read one at a time so a single odd value only blanks itself.
pub fn summarize(doc: &Value) -> Option<String> {
    let doc = doc.as_object()?;
    if doc.get("type").and_then(Value::as_str) != Some("result") {
        return None;
    }

    let is_error = doc.get("is_error").and_then(Value::as_bool).unwrap_or(false);
    Some(format!(
        "\nSummary:\n  Success: {}\n  Cost: ${:.4}\n  Duration: {}ms\n  Session: {}",
        !is_error,
        cost_usd(doc),
        number_field(doc, "duration_ms"),
        text_field(doc, "session_id").unwrap_or_else(|| "unknown".to_string())
    ))
}

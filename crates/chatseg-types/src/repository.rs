//! Message repository: raw JSON records to a sorted message list.
//!
//! Validation is forgiving. A record that fails any check is skipped and
//! the load continues; only an unreadable source or a document that is not
//! a JSON array aborts the load.

use std::collections::HashSet;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::error::TypesError;
use crate::message::ChatMessage;

/// Load messages from a JSON file on disk.
pub fn load_messages(path: impl AsRef<Path>) -> Result<Vec<ChatMessage>, TypesError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    debug!(path = ?path, bytes = bytes.len(), "Loading messages");
    parse_messages(&bytes)
}

/// Parse a JSON array of message records.
///
/// The result is sorted ascending by timestamp with a stable sort, so
/// records sharing a timestamp keep their original relative order.
pub fn parse_messages(bytes: &[u8]) -> Result<Vec<ChatMessage>, TypesError> {
    let document: Value = serde_json::from_slice(bytes)?;
    let records = match document {
        Value::Array(records) => records,
        other => {
            return Err(TypesError::InvalidInput(format!(
                "expected a JSON array of messages, got {}",
                json_kind(&other)
            )))
        }
    };

    let total = records.len();
    let mut seen_ids = HashSet::with_capacity(total);
    let mut messages = Vec::with_capacity(total);

    for (index, record) in records.iter().enumerate() {
        let Some(message) = record.as_object().and_then(parse_record) else {
            trace!(index, "Skipping malformed record");
            continue;
        };
        if !seen_ids.insert(message.id) {
            trace!(index, id = message.id, "Skipping record with duplicate id");
            continue;
        }
        messages.push(message);
    }

    messages.sort_by_key(|m| m.timestamp);

    let skipped = total - messages.len();
    if skipped > 0 {
        warn!(skipped, total, "Skipped invalid message records");
    }
    debug!(loaded = messages.len(), "Messages loaded");

    Ok(messages)
}

/// Validate one record, returning `None` on any violation.
fn parse_record(record: &Map<String, Value>) -> Option<ChatMessage> {
    let id = record.get("id").and_then(coerce_int)?;

    let user = record.get("user")?.as_str()?;
    if user.is_empty() {
        return None;
    }

    let text = record.get("text")?.as_str()?.trim();
    if text.is_empty() {
        return None;
    }

    let timestamp = record.get("timestamp").and_then(coerce_int)?;

    // An unusable reply pointer is treated as absent, not as a bad record.
    let reply_to_id = record.get("reply_to_id").and_then(coerce_int);

    Some(ChatMessage {
        id,
        user: user.to_string(),
        text: text.to_string(),
        timestamp,
        reply_to_id,
    })
}

/// Coerce a JSON value to an integer.
///
/// Accepts integers, finite floats (truncated toward zero) and strings
/// holding a decimal integer. Everything else, including null, is
/// rejected.
///
/// Booleans are rejected too, so a record with `"timestamp": true` is
/// skipped rather than loaded at `1`. This is a deliberate departure from
/// loaders that coerce `true`/`false` to `1`/`0`.
pub fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            let f = n.as_f64()?;
            if f.is_finite() && f.abs() < i64::MAX as f64 {
                Some(f.trunc() as i64)
            } else {
                None
            }
        }
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
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

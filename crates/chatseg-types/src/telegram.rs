//! Telegram desktop export normalization.
//!
//! Converts a `result.json` export (`{"messages": [...]}`) into canonical
//! [`ChatMessage`] records. Authors are replaced by stable pseudonyms
//! (`user1`, `user2`, ...) assigned in first-seen order.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::TypesError;
use crate::message::ChatMessage;
use crate::repository::coerce_int;

/// Normalize a Telegram export read from disk.
pub fn normalize_export_file(path: impl AsRef<Path>) -> Result<Vec<ChatMessage>, TypesError> {
    let bytes = std::fs::read(path.as_ref())?;
    normalize_export(&bytes)
}

/// Normalize raw Telegram export bytes.
///
/// Only entries with `type == "message"` that carry an author, a usable
/// `date_unixtime`, an `id` and non-empty text are kept. Output order
/// follows the export.
pub fn normalize_export(bytes: &[u8]) -> Result<Vec<ChatMessage>, TypesError> {
    let document: Value = serde_json::from_slice(bytes)?;
    let entries = document
        .get("messages")
        .and_then(Value::as_array)
        .ok_or_else(|| TypesError::InvalidInput("export has no \"messages\" array".to_string()))?;

    let mut pseudonyms: HashMap<String, String> = HashMap::new();
    let mut out = Vec::with_capacity(entries.len());

    for entry in entries {
        if entry.get("type").and_then(Value::as_str) != Some("message") {
            continue;
        }

        let Some(author) = entry.get("from").and_then(Value::as_str).filter(|s| !s.is_empty())
        else {
            continue;
        };
        let Some(timestamp) = entry.get("date_unixtime").and_then(coerce_int) else {
            continue;
        };
        let Some(id) = entry.get("id").and_then(coerce_int) else {
            continue;
        };

        let text = extract_text(entry);
        if text.is_empty() {
            continue;
        }

        let next = pseudonyms.len() + 1;
        let user = pseudonyms
            .entry(author.to_string())
            .or_insert_with(|| format!("user{next}"))
            .clone();

        let mut message = ChatMessage::new(id, user, text, timestamp);
        message.reply_to_id = entry.get("reply_to_message_id").and_then(coerce_int);
        out.push(message);
    }

    info!(
        messages = out.len(),
        authors = pseudonyms.len(),
        "Normalized Telegram export"
    );
    Ok(out)
}

/// Extract message text, preferring `text_entities` over `text`.
///
/// Both fields may be a plain string or a list mixing strings and
/// `{"type": ..., "text": ...}` objects.
fn extract_text(entry: &Value) -> String {
    if let Some(entities) = entry.get("text_entities").and_then(Value::as_array) {
        if !entities.is_empty() {
            return join_parts(entities);
        }
    }

    match entry.get("text") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Array(parts)) => join_parts(parts),
        _ => {
            debug!("Message without usable text");
            String::new()
        }
    }
}

fn join_parts(parts: &[Value]) -> String {
    let mut joined = String::new();
    for part in parts {
        let piece = match part {
            Value::String(s) => s.as_str(),
            Value::Object(obj) => obj.get("text").and_then(Value::as_str).unwrap_or(""),
            _ => "",
        };
        joined.push_str(piece);
    }
    joined.trim().to_string()
}

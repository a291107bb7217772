//! Canonical chat message record.
//!
//! Messages are created once at load time and never mutated afterwards.
//! Every segmentation strategy consumes a timestamp-sorted slice of them.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A single chat message.
///
/// The serialized form is the canonical input record:
/// `{ "id": int, "user": string, "text": string, "timestamp": int, "reply_to_id": int|null }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique identifier within a corpus
    pub id: i64,

    /// Opaque participant identifier (non-empty)
    pub user: String,

    /// Message content, trimmed and non-empty
    pub text: String,

    /// Unix seconds
    pub timestamp: i64,

    /// Identifier of the message this one replies to
    #[serde(default)]
    pub reply_to_id: Option<i64>,
}

impl ChatMessage {
    /// Create a message that does not reply to anything.
    pub fn new(id: i64, user: impl Into<String>, text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id,
            user: user.into(),
            text: text.into(),
            timestamp,
            reply_to_id: None,
        }
    }

    /// Mark this message as a reply to `parent_id`.
    pub fn with_reply_to(mut self, parent_id: i64) -> Self {
        self.reply_to_id = Some(parent_id);
        self
    }

    /// Render as `"user: text"`, the form fed to the vectorizer.
    pub fn render(&self) -> String {
        format!("{}: {}", self.user, self.text)
    }

    /// Timestamp as a UTC datetime, if representable.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.timestamp, 0).single()
    }

    /// Non-negative gap in seconds from `earlier` to this message.
    ///
    /// Saturates at `i64::MAX` when the timestamps are too far apart to
    /// subtract.
    pub fn gap_since(&self, earlier: &ChatMessage) -> i64 {
        self.timestamp.saturating_sub(earlier.timestamp).max(0)
    }
}

/// An ordered run of messages treated as one exchange.
///
/// The last message is the response, everything before it is context.
pub type Topic = Vec<ChatMessage>;

/// Collect the ids of a topic in order.
pub fn topic_ids(topic: &[ChatMessage]) -> Vec<i64> {
    topic.iter().map(|m| m.id).collect()
}

//! Segmentation contract shared by every strategy.

use std::path::Path;

use chatseg_types::{load_messages, ChatMessage, Topic};
use tracing::debug;

use crate::error::SegmentError;

/// Number of messages per emitted topic window.
///
/// Always at least 1; construction is the only place this is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicSize(usize);

impl TopicSize {
    /// Validate a raw topic size.
    pub fn new(size: usize) -> Result<Self, SegmentError> {
        if size < 1 {
            return Err(SegmentError::InvalidConfig(format!(
                "topic_size must be >= 1, got {size}"
            )));
        }
        Ok(Self(size))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

/// A topic segmentation strategy.
///
/// Strategies are configured with a fixed window size and turn a
/// timestamp-sorted message list into windows of exactly that size.
pub trait TopicSegmentor {
    /// Configured window size.
    fn topic_size(&self) -> usize;

    /// Segment an already-loaded, timestamp-sorted message list.
    fn segment_messages(&self, messages: &[ChatMessage]) -> Result<Vec<Topic>, SegmentError>;

    /// Load messages from a JSON source and segment them.
    ///
    /// An empty corpus yields no topics.
    fn get_topics(&self, path: &Path) -> Result<Vec<Topic>, SegmentError> {
        let messages = load_messages(path)?;
        if messages.is_empty() {
            debug!(path = ?path, "No messages to segment");
            return Ok(Vec::new());
        }
        self.segment_messages(&messages)
    }
}

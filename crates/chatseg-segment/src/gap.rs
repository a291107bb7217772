//! Time-gap segmentation.
//!
//! Consecutive messages share a window while the gap to the previous
//! message stays within `max_gap_seconds` and the window is not yet full.
//! Windows that close at any other size than `topic_size` are dropped.

use chatseg_types::{ChatMessage, GapConfig, Topic};
use tracing::{debug, info, trace};

use crate::error::SegmentError;
use crate::segmentor::{TopicSegmentor, TopicSize};

/// Builder that grows one window at a time from a message stream.
///
/// Detects window boundaries based on:
/// - Time gaps above `max_gap_seconds`
/// - The window reaching `topic_size`
pub struct WindowBuilder {
    max_gap_seconds: i64,
    topic_size: usize,

    /// Messages in the window being built
    current: Vec<ChatMessage>,
}

impl WindowBuilder {
    /// Create a new builder.
    pub fn new(max_gap_seconds: i64, topic_size: TopicSize) -> Self {
        Self {
            max_gap_seconds,
            topic_size: topic_size.get(),
            current: Vec::with_capacity(topic_size.get()),
        }
    }

    /// Add a message to the builder.
    ///
    /// Returns `Some(window)` when a boundary closed a full window.
    pub fn add_message(&mut self, message: ChatMessage) -> Option<Topic> {
        let Some(last) = self.current.last() else {
            self.current.push(message);
            return None;
        };

        let gap = message.gap_since(last);
        let time_ok = gap <= self.max_gap_seconds;
        let size_ok = self.current.len() < self.topic_size;

        if time_ok && size_ok {
            self.current.push(message);
            return None;
        }

        trace!(
            gap,
            window_len = self.current.len(),
            "Window boundary detected"
        );
        let closed = self.close_window();
        self.current.push(message);
        closed
    }

    /// Close the current window, keeping it only at exactly `topic_size`.
    fn close_window(&mut self) -> Option<Topic> {
        let window = std::mem::take(&mut self.current);
        if window.len() == self.topic_size {
            Some(window)
        } else {
            if !window.is_empty() {
                debug!(
                    len = window.len(),
                    topic_size = self.topic_size,
                    "Dropped window of wrong size"
                );
            }
            None
        }
    }

    /// Flush the final window.
    ///
    /// Call this when the stream is exhausted.
    pub fn flush(&mut self) -> Option<Topic> {
        self.close_window()
    }
}

/// Gap-based segmentor.
#[derive(Debug, Clone)]
pub struct GapSegmentor {
    topic_size: TopicSize,
    config: GapConfig,
}

impl GapSegmentor {
    /// Create a segmentor, validating the configuration.
    pub fn new(topic_size: usize, config: GapConfig) -> Result<Self, SegmentError> {
        let topic_size = TopicSize::new(topic_size)?;
        config.validate().map_err(SegmentError::InvalidConfig)?;
        Ok(Self { topic_size, config })
    }
}

impl TopicSegmentor for GapSegmentor {
    fn topic_size(&self) -> usize {
        self.topic_size.get()
    }

    fn segment_messages(&self, messages: &[ChatMessage]) -> Result<Vec<Topic>, SegmentError> {
        let mut builder = WindowBuilder::new(self.config.max_gap_seconds, self.topic_size);
        let mut topics = Vec::new();

        for message in messages {
            if let Some(window) = builder.add_message(message.clone()) {
                topics.push(window);
            }
        }

        if let Some(window) = builder.flush() {
            topics.push(window);
        }

        info!(
            messages = messages.len(),
            topics = topics.len(),
            max_gap_seconds = self.config.max_gap_seconds,
            "Gap segmentation complete"
        );
        Ok(topics)
    }
}

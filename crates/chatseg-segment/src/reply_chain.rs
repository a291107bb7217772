//! Reply-chain segmentation.
//!
//! Every reply is treated as a candidate response. Following `reply_to_id`
//! pointers backward reconstructs its causal thread; the most recent
//! `topic_size` messages of a long enough thread form a candidate window.

use std::collections::{HashMap, HashSet};

use chatseg_types::{ChatMessage, ReplyChainConfig, Topic};
use tracing::{debug, info, trace};

use crate::error::SegmentError;
use crate::segmentor::{TopicSegmentor, TopicSize};
use crate::selection::{response_timestamp, select_non_overlapping};

/// Reply-chain segmentor.
#[derive(Debug, Clone)]
pub struct ReplyChainSegmentor {
    topic_size: TopicSize,
    config: ReplyChainConfig,
}

impl ReplyChainSegmentor {
    /// Create a segmentor, validating the topic size.
    pub fn new(topic_size: usize, config: ReplyChainConfig) -> Result<Self, SegmentError> {
        let topic_size = TopicSize::new(topic_size)?;
        Ok(Self { topic_size, config })
    }

    /// Walk parents of `response`, returning the thread oldest first.
    ///
    /// Stops at a message without a parent pointer, at a pointer to an
    /// unknown id, or after `max_chain_hops` lookups.
    fn collect_chain<'a>(
        &self,
        response: &'a ChatMessage,
        by_id: &HashMap<i64, &'a ChatMessage>,
    ) -> Vec<&'a ChatMessage> {
        let mut chain = vec![response];
        let mut current = response;

        for _ in 0..self.config.max_chain_hops {
            let Some(parent_id) = current.reply_to_id else {
                break;
            };
            let Some(&parent) = by_id.get(&parent_id) else {
                break;
            };
            chain.push(parent);
            current = parent;
        }

        chain.reverse();
        chain
    }

    /// Build the candidate window ending at `response`, if any.
    fn build_candidate(
        &self,
        response: &ChatMessage,
        by_id: &HashMap<i64, &ChatMessage>,
    ) -> Option<Topic> {
        if response.reply_to_id.is_none() {
            return None;
        }

        let topic_size = self.topic_size.get();
        let chain = self.collect_chain(response, by_id);
        if chain.len() < topic_size {
            return None;
        }

        let window = &chain[chain.len() - topic_size..];

        if window.windows(2).any(|w| w[0].timestamp > w[1].timestamp) {
            trace!(response_id = response.id, "Rejected chain with decreasing timestamps");
            return None;
        }

        let mut ids = HashSet::with_capacity(topic_size);
        if !window.iter().all(|m| ids.insert(m.id)) {
            trace!(response_id = response.id, "Rejected chain with repeated message");
            return None;
        }

        Some(window.iter().map(|&m| m.clone()).collect())
    }
}

impl TopicSegmentor for ReplyChainSegmentor {
    fn topic_size(&self) -> usize {
        self.topic_size.get()
    }

    fn segment_messages(&self, messages: &[ChatMessage]) -> Result<Vec<Topic>, SegmentError> {
        let by_id: HashMap<i64, &ChatMessage> = messages.iter().map(|m| (m.id, m)).collect();

        let mut candidates: Vec<Topic> = messages
            .iter()
            .filter_map(|response| self.build_candidate(response, &by_id))
            .collect();
        debug!(candidates = candidates.len(), "Built reply-chain candidates");

        let topics = if self.config.non_overlapping {
            select_non_overlapping(candidates)
        } else {
            // Earliest responses first, identical windows collapsed
            candidates.sort_by_key(|w| response_timestamp(w));
            let mut seen: HashSet<Vec<i64>> = HashSet::new();
            candidates
                .into_iter()
                .filter(|w| seen.insert(w.iter().map(|m| m.id).collect()))
                .collect()
        };

        info!(
            messages = messages.len(),
            topics = topics.len(),
            non_overlapping = self.config.non_overlapping,
            "Reply-chain segmentation complete"
        );
        Ok(topics)
    }
}

//! Greedy non-overlapping window selection.
//!
//! Candidates are visited in ascending order of their response (last
//! message) timestamp. A candidate is accepted only if none of its message
//! ids already belongs to an accepted window, so earlier-resolved exchanges
//! win conflicts.

use std::collections::HashSet;

use chatseg_types::{ChatMessage, Topic};
use tracing::trace;

/// Response timestamp of a window, `i64::MIN` for an empty one.
pub fn response_timestamp(window: &[ChatMessage]) -> i64 {
    window.last().map(|m| m.timestamp).unwrap_or(i64::MIN)
}

/// Incremental greedy selector.
///
/// Feed candidates in the desired order with [`GreedySelector::offer`].
#[derive(Debug, Default)]
pub struct GreedySelector {
    used_ids: HashSet<i64>,
    picked: Vec<Topic>,
}

impl GreedySelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept the window unless it shares a message id with an accepted one.
    ///
    /// Returns whether the window was accepted.
    pub fn offer(&mut self, window: Topic) -> bool {
        if window.iter().any(|m| self.used_ids.contains(&m.id)) {
            trace!(
                response_id = ?window.last().map(|m| m.id),
                "Rejected overlapping window"
            );
            return false;
        }
        self.used_ids.extend(window.iter().map(|m| m.id));
        self.picked.push(window);
        true
    }

    #[cfg(test)]
    fn accepted(&self) -> usize {
        self.picked.len()
    }

    /// Accepted windows in acceptance order.
    pub fn into_topics(self) -> Vec<Topic> {
        self.picked
    }
}

/// Sort candidates by response timestamp and greedily keep disjoint ones.
///
/// The sort is stable, so candidates with equal response timestamps keep
/// their generation order.
pub fn select_non_overlapping(mut candidates: Vec<Topic>) -> Vec<Topic> {
    candidates.sort_by_key(|w| response_timestamp(w));

    let mut selector = GreedySelector::new();
    for window in candidates {
        selector.offer(window);
    }
    selector.into_topics()
}

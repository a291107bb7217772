//! Hybrid segmentation: coarse session split plus learned window scoring.
//!
//! The stream is first partitioned into sessions at large silences. Inside
//! each session every contiguous window of `topic_size` messages is scored
//! by a [`WindowScorer`]; windows at or above the threshold are then
//! selected greedily without sharing any message.

use std::sync::Arc;

use chatseg_model::{WindowScorer, WindowTopicModel};
use chatseg_types::{ChatMessage, HybridConfig, Topic};
use tracing::{debug, info, trace};

use crate::error::SegmentError;
use crate::segmentor::{TopicSegmentor, TopicSize};
use crate::selection::{response_timestamp, GreedySelector};

/// Partition messages into sessions.
///
/// A new session starts whenever the gap to the previous message exceeds
/// `max_gap_seconds`. Every message lands in exactly one session.
pub fn split_sessions(messages: &[ChatMessage], max_gap_seconds: i64) -> Vec<&[ChatMessage]> {
    let mut sessions = Vec::new();
    let mut start = 0;

    for i in 1..messages.len() {
        if messages[i].gap_since(&messages[i - 1]) > max_gap_seconds {
            sessions.push(&messages[start..i]);
            start = i;
        }
    }
    if start < messages.len() {
        sessions.push(&messages[start..]);
    }
    sessions
}

/// A candidate window with its cohesion score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredWindow {
    /// Index of the first message in the full sorted message list
    pub start: usize,
    pub score: f64,
    pub window: Topic,
}

/// Hybrid segmentor.
pub struct HybridSegmentor {
    topic_size: TopicSize,
    config: HybridConfig,
    scorer: Arc<dyn WindowScorer>,
}

impl std::fmt::Debug for HybridSegmentor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridSegmentor")
            .field("topic_size", &self.topic_size)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HybridSegmentor {
    /// Create a segmentor, loading the model artifacts named in `config`.
    pub fn new(topic_size: usize, config: HybridConfig) -> Result<Self, SegmentError> {
        let size = TopicSize::new(topic_size)?;
        config.validate().map_err(SegmentError::InvalidConfig)?;

        let model = WindowTopicModel::load(
            &config.vectorizer_path,
            &config.classifier_path,
            size.get(),
        )?;
        Ok(Self {
            topic_size: size,
            config,
            scorer: Arc::new(model),
        })
    }

    /// Create a segmentor around an already-built scorer.
    ///
    /// The artifact paths in `config` are ignored.
    pub fn with_scorer(
        topic_size: usize,
        config: HybridConfig,
        scorer: Arc<dyn WindowScorer>,
    ) -> Result<Self, SegmentError> {
        let size = TopicSize::new(topic_size)?;
        config.validate().map_err(SegmentError::InvalidConfig)?;

        if scorer.topic_size() != size.get() {
            return Err(SegmentError::InvalidConfig(format!(
                "scorer expects windows of {}, segmentor uses {}",
                scorer.topic_size(),
                size.get()
            )));
        }
        Ok(Self {
            topic_size: size,
            config,
            scorer,
        })
    }

    /// Generate and score every stride-1 window inside every session.
    ///
    /// Windows never cross a session boundary. Output is in generation
    /// order: session by session, left to right.
    pub fn score_windows(
        &self,
        messages: &[ChatMessage],
    ) -> Result<Vec<ScoredWindow>, SegmentError> {
        let topic_size = self.topic_size.get();
        let sessions = split_sessions(messages, self.config.max_gap_seconds);
        debug!(sessions = sessions.len(), "Split messages into sessions");

        let mut scored = Vec::new();
        let mut offset = 0;

        for session in sessions {
            let windows: Vec<&[ChatMessage]> = session.windows(topic_size).collect();
            let scores = self.scorer.score_windows(&windows)?;

            for (i, (window, score)) in windows.into_iter().zip(scores).enumerate() {
                scored.push(ScoredWindow {
                    start: offset + i,
                    score,
                    window: window.to_vec(),
                });
            }
            offset += session.len();
        }

        debug!(windows = scored.len(), "Scored candidate windows");
        Ok(scored)
    }
}

impl TopicSegmentor for HybridSegmentor {
    fn topic_size(&self) -> usize {
        self.topic_size.get()
    }

    fn segment_messages(&self, messages: &[ChatMessage]) -> Result<Vec<Topic>, SegmentError> {
        let mut scored = self.score_windows(messages)?;
        scored.sort_by_key(|w| response_timestamp(&w.window));

        let candidates = scored.len();
        let mut selector = GreedySelector::new();
        for candidate in scored {
            if candidate.score < self.config.threshold {
                trace!(
                    start = candidate.start,
                    score = candidate.score,
                    "Window below threshold"
                );
                continue;
            }
            selector.offer(candidate.window);
        }

        let topics = selector.into_topics();
        info!(
            messages = messages.len(),
            candidates,
            topics = topics.len(),
            threshold = self.config.threshold,
            "Hybrid segmentation complete"
        );
        Ok(topics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatseg_model::ModelError;
    use chatseg_types::topic_ids;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    /// Fraction of messages starting with the response's first word.
    struct KeywordScorer {
        topic_size: usize,
    }

    impl WindowScorer for KeywordScorer {
        fn topic_size(&self) -> usize {
            self.topic_size
        }

        fn score(&self, window: &[ChatMessage]) -> Result<f64, ModelError> {
            if window.len() != self.topic_size {
                return Err(ModelError::WindowSize {
                    expected: self.topic_size,
                    actual: window.len(),
                });
            }
            let Some(last) = window.last() else {
                return Ok(0.0);
            };
            let word = last.text.split_whitespace().next().unwrap_or_default();
            let hits = window.iter().filter(|m| m.text.starts_with(word)).count();
            Ok(hits as f64 / window.len() as f64)
        }
    }

    /// Scores by a deterministic function of the response id.
    struct IdScorer {
        topic_size: usize,
    }

    impl WindowScorer for IdScorer {
        fn topic_size(&self) -> usize {
            self.topic_size
        }

        fn score(&self, window: &[ChatMessage]) -> Result<f64, ModelError> {
            let id = window.last().map(|m| m.id).unwrap_or_default();
            Ok(((id * 37) % 100) as f64 / 100.0)
        }
    }

    fn msg(id: i64, ts: i64, text: &str) -> ChatMessage {
        ChatMessage::new(id, format!("u{}", id % 2), text, ts)
    }

    fn config(max_gap_seconds: i64, threshold: f64) -> HybridConfig {
        HybridConfig {
            max_gap_seconds,
            threshold,
            ..HybridConfig::default()
        }
    }

    fn segmentor(topic_size: usize, max_gap: i64, threshold: f64) -> HybridSegmentor {
        HybridSegmentor::with_scorer(
            topic_size,
            config(max_gap, threshold),
            Arc::new(KeywordScorer { topic_size }),
        )
        .unwrap()
    }

    #[test]
    fn test_split_sessions_partitions_stream() {
        let messages = vec![
            msg(1, 0, "a"),
            msg(2, 10, "a"),
            msg(3, 1000, "a"),
            msg(4, 1005, "a"),
            msg(5, 1006, "a"),
        ];
        let sessions = split_sessions(&messages, 100);
        let lens: Vec<usize> = sessions.iter().map(|s| s.len()).collect();
        assert_eq!(lens, vec![2, 3]);
        assert_eq!(lens.iter().sum::<usize>(), messages.len());
    }

    #[test]
    fn test_split_sessions_gap_equal_to_threshold_stays() {
        let messages = vec![msg(1, 0, "a"), msg(2, 100, "a")];
        assert_eq!(split_sessions(&messages, 100).len(), 1);
    }

    #[test]
    fn test_split_sessions_extreme_timestamps() {
        let messages = vec![msg(1, i64::MIN, "a"), msg(2, i64::MAX, "a")];
        let sessions = split_sessions(&messages, 900);
        assert_eq!(sessions.len(), 2);
        assert!(segmentor(2, 900, 0.0)
            .segment_messages(&messages)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_split_sessions_empty() {
        assert!(split_sessions(&[], 100).is_empty());
    }

    #[test]
    fn test_windows_do_not_cross_sessions() {
        let messages = vec![
            msg(1, 0, "deploy"),
            msg(2, 10, "deploy"),
            msg(3, 5000, "deploy"),
            msg(4, 5010, "deploy"),
        ];
        let seg = segmentor(2, 900, 0.0);
        let scored = seg.score_windows(&messages).unwrap();
        let starts: Vec<usize> = scored.iter().map(|w| w.start).collect();
        // (2, 3) would straddle the silence
        assert_eq!(starts, vec![0, 2]);
    }

    #[test]
    fn test_global_start_offsets() {
        let messages = vec![
            msg(1, 0, "x"),
            msg(2, 5000, "x"),
            msg(3, 5001, "x"),
            msg(4, 5002, "x"),
        ];
        let scored = segmentor(2, 900, 0.0).score_windows(&messages).unwrap();
        let starts: Vec<usize> = scored.iter().map(|w| w.start).collect();
        assert_eq!(starts, vec![1, 2]);
        assert_eq!(topic_ids(&scored[0].window), vec![2, 3]);
    }

    #[test]
    fn test_threshold_filters_windows() {
        let messages = vec![
            msg(1, 0, "deploy failed"),
            msg(2, 10, "deploy again"),
            msg(3, 20, "lunch anyone"),
            msg(4, 30, "lunch at noon"),
        ];
        let topics = segmentor(2, 900, 0.9).segment_messages(&messages).unwrap();
        let windows: Vec<Vec<i64>> = topics.iter().map(|t| topic_ids(t)).collect();
        assert_eq!(windows, vec![vec![1, 2], vec![3, 4]]);
    }

    #[test]
    fn test_selected_windows_are_disjoint() {
        let messages: Vec<ChatMessage> = (1..=6).map(|i| msg(i, i * 10, "same")).collect();
        let topics = segmentor(3, 900, 0.5).segment_messages(&messages).unwrap();
        let windows: Vec<Vec<i64>> = topics.iter().map(|t| topic_ids(t)).collect();
        assert_eq!(windows, vec![vec![1, 2, 3], vec![4, 5, 6]]);
    }

    #[test]
    fn test_short_session_yields_no_windows() {
        let messages = vec![msg(1, 0, "a"), msg(2, 5000, "a")];
        let topics = segmentor(2, 900, 0.0).segment_messages(&messages).unwrap();
        assert!(topics.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(segmentor(2, 900, 0.5).segment_messages(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_scorer_size_mismatch_rejected() {
        let result = HybridSegmentor::with_scorer(
            4,
            config(900, 0.5),
            Arc::new(KeywordScorer { topic_size: 3 }),
        );
        assert!(matches!(result, Err(SegmentError::InvalidConfig(_))));
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let result = HybridSegmentor::with_scorer(
            2,
            config(900, 1.5),
            Arc::new(KeywordScorer { topic_size: 2 }),
        );
        assert!(matches!(result, Err(SegmentError::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_artifacts_fail_construction() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = HybridConfig {
            vectorizer_path: dir.path().join("nope.json").display().to_string(),
            classifier_path: dir.path().join("nope2.json").display().to_string(),
            ..HybridConfig::default()
        };
        let result = HybridSegmentor::new(4, cfg);
        assert!(matches!(result, Err(SegmentError::Model(_))));
    }

    #[test]
    fn test_random_streams_respect_threshold_and_disjointness() {
        let mut rng = StdRng::seed_from_u64(23);
        for _ in 0..30 {
            let mut ts = 0i64;
            let messages: Vec<ChatMessage> = (1..=rng.random_range(0..70))
                .map(|id| {
                    ts += rng.random_range(0..600);
                    msg(id, ts, "t")
                })
                .collect();
            let topic_size = rng.random_range(2..5);
            let threshold = rng.random_range(0.0..1.0);
            let seg = HybridSegmentor::with_scorer(
                topic_size,
                config(900, threshold),
                Arc::new(IdScorer { topic_size }),
            )
            .unwrap();

            let topics = seg.segment_messages(&messages).unwrap();
            let mut seen = HashSet::new();
            for topic in &topics {
                assert_eq!(topic.len(), topic_size);
                assert!(seg.scorer.score(topic).unwrap() >= threshold);
                for m in topic {
                    assert!(seen.insert(m.id));
                }
            }
            assert_eq!(topics, seg.segment_messages(&messages).unwrap());
        }
    }
}

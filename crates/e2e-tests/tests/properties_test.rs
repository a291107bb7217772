//! Property checks over randomly generated conversations.
//!
//! Each test draws conversations from a seeded RNG so failures reproduce.

use std::collections::HashSet;

use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use chatseg_model::{WindowScorer, WindowTopicModel};
use chatseg_segment::{GapSegmentor, HybridSegmentor, ReplyChainSegmentor, TopicSegmentor};
use chatseg_types::{parse_messages, GapConfig, ReplyChainConfig, Topic};
use e2e_tests::{random_conversation, TestHarness};

const ROUNDS: usize = 25;

fn assert_disjoint(topics: &[Topic]) {
    let mut seen = HashSet::new();
    for topic in topics {
        for message in topic {
            assert!(seen.insert(message.id), "message {} in two topics", message.id);
        }
    }
}

fn assert_no_duplicates_within(topics: &[Topic]) {
    for topic in topics {
        let ids: HashSet<i64> = topic.iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), topic.len());
    }
}

/// Gap windows have exactly topic_size messages and no inner gap above
/// the limit.
#[test]
fn test_gap_windows_respect_size_and_gap() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..ROUNDS {
        let count = rng.random_range(0..120);
        let messages = random_conversation(&mut rng, count);
        let topic_size = rng.random_range(1..6);
        let max_gap = rng.random_range(0..900);

        let segmentor = GapSegmentor::new(
            topic_size,
            GapConfig {
                max_gap_seconds: max_gap,
            },
        )
        .unwrap();
        let topics = segmentor.segment_messages(&messages).unwrap();

        for topic in &topics {
            assert_eq!(topic.len(), topic_size);
            for pair in topic.windows(2) {
                assert!(pair[1].timestamp - pair[0].timestamp <= max_gap);
            }
        }
        assert_no_duplicates_within(&topics);
    }
}

/// Non-overlapping reply-chain output never repeats a message id, and
/// every window is a parent-linked thread.
#[test]
fn test_reply_chain_windows_are_disjoint_threads() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..ROUNDS {
        let count = rng.random_range(0..150);
        let messages = random_conversation(&mut rng, count);
        let topic_size = rng.random_range(1..5);

        let segmentor = ReplyChainSegmentor::new(topic_size, ReplyChainConfig::default()).unwrap();
        let topics = segmentor.segment_messages(&messages).unwrap();

        assert_disjoint(&topics);
        for topic in &topics {
            assert_eq!(topic.len(), topic_size);
            for pair in topic.windows(2) {
                assert_eq!(pair[1].reply_to_id, Some(pair[0].id));
                assert!(pair[0].timestamp <= pair[1].timestamp);
            }
        }
    }
}

/// Hybrid windows have the right size, meet the threshold and never
/// share a message.
#[test]
fn test_hybrid_windows_meet_threshold_and_are_disjoint() {
    let harness = TestHarness::new();
    let mut rng = StdRng::seed_from_u64(2024);

    for _ in 0..ROUNDS {
        let count = rng.random_range(0..100);
        let messages = random_conversation(&mut rng, count);
        let topic_size = rng.random_range(2..5);
        let threshold = rng.random_range(0.0..1.0);

        let config = harness.write_model(threshold);
        let model = WindowTopicModel::load(
            &config.vectorizer_path,
            &config.classifier_path,
            topic_size,
        )
        .unwrap();
        let segmentor = HybridSegmentor::new(topic_size, config).unwrap();

        let topics = segmentor.segment_messages(&messages).unwrap();
        assert_disjoint(&topics);
        for topic in &topics {
            assert_eq!(topic.len(), topic_size);
            assert!(model.score(topic).unwrap() >= threshold);
        }
    }
}

/// Segmenting a serialized and reloaded conversation gives the same
/// topics as segmenting it in memory, and repeated runs agree.
#[test]
fn test_reload_and_rerun_are_stable() {
    let harness = TestHarness::new();
    let mut rng = StdRng::seed_from_u64(99);
    let messages = random_conversation(&mut rng, 80);
    let input = harness.write_messages("random.json", &messages);

    let reloaded = parse_messages(&std::fs::read(&input).unwrap()).unwrap();
    assert_eq!(reloaded, messages);

    let gap = GapSegmentor::new(3, GapConfig::default()).unwrap();
    let reply = ReplyChainSegmentor::new(3, ReplyChainConfig::default()).unwrap();
    let hybrid = HybridSegmentor::new(3, harness.write_model(0.4)).unwrap();
    let segmentors: [&dyn TopicSegmentor; 3] = [&gap, &reply, &hybrid];

    for segmentor in segmentors {
        let from_file = segmentor.get_topics(&input).unwrap();
        let in_memory = segmentor.segment_messages(&messages).unwrap();
        assert_eq!(from_file, in_memory);
        assert_eq!(from_file, segmentor.get_topics(&input).unwrap());
    }
}

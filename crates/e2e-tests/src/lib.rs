//! End-to-end test infrastructure for chatseg.
//!
//! Provides a shared TestHarness and fixture builders for tests covering
//! the full load -> segment -> score -> export pipeline.

use std::path::{Path, PathBuf};

use rand::Rng;

use chatseg_model::{TfIdfVectorizer, VectorizerOptions, WindowClassifier};
use chatseg_types::{ChatMessage, HybridConfig};

/// Shared test harness for E2E tests.
///
/// Owns a temp directory where message files, model artifacts and CSV
/// output are written.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Root of the temp directory
    pub root: PathBuf,
}

impl TestHarness {
    /// Create a new test harness with an empty temp directory.
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// Path of a file inside the harness directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Write messages as a JSON array and return the file path.
    pub fn write_messages(&self, name: &str, messages: &[ChatMessage]) -> PathBuf {
        let bytes = serde_json::to_vec_pretty(messages).expect("Failed to serialize messages");
        self.write_raw(name, &bytes)
    }

    /// Write raw bytes and return the file path.
    pub fn write_raw(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, bytes).expect("Failed to write fixture");
        path
    }

    /// Write the fixture model artifacts and return a hybrid config
    /// pointing at them.
    pub fn write_model(&self, threshold: f64) -> HybridConfig {
        let vectorizer_path = self.path("tfidf_feat.json");
        let classifier_path = self.path("window_classifier.json");

        fixture_vectorizer()
            .save(&vectorizer_path)
            .expect("Failed to save vectorizer");
        fixture_classifier()
            .save(&classifier_path)
            .expect("Failed to save classifier");

        HybridConfig {
            threshold,
            vectorizer_path: display(&vectorizer_path),
            classifier_path: display(&classifier_path),
            ..HybridConfig::default()
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

const DEPLOY: [&str; 4] = [
    "the deploy pipeline failed on staging",
    "which deploy pipeline step failed?",
    "the staging deploy pipeline migration step",
    "rerun the deploy pipeline migration on staging",
];

const LUNCH: [&str; 4] = [
    "anyone up for lunch pizza today",
    "pizza lunch sounds great",
    "lunch pizza place at noon?",
    "noon pizza lunch works for me",
];

const HIKING: [&str; 4] = [
    "weekend hiking trip to the mountains",
    "which mountains trail for hiking",
    "the mountains hiking trail near the lake?",
    "lake trail hiking on the weekend",
];

/// Vectorizer fitted on the fixture conversation vocabulary.
pub fn fixture_vectorizer() -> TfIdfVectorizer {
    let corpus: Vec<&str> = DEPLOY.iter().chain(&LUNCH).chain(&HIKING).copied().collect();
    TfIdfVectorizer::fit(&corpus, VectorizerOptions::default())
}

/// Logistic classifier driven mostly by context/response similarity,
/// mildly penalizing long gaps.
pub fn fixture_classifier() -> WindowClassifier {
    WindowClassifier::Logistic {
        coef: vec![8.0, -0.2, 0.0, 0.0, 0.0, 0.0],
        intercept: -2.5,
    }
}

/// Twelve messages: three four-message topics.
///
/// Deploy (ids 1-4) and lunch (ids 5-8) run back to back ten seconds
/// apart; hiking (ids 9-12) follows after a silence of several hours.
pub fn three_topic_conversation() -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(12);
    let mut id = 1;

    for (block, base_ts) in [(&DEPLOY, 0), (&LUNCH, 40), (&HIKING, 10_000)] {
        for (i, text) in block.iter().enumerate() {
            let user = format!("user{}", (i % 2) + 1);
            messages.push(ChatMessage::new(id, user, *text, base_ts + i as i64 * 10));
            id += 1;
        }
    }
    messages
}

/// A single linear reply thread of `len` messages, ten seconds apart.
pub fn reply_thread(len: i64) -> Vec<ChatMessage> {
    (1..=len)
        .map(|id| {
            let m = ChatMessage::new(id, format!("user{}", id % 3), format!("reply {id}"), id * 10);
            if id > 1 {
                m.with_reply_to(id - 1)
            } else {
                m
            }
        })
        .collect()
}

/// Random timestamp-sorted messages with random reply links to earlier ids.
///
/// Texts are drawn from the fixture vocabulary so the model produces a
/// spread of scores.
pub fn random_conversation<R: Rng>(rng: &mut R, count: i64) -> Vec<ChatMessage> {
    let pool: Vec<&str> = DEPLOY.iter().chain(&LUNCH).chain(&HIKING).copied().collect();
    let mut ts = 0i64;

    (1..=count)
        .map(|id| {
            ts += rng.random_range(0..1_200);
            let text = pool[rng.random_range(0..pool.len())];
            let user = format!("user{}", rng.random_range(1..4));
            let m = ChatMessage::new(id, user, text, ts);
            if id > 1 && rng.random_bool(0.6) {
                m.with_reply_to(rng.random_range(1..id))
            } else {
                m
            }
        })
        .collect()
}

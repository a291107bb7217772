//! Window topic model: P(window is a single topic).
//!
//! Wraps a loaded vectorizer + classifier pair. Inference only; the
//! artifacts are read once and never mutated.

use std::path::Path;

use chatseg_types::ChatMessage;
use tracing::{debug, info};

use crate::classifier::WindowClassifier;
use crate::error::ModelError;
use crate::features::{WindowFeatures, FEATURE_COUNT};
use crate::tfidf::TfIdfVectorizer;

/// Trait for window scorers.
///
/// Implementations must be thread-safe (Send + Sync) so one loaded model
/// can be shared across segmentation runs.
pub trait WindowScorer: Send + Sync {
    /// Window length this scorer accepts.
    fn topic_size(&self) -> usize;

    /// Probability in [0, 1] that the window is topically coherent.
    fn score(&self, window: &[ChatMessage]) -> Result<f64, ModelError>;

    /// Score many windows. Default implementation calls score() for each.
    fn score_windows(&self, windows: &[&[ChatMessage]]) -> Result<Vec<f64>, ModelError> {
        windows.iter().map(|w| self.score(w)).collect()
    }
}

/// Learned window cohesion model.
#[derive(Debug, Clone)]
pub struct WindowTopicModel {
    vectorizer: TfIdfVectorizer,
    classifier: WindowClassifier,
    topic_size: usize,
}

impl WindowTopicModel {
    /// Build a model from already-loaded artifacts.
    ///
    /// A window needs at least one context message and a response, so
    /// `topic_size` must be at least 2.
    pub fn new(
        vectorizer: TfIdfVectorizer,
        classifier: WindowClassifier,
        topic_size: usize,
    ) -> Result<Self, ModelError> {
        if topic_size < 2 {
            return Err(ModelError::InvalidConfig(format!(
                "window model needs topic_size >= 2, got {topic_size}"
            )));
        }
        classifier
            .validate(FEATURE_COUNT)
            .map_err(ModelError::InvalidConfig)?;
        Ok(Self {
            vectorizer,
            classifier,
            topic_size,
        })
    }

    /// Load the vectorizer and classifier artifacts from disk.
    pub fn load(
        vectorizer_path: impl AsRef<Path>,
        classifier_path: impl AsRef<Path>,
        topic_size: usize,
    ) -> Result<Self, ModelError> {
        let vectorizer = TfIdfVectorizer::load(vectorizer_path)?;
        let classifier = WindowClassifier::load(classifier_path, FEATURE_COUNT)?;
        info!(
            terms = vectorizer.term_count(),
            classifier = classifier.kind(),
            topic_size,
            "Window topic model loaded"
        );
        Self::new(vectorizer, classifier, topic_size)
    }

    /// Extract the feature vector of a window.
    ///
    /// Fails when the window length differs from the configured topic size.
    pub fn featurize(&self, window: &[ChatMessage]) -> Result<WindowFeatures, ModelError> {
        let size_error = || ModelError::WindowSize {
            expected: self.topic_size,
            actual: window.len(),
        };
        if window.len() != self.topic_size {
            return Err(size_error());
        }
        WindowFeatures::extract(window, &self.vectorizer).ok_or_else(size_error)
    }

    /// Positive-class probability for a single window.
    pub fn predict_proba_single_topic(&self, window: &[ChatMessage]) -> Result<f64, ModelError> {
        let features = self.featurize(window)?;
        let proba = self.classifier.predict_proba(&features.to_array());
        debug!(
            response_id = ?window.last().map(|m| m.id),
            proba, "Scored window"
        );
        Ok(proba)
    }

    #[cfg(test)]
    fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }
}

impl WindowScorer for WindowTopicModel {
    fn topic_size(&self) -> usize {
        self.topic_size
    }

    fn score(&self, window: &[ChatMessage]) -> Result<f64, ModelError> {
        self.predict_proba_single_topic(window)
    }
}

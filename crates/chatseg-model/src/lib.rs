//! # chatseg-model
//!
//! Learned cohesion scoring for fixed-size chat windows.
//!
//! A window of `topic_size` messages is turned into a small feature vector
//! (context/response TF-IDF similarity, timing gaps, participant pattern)
//! and fed to a pre-trained binary classifier.
//!
//! ## Features
//! - TF-IDF vectorizer artifact with sparse cosine similarity
//! - Logistic regression and gradient-boosted tree classifiers
//! - `WindowScorer` trait so segmentors can swap the scoring backend
//!
//! Both artifacts are JSON files produced offline; this crate never trains.

pub mod classifier;
pub mod error;
pub mod features;
pub mod similarity;
pub mod tfidf;
pub mod window_model;

pub use classifier::{RegressionTree, WindowClassifier};
pub use error::ModelError;
pub use features::{WindowFeatures, FEATURE_COUNT, FEATURE_NAMES};
pub use similarity::{cosine_similarity, SparseVector};
pub use tfidf::{Norm, TfIdfVectorizer, VectorizerOptions};
pub use window_model::{WindowScorer, WindowTopicModel};

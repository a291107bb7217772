//! TF-IDF (Term Frequency - Inverse Document Frequency) vectorizer.
//!
//! A fitted vectorizer is a read-only artifact: a vocabulary mapping terms
//! to columns plus one IDF weight per column. It is persisted as JSON and
//! loaded once per run.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ModelError;
use crate::similarity::{cosine_similarity, normalize, SparseVector};

/// Output normalization applied after TF-IDF weighting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Norm {
    /// Scale each vector to unit length
    #[default]
    L2,
    /// Leave raw TF-IDF weights
    #[serde(rename = "none")]
    Unnormalized,
}

/// Tokenization and weighting options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerOptions {
    /// Lowercase text before tokenizing
    #[serde(default = "default_true")]
    pub lowercase: bool,

    /// Use 1 + ln(tf) instead of raw counts
    #[serde(default)]
    pub sublinear_tf: bool,

    #[serde(default)]
    pub norm: Norm,

    /// Inclusive (min, max) n-gram lengths
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),

    /// Tokens dropped before n-gram construction
    #[serde(default)]
    pub stop_words: BTreeSet<String>,
}

fn default_true() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

impl Default for VectorizerOptions {
    fn default() -> Self {
        Self {
            lowercase: default_true(),
            sublinear_tf: false,
            norm: Norm::default(),
            ngram_range: default_ngram_range(),
            stop_words: BTreeSet::new(),
        }
    }
}

/// Fitted TF-IDF vectorizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    /// Term -> column index
    vocabulary: BTreeMap<String, usize>,
    /// Column -> inverse document frequency
    idf: Vec<f32>,
    #[serde(flatten)]
    options: VectorizerOptions,
}

impl TfIdfVectorizer {
    /// Fit a vectorizer on a corpus of documents.
    ///
    /// Columns are assigned in lexicographic term order. IDF is smoothed:
    /// `ln((N + 1) / (df + 1)) + 1`.
    pub fn fit(documents: &[&str], options: VectorizerOptions) -> Self {
        let mut doc_frequencies: HashMap<String, usize> = HashMap::new();
        let doc_count = documents.len();

        for doc in documents {
            let terms = extract_terms(doc, &options);
            let unique_terms: HashSet<String> = terms.into_iter().collect();

            // Each term counted once per doc
            for term in unique_terms {
                *doc_frequencies.entry(term).or_insert(0) += 1;
            }
        }

        let mut terms: Vec<(String, usize)> = doc_frequencies.into_iter().collect();
        terms.sort_by(|a, b| a.0.cmp(&b.0));

        let n = doc_count as f32;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(terms.len());
        for (column, (term, df)) in terms.into_iter().enumerate() {
            idf.push(((n + 1.0) / (df as f32 + 1.0)).ln() + 1.0);
            vocabulary.insert(term, column);
        }

        debug!(docs = doc_count, terms = idf.len(), "Fitted TF-IDF vectorizer");

        Self {
            vocabulary,
            idf,
            options,
        }
    }

    /// Load a vectorizer artifact from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| ModelError::artifact(path, e))?;
        let vectorizer: Self =
            serde_json::from_slice(&bytes).map_err(|e| ModelError::artifact(path, e))?;
        vectorizer
            .validate()
            .map_err(|reason| ModelError::artifact(path, reason))?;
        debug!(path = ?path, terms = vectorizer.term_count(), "Loaded vectorizer");
        Ok(vectorizer)
    }

    /// Write the vectorizer as a JSON artifact.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let bytes = serde_json::to_vec(self)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Check structural consistency of a deserialized artifact.
    fn validate(&self) -> Result<(), String> {
        if let Some((term, &column)) = self.vocabulary.iter().find(|&(_, &c)| c >= self.idf.len())
        {
            return Err(format!(
                "term {term:?} maps to column {column} but only {} idf weights exist",
                self.idf.len()
            ));
        }
        if self.idf.iter().any(|w| !w.is_finite()) {
            return Err("idf contains non-finite weights".to_string());
        }
        let (min_n, max_n) = self.options.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(format!("invalid ngram_range ({min_n}, {max_n})"));
        }
        Ok(())
    }

    /// Transform text into a sparse TF-IDF vector.
    ///
    /// Terms outside the vocabulary are ignored.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f32> = BTreeMap::new();
        for term in extract_terms(text, &self.options) {
            if let Some(&column) = self.vocabulary.get(&term) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(column, tf)| {
                let tf = if self.options.sublinear_tf {
                    1.0 + tf.ln()
                } else {
                    tf
                };
                (column, tf * self.idf[column])
            })
            .collect();

        if self.options.norm == Norm::L2 {
            normalize(&mut vector);
        }
        vector
    }

    /// Cosine similarity of two texts under this vectorizer.
    pub fn cosine(&self, a: &str, b: &str) -> f32 {
        cosine_similarity(&self.transform(a), &self.transform(b))
    }

    /// Get unique term count.
    pub fn term_count(&self) -> usize {
        self.vocabulary.len()
    }

    /// IDF weight of a term, if it is in the vocabulary.
    #[cfg(test)]
    fn idf(&self, term: &str) -> Option<f32> {
        self.vocabulary.get(term).map(|&c| self.idf[c])
    }
}

/// Produce the n-gram terms of a text.
fn extract_terms(text: &str, options: &VectorizerOptions) -> Vec<String> {
    let tokens: Vec<String> = tokenize(text, options.lowercase)
        .into_iter()
        .filter(|t| !options.stop_words.contains(t))
        .collect();

    let (min_n, max_n) = options.ngram_range;
    if min_n == 1 && max_n == 1 {
        return tokens;
    }

    let mut terms = Vec::new();
    for n in min_n.max(1)..=max_n {
        if n > tokens.len() {
            break;
        }
        for gram in tokens.windows(n) {
            terms.push(gram.join(" "));
        }
    }
    terms
}

/// Tokenize text into words.
///
/// A word is a maximal run of alphanumeric characters or `_` with at
/// least two characters.
fn tokenize(text: &str, lowercase: bool) -> Vec<String> {
    let text = if lowercase {
        text.to_lowercase()
    } else {
        text.to_string()
    };
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|s| s.chars().count() > 1)
        .map(String::from)
        .collect()
}

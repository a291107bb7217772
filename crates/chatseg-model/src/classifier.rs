//! Binary window classifier artifact.
//!
//! Two model families are supported, both producing the probability of the
//! positive ("single topic") class from a dense feature row:
//! - logistic regression: `sigmoid(w . x + b)`
//! - gradient-boosted regression trees: `sigmoid(init + lr * sum(tree(x)))`

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ModelError;

/// Leaf marker in a tree's child tables.
pub const TREE_LEAF: i64 = -1;

/// One regression tree as flat node tables.
///
/// Node 0 is the root. An internal node sends a row left when
/// `x[feature] <= threshold`; a leaf has both children set to `-1` and
/// contributes `value`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl RegressionTree {
    /// A tree consisting of a single leaf.
    pub fn leaf(value: f64) -> Self {
        Self {
            children_left: vec![TREE_LEAF],
            children_right: vec![TREE_LEAF],
            feature: vec![-2],
            threshold: vec![-2.0],
            value: vec![value],
        }
    }

    /// A depth-one tree splitting on a single feature.
    pub fn stump(feature: usize, threshold: f64, left: f64, right: f64) -> Self {
        Self {
            children_left: vec![1, TREE_LEAF, TREE_LEAF],
            children_right: vec![2, TREE_LEAF, TREE_LEAF],
            feature: vec![feature as i64, -2, -2],
            threshold: vec![threshold, -2.0, -2.0],
            value: vec![0.0, left, right],
        }
    }

    /// Evaluate the tree on one feature row.
    fn predict(&self, row: &[f32]) -> f64 {
        let mut node = 0usize;
        loop {
            let left = self.children_left[node];
            if left == TREE_LEAF {
                return self.value[node];
            }
            let x = f64::from(row[self.feature[node] as usize]);
            node = if x <= self.threshold[node] {
                left as usize
            } else {
                self.children_right[node] as usize
            };
        }
    }

    /// Check table shapes and node links.
    ///
    /// Children must point strictly forward, which rules out cycles.
    fn validate(&self, n_features: usize) -> Result<(), String> {
        let n = self.children_left.len();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err("tree node tables have different lengths".to_string());
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == TREE_LEAF && right == TREE_LEAF {
                if !self.value[node].is_finite() {
                    return Err(format!("leaf {node} has a non-finite value"));
                }
                continue;
            }
            let forward = |child: i64| child > node as i64 && (child as usize) < n;
            if !forward(left) || !forward(right) {
                return Err(format!("node {node} has invalid children ({left}, {right})"));
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(format!("node {node} splits on unknown feature {feature}"));
            }
            if self.threshold[node].is_nan() {
                return Err(format!("node {node} has a NaN threshold"));
            }
        }
        Ok(())
    }
}

/// Persisted binary classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WindowClassifier {
    Logistic {
        coef: Vec<f64>,
        intercept: f64,
    },
    GradientBoosting {
        /// Initial raw prediction (prior log-odds)
        init_raw: f64,
        learning_rate: f64,
        trees: Vec<RegressionTree>,
    },
}

impl WindowClassifier {
    /// Load a classifier artifact and check it accepts `n_features` inputs.
    pub fn load(path: impl AsRef<Path>, n_features: usize) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| ModelError::artifact(path, e))?;
        let classifier: Self =
            serde_json::from_slice(&bytes).map_err(|e| ModelError::artifact(path, e))?;
        classifier
            .validate(n_features)
            .map_err(|reason| ModelError::artifact(path, reason))?;
        debug!(path = ?path, kind = classifier.kind(), "Loaded classifier");
        Ok(classifier)
    }

    /// Write the classifier as a JSON artifact.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let bytes = serde_json::to_vec(self)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Model family name.
    pub fn kind(&self) -> &'static str {
        match self {
            WindowClassifier::Logistic { .. } => "logistic",
            WindowClassifier::GradientBoosting { .. } => "gradient_boosting",
        }
    }

    /// Check the artifact is usable with rows of `n_features` values.
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        match self {
            WindowClassifier::Logistic { coef, intercept } => {
                if coef.len() != n_features {
                    return Err(format!(
                        "expected {n_features} coefficients, got {}",
                        coef.len()
                    ));
                }
                if !intercept.is_finite() || coef.iter().any(|c| !c.is_finite()) {
                    return Err("non-finite coefficients".to_string());
                }
            }
            WindowClassifier::GradientBoosting {
                init_raw,
                learning_rate,
                trees,
            } => {
                if trees.is_empty() {
                    return Err("gradient boosting model has no trees".to_string());
                }
                if !init_raw.is_finite() || !learning_rate.is_finite() {
                    return Err("non-finite init_raw or learning_rate".to_string());
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.validate(n_features)
                        .map_err(|reason| format!("tree {i}: {reason}"))?;
                }
            }
        }
        Ok(())
    }

    /// Probability of the positive class for one feature row.
    ///
    /// The row length must match the width the artifact was validated for.
    pub fn predict_proba(&self, row: &[f32]) -> f64 {
        let raw = match self {
            WindowClassifier::Logistic { coef, intercept } => {
                coef.iter()
                    .zip(row)
                    .map(|(w, &x)| w * f64::from(x))
                    .sum::<f64>()
                    + intercept
            }
            WindowClassifier::GradientBoosting {
                init_raw,
                learning_rate,
                trees,
            } => init_raw + learning_rate * trees.iter().map(|t| t.predict(row)).sum::<f64>(),
        };
        sigmoid(raw)
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(40.0) > 0.999);
        assert!(sigmoid(-40.0) < 0.001);
    }

    #[test]
    fn test_logistic_predict() {
        let clf = WindowClassifier::Logistic {
            coef: vec![2.0, -1.0],
            intercept: 0.5,
        };
        // 2*1 - 1*0.5 + 0.5 = 2.0
        let p = clf.predict_proba(&[1.0, 0.5]);
        assert!((p - sigmoid(2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_gradient_boosting_predict() {
        let clf = WindowClassifier::GradientBoosting {
            init_raw: -0.5,
            learning_rate: 0.1,
            trees: vec![
                RegressionTree::stump(0, 0.5, -1.0, 3.0),
                RegressionTree::leaf(1.0),
            ],
        };
        let low = clf.predict_proba(&[0.2]);
        let high = clf.predict_proba(&[0.9]);
        assert!((low - sigmoid(-0.5 + 0.1 * 0.0)).abs() < 1e-9);
        assert!((high - sigmoid(-0.5 + 0.1 * 4.0)).abs() < 1e-9);
    }

    #[test]
    fn test_tree_threshold_goes_left_on_equal() {
        let tree = RegressionTree::stump(0, 0.5, -1.0, 1.0);
        assert_eq!(tree.predict(&[0.5]), -1.0);
        assert_eq!(tree.predict(&[0.50001]), 1.0);
    }

    #[test]
    fn test_validate_logistic_width() {
        let clf = WindowClassifier::Logistic {
            coef: vec![1.0; 5],
            intercept: 0.0,
        };
        assert!(clf.validate(6).is_err());
        assert!(clf.validate(5).is_ok());
    }

    #[test]
    fn test_validate_rejects_backward_child() {
        let tree = RegressionTree {
            children_left: vec![0, TREE_LEAF],
            children_right: vec![1, TREE_LEAF],
            feature: vec![0, -2],
            threshold: vec![0.5, -2.0],
            value: vec![0.0, 1.0],
        };
        assert!(tree.validate(1).is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_feature() {
        let tree = RegressionTree::stump(7, 0.5, 0.0, 1.0);
        assert!(tree.validate(6).is_err());
        assert!(tree.validate(8).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_forest() {
        let clf = WindowClassifier::GradientBoosting {
            init_raw: 0.0,
            learning_rate: 0.1,
            trees: vec![],
        };
        assert!(clf.validate(6).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clf.json");
        let clf = WindowClassifier::GradientBoosting {
            init_raw: 0.2,
            learning_rate: 0.5,
            trees: vec![RegressionTree::stump(1, 2.0, -0.5, 0.5)],
        };
        clf.save(&path).unwrap();

        let loaded = WindowClassifier::load(&path, 2).unwrap();
        assert_eq!(loaded.kind(), "gradient_boosting");
        let row = [0.0, 3.0];
        assert!((loaded.predict_proba(&row) - clf.predict_proba(&row)).abs() < 1e-12);
    }

    #[test]
    fn test_load_tagged_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clf.json");
        std::fs::write(
            &path,
            r#"{"kind": "logistic", "coef": [1, 0, 0], "intercept": -1}"#,
        )
        .unwrap();
        let clf = WindowClassifier::load(&path, 3).unwrap();
        assert!((clf.predict_proba(&[1.0, 9.0, 9.0]) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_load_wrong_width_is_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clf.json");
        std::fs::write(&path, r#"{"kind": "logistic", "coef": [1], "intercept": 0}"#).unwrap();
        let result = WindowClassifier::load(&path, 6);
        assert!(matches!(result, Err(ModelError::ArtifactLoad { .. })));
    }

    #[test]
    fn test_load_unknown_kind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clf.json");
        std::fs::write(&path, r#"{"kind": "svm"}"#).unwrap();
        let result = WindowClassifier::load(&path, 6);
        assert!(matches!(result, Err(ModelError::ArtifactLoad { .. })));
    }
}

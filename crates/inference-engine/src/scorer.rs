//! Classifier Models

use crate::InferenceError;
use serde::{Deserialize, Serialize};

/// A fitted binary classifier scoring aligned feature rows
pub trait Scorer: Send + Sync {
    /// Width of the rows the classifier was trained on
    fn n_features(&self) -> usize;

    /// Probability of class 1 (churn)
    fn predict_proba(&self, features: &[f64]) -> Result<f64, InferenceError>;

    /// Predicted class; class 1 only when it is strictly more likely than class 0
    fn predict(&self, features: &[f64]) -> Result<u8, InferenceError> {
        let probability = self.predict_proba(features)?;
        Ok(u8::from(probability > 0.5))
    }

    /// Short human-readable model name
    fn name(&self) -> &'static str;
}

fn check_width(features: &[f64], expected: usize) -> Result<(), InferenceError> {
    if features.len() != expected {
        return Err(InferenceError::InvalidInputShape {
            expected,
            actual: features.len(),
        });
    }
    Ok(())
}

/// Linear model with a logistic link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl Scorer for LogisticRegression {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_proba(&self, features: &[f64]) -> Result<f64, InferenceError> {
        check_width(features, self.n_features())?;
        let z: f64 = self
            .coefficients
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;
        Ok(1.0 / (1.0 + (-z).exp()))
    }

    fn name(&self) -> &'static str {
        "logistic regression"
    }
}

/// Binary decision tree in parallel-array layout
///
/// Node `i` is a leaf when `children_left[i] == -1`; otherwise a row goes
/// left when `x[feature[i]] <= threshold[i]`. `value[i]` holds the class 0
/// and class 1 weights of the training samples reaching the node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<[f64; 2]>,
}

impl DecisionTree {
    /// Check array lengths, child links and split features
    ///
    /// Children must come after their parent, so traversal always terminates.
    pub fn validate(&self, n_features: usize) -> Result<(), InferenceError> {
        let nodes = self.children_left.len();
        if nodes == 0 {
            return Err(InferenceError::InvalidModel("tree has no nodes".to_string()));
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|&len| len != nodes)
        {
            return Err(InferenceError::InvalidModel(
                "tree arrays differ in length".to_string(),
            ));
        }

        for node in 0..nodes {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == -1 || right == -1 {
                if left != right {
                    return Err(InferenceError::InvalidModel(format!(
                        "node {node} has only one child"
                    )));
                }
                let [c0, c1] = self.value[node];
                if !(c0 >= 0.0 && c1 >= 0.0 && c0 + c1 > 0.0) {
                    return Err(InferenceError::InvalidModel(format!(
                        "leaf {node} has no class weight"
                    )));
                }
                continue;
            }
            for child in [left, right] {
                if child <= node as i64 || child >= nodes as i64 {
                    return Err(InferenceError::InvalidModel(format!(
                        "node {node} links to invalid child {child}"
                    )));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature >= n_features as i64 {
                return Err(InferenceError::InvalidModel(format!(
                    "node {node} splits on feature {feature} of {n_features}"
                )));
            }
        }
        Ok(())
    }

    /// Class 1 share of the leaf the row falls into
    ///
    /// Checked even for validated trees, since the fields are public.
    fn leaf_probability(&self, features: &[f64]) -> Result<f64, InferenceError> {
        let corrupt = |node: usize| InferenceError::InvalidModel(format!("corrupt tree at node {node}"));

        let mut node = 0usize;
        loop {
            let left = *self.children_left.get(node).ok_or_else(|| corrupt(node))?;
            if left == -1 {
                break;
            }
            let right = *self.children_right.get(node).ok_or_else(|| corrupt(node))?;
            let feature = *self.feature.get(node).ok_or_else(|| corrupt(node))?;
            let threshold = *self.threshold.get(node).ok_or_else(|| corrupt(node))?;
            let x = usize::try_from(feature)
                .ok()
                .and_then(|f| features.get(f))
                .ok_or_else(|| corrupt(node))?;

            let next = if *x <= threshold { left } else { right };
            // Children after their parent rule out cycles
            match usize::try_from(next) {
                Ok(next) if next > node => node = next,
                _ => return Err(corrupt(node)),
            }
        }

        let [c0, c1] = *self.value.get(node).ok_or_else(|| corrupt(node))?;
        if !(c0 + c1 > 0.0) {
            return Err(corrupt(node));
        }
        Ok(c1 / (c0 + c1))
    }
}

/// Averaging ensemble of decision trees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn validate(&self) -> Result<(), InferenceError> {
        if self.trees.is_empty() {
            return Err(InferenceError::InvalidModel("forest has no trees".to_string()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|e| InferenceError::InvalidModel(format!("tree {i}: {e}")))?;
        }
        Ok(())
    }
}

impl Scorer for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, features: &[f64]) -> Result<f64, InferenceError> {
        check_width(features, self.n_features)?;
        if self.trees.is_empty() {
            return Err(InferenceError::InvalidModel("forest has no trees".to_string()));
        }
        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.leaf_probability(features)?;
        }
        Ok(total / self.trees.len() as f64)
    }

    fn name(&self) -> &'static str {
        "random forest"
    }
}

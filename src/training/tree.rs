//! MSE regression tree

use crate::error::{GrowthError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with prediction value
    Leaf {
        value: f64,
        n_samples: usize,
    },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
        impurity: f64,
    },
}

/// Regression tree minimizing mean squared error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    root: Option<TreeNode>,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    n_features: usize,
    feature_importances: Option<Array1<f64>>,
}

impl Default for RegressionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RegressionTree {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            n_features: 0,
            feature_importances: None,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Fit the tree to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(GrowthError::Shape {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }

        if n_samples == 0 {
            return Err(GrowthError::DegenerateInput(
                "cannot fit a tree on zero samples".to_string(),
            ));
        }

        self.n_features = n_features;

        let mut importances = vec![0.0; n_features];
        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build_tree(x, y, &indices, 0, &mut importances));

        // Normalize feature importances
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.feature_importances = Some(Array1::from_vec(importances));

        Ok(self)
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
        importances: &mut [f64],
    ) -> TreeNode {
        let n_samples = indices.len();
        let y_subset: Vec<f64> = indices.iter().map(|&i| y[i]).collect();

        let should_stop = n_samples < self.min_samples_split
            || n_samples <= self.min_samples_leaf
            || self.max_depth.is_some_and(|d| depth >= d)
            || is_pure(&y_subset);

        if should_stop {
            return TreeNode::Leaf {
                value: mean(&y_subset),
                n_samples,
            };
        }

        if let Some((best_feature, best_threshold, best_gain)) = self.find_best_split(x, y, indices)
        {
            let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .partition(|&&i| x[[i, best_feature]] <= best_threshold);

            if left_indices.len() < self.min_samples_leaf
                || right_indices.len() < self.min_samples_leaf
            {
                return TreeNode::Leaf {
                    value: mean(&y_subset),
                    n_samples,
                };
            }

            // Importance = samples-weighted impurity decrease at this split
            let parent_impurity = mse(&y_subset);
            let left_y: Vec<f64> = left_indices.iter().map(|&i| y[i]).collect();
            let right_y: Vec<f64> = right_indices.iter().map(|&i| y[i]).collect();

            let weighted_child_impurity = (left_indices.len() as f64 * mse(&left_y)
                + right_indices.len() as f64 * mse(&right_y))
                / n_samples as f64;

            importances[best_feature] +=
                n_samples as f64 * (parent_impurity - weighted_child_impurity);

            let left = Box::new(self.build_tree(x, y, &left_indices, depth + 1, importances));
            let right = Box::new(self.build_tree(x, y, &right_indices, depth + 1, importances));

            TreeNode::Split {
                feature_idx: best_feature,
                threshold: best_threshold,
                left,
                right,
                n_samples,
                impurity: best_gain,
            }
        } else {
            TreeNode::Leaf {
                value: mean(&y_subset),
                n_samples,
            }
        }
    }

    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
    ) -> Option<(usize, f64, f64)> {
        let n_features = x.ncols();

        let y_subset: Vec<f64> = indices.iter().map(|&i| y[i]).collect();
        let parent_impurity = mse(&y_subset);

        let mut best: Option<(usize, f64, f64)> = None;

        for feature_idx in 0..n_features {
            let mut values: Vec<f64> = indices.iter().map(|&i| x[[i, feature_idx]]).collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            values.dedup();

            for window in values.windows(2) {
                let threshold = (window[0] + window[1]) / 2.0;

                // Accumulate variance terms incrementally per side
                let mut left_count = 0usize;
                let mut right_count = 0usize;
                let mut left_sum = 0.0f64;
                let mut right_sum = 0.0f64;
                let mut left_sq_sum = 0.0f64;
                let mut right_sq_sum = 0.0f64;

                for &idx in indices {
                    let yi = y[idx];
                    if x[[idx, feature_idx]] <= threshold {
                        left_count += 1;
                        left_sum += yi;
                        left_sq_sum += yi * yi;
                    } else {
                        right_count += 1;
                        right_sum += yi;
                        right_sq_sum += yi * yi;
                    }
                }

                if left_count < self.min_samples_leaf || right_count < self.min_samples_leaf {
                    continue;
                }

                let left_impurity = variance_from_sums(left_count, left_sum, left_sq_sum);
                let right_impurity = variance_from_sums(right_count, right_sum, right_sq_sum);

                let n = indices.len() as f64;
                let weighted_impurity =
                    (left_count as f64 * left_impurity + right_count as f64 * right_impurity) / n;

                let gain = parent_impurity - weighted_impurity;
                if gain > best.map_or(0.0, |(_, _, g)| g) {
                    best = Some((feature_idx, threshold, gain));
                }
            }
        }

        best
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(GrowthError::NotFitted)?;

        let predictions: Vec<f64> = (0..x.nrows())
            .map(|i| {
                let sample = x.row(i);
                predict_sample(root, &sample.to_vec())
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    /// Get feature importances (normalized to sum 1, or all-zero if no split occurred)
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Get tree depth
    pub fn depth(&self) -> usize {
        match &self.root {
            None => 0,
            Some(node) => node_depth(node),
        }
    }
}

fn predict_sample(node: &TreeNode, sample: &[f64]) -> f64 {
    match node {
        TreeNode::Leaf { value, .. } => *value,
        TreeNode::Split {
            feature_idx,
            threshold,
            left,
            right,
            ..
        } => {
            if sample[*feature_idx] <= *threshold {
                predict_sample(left, sample)
            } else {
                predict_sample(right, sample)
            }
        }
    }
}

fn node_depth(node: &TreeNode) -> usize {
    match node {
        TreeNode::Leaf { .. } => 1,
        TreeNode::Split { left, right, .. } => 1 + node_depth(left).max(node_depth(right)),
    }
}

// Var = E[X²] - E[X]²
fn variance_from_sums(count: usize, sum: f64, sq_sum: f64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let n = count as f64;
    sq_sum / n - (sum / n).powi(2)
}

fn mse(y: &[f64]) -> f64 {
    if y.is_empty() {
        return 0.0;
    }
    let m = mean(y);
    y.iter().map(|&v| (v - m).powi(2)).sum::<f64>() / y.len() as f64
}

fn mean(y: &[f64]) -> f64 {
    if y.is_empty() {
        return 0.0;
    }
    y.iter().sum::<f64>() / y.len() as f64
}

fn is_pure(y: &[f64]) -> bool {
    if y.is_empty() {
        return true;
    }
    let first = y[0];
    y.iter().all(|&v| (v - first).abs() < 1e-10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fits_linear_data() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0];

        let mut tree = RegressionTree::new();
        tree.fit(&x, &y).unwrap();

        let predictions = tree.predict(&x).unwrap();
        let err: f64 = predictions
            .iter()
            .zip(y.iter())
            .map(|(p, a)| (p - a).powi(2))
            .sum::<f64>()
            / y.len() as f64;

        assert!(err < 1.0, "MSE too high: {}", err);
    }

    #[test]
    fn test_max_depth_respected() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0], [8.0]];
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];

        let mut tree = RegressionTree::new().with_max_depth(2);
        tree.fit(&x, &y).unwrap();

        assert!(tree.depth() <= 3); // root split + one level + leaves
    }

    #[test]
    fn test_constant_feature_gets_zero_importance() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [4.0, 0.0]];
        let y = array![1.0, 2.0, 3.0, 4.0];

        let mut tree = RegressionTree::new();
        tree.fit(&x, &y).unwrap();

        let importances = tree.feature_importances().unwrap();
        assert!(importances[0] > importances[1]);
        assert_eq!(importances[1], 0.0);
    }

    #[test]
    fn test_constant_target_yields_zero_importances() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![5.0, 5.0, 5.0];

        let mut tree = RegressionTree::new();
        tree.fit(&x, &y).unwrap();

        let importances = tree.feature_importances().unwrap();
        assert!(importances.iter().all(|&v| v == 0.0));

        let pred = tree.predict(&x).unwrap();
        assert!((pred[0] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_predict_before_fit() {
        let tree = RegressionTree::new();
        let x = array![[1.0]];
        assert!(tree.predict(&x).is_err());
    }
}

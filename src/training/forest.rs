//! Bootstrap ensemble of regression trees

use crate::error::{GrowthError, Result};
use crate::training::config::ForestConfig;
use crate::training::tree::RegressionTree;
use ndarray::{Array1, Array2, Axis};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Random forest regressor.
///
/// Trees are built in parallel, each from a bootstrap resample drawn with its
/// own `ChaCha8Rng` seeded from the base seed plus the tree index, so a fit is
/// reproducible regardless of thread scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
    config: ForestConfig,
    feature_importances: Option<Array1<f64>>,
    n_features: usize,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            trees: Vec::new(),
            config,
            feature_importances: None,
            n_features: 0,
        }
    }

    /// Fit the forest to training data
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
                "cannot fit a forest on zero samples".to_string(),
            ));
        }

        self.n_features = n_features;
        let base_seed = self.config.seed;

        let trees: Vec<RegressionTree> = (0..self.config.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let seed = base_seed.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);

                let sample_indices: Vec<usize> = (0..n_samples)
                    .map(|_| (rng.next_u64() as usize) % n_samples)
                    .collect();

                let x_boot = x.select(Axis(0), &sample_indices);
                let y_boot: Array1<f64> =
                    Array1::from_vec(sample_indices.iter().map(|&i| y[i]).collect());

                let mut tree = RegressionTree::new()
                    .with_min_samples_split(self.config.min_samples_split)
                    .with_min_samples_leaf(self.config.min_samples_leaf);
                if let Some(d) = self.config.max_depth {
                    tree = tree.with_max_depth(d);
                }

                tree.fit(&x_boot, &y_boot)?;
                Ok(tree)
            })
            .collect::<Result<_>>()?;

        self.trees = trees;
        self.compute_feature_importances();

        Ok(self)
    }

    fn compute_feature_importances(&mut self) {
        if self.trees.is_empty() {
            return;
        }

        let mut total = vec![0.0; self.n_features];

        for tree in &self.trees {
            if let Some(imp) = tree.feature_importances() {
                for (i, &val) in imp.iter().enumerate() {
                    if i < self.n_features {
                        total[i] += val;
                    }
                }
            }
        }

        let n_trees = self.trees.len() as f64;
        for imp in &mut total {
            *imp /= n_trees;
        }

        let sum: f64 = total.iter().sum();
        if sum > 0.0 {
            for imp in &mut total {
                *imp /= sum;
            }
        }

        self.feature_importances = Some(Array1::from_vec(total));
    }

    /// Predict by averaging tree outputs
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(GrowthError::NotFitted);
        }

        let all_predictions: Vec<Array1<f64>> = self
            .trees
            .par_iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<_>>()?;

        let n_samples = x.nrows();
        let predictions: Vec<f64> = (0..n_samples)
            .map(|i| {
                let sum: f64 = all_predictions.iter().map(|p| p[i]).sum();
                sum / all_predictions.len() as f64
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    /// Averaged, normalized feature importances.
    /// All-zero when no tree found a split.
    pub fn feature_importances(&self) -> Array1<f64> {
        self.feature_importances
            .clone()
            .unwrap_or_else(|| Array1::zeros(self.n_features))
    }

    /// Number of fitted trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

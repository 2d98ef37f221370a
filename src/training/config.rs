//! Forest training configuration

use serde::{Deserialize, Serialize};

/// Hyperparameters for a forest fit.
///
/// Defaults mirror the deployed model: 40 trees, depth 8, seed 42, with a
/// 20% held-out evaluation split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
    /// Fraction of rows held out for RMSE/R² evaluation
    pub test_split: f64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 40,
            max_depth: Some(8),
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 42,
            test_split: 0.2,
        }
    }
}

impl ForestConfig {
    /// Set the number of trees
    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    /// Set maximum tree depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set the base seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the held-out evaluation fraction
    pub fn with_test_split(mut self, fraction: f64) -> Self {
        self.test_split = fraction;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ForestConfig::default();
        assert_eq!(config.n_estimators, 40);
        assert_eq!(config.max_depth, Some(8));
        assert_eq!(config.seed, 42);
        assert!((config.test_split - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_builder() {
        let config = ForestConfig::default()
            .with_n_estimators(5)
            .with_max_depth(3)
            .with_seed(7);
        assert_eq!(config.n_estimators, 5);
        assert_eq!(config.max_depth, Some(3));
        assert_eq!(config.seed, 7);
    }
}

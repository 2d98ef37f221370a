//! Held-out evaluation metrics

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Regression metrics computed on the held-out partition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalMetrics {
    pub rmse: f64,
    pub r2: f64,
    pub n_train: usize,
    pub n_test: usize,
}

impl EvalMetrics {
    /// Compute RMSE and R² for a prediction set
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>, n_train: usize) -> Self {
        let n = y_true.len() as f64;
        let errors: Vec<f64> = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| t - p)
            .collect();

        let mse: f64 = errors.iter().map(|e| e * e).sum::<f64>() / n;

        let y_mean: f64 = y_true.iter().sum::<f64>() / n;
        let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();
        let ss_res: f64 = errors.iter().map(|e| e.powi(2)).sum();

        let r2 = if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else {
            0.0
        };

        Self {
            rmse: mse.sqrt(),
            r2,
            n_train,
            n_test: y_true.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_perfect_prediction() {
        let y = array![1.0, 2.0, 3.0];
        let metrics = EvalMetrics::compute(&y, &y, 10);
        assert!(metrics.rmse.abs() < 1e-12);
        assert!((metrics.r2 - 1.0).abs() < 1e-12);
        assert_eq!(metrics.n_train, 10);
        assert_eq!(metrics.n_test, 3);
    }

    #[test]
    fn test_rmse_value() {
        let y_true = array![0.0, 0.0];
        let y_pred = array![3.0, 4.0];
        let metrics = EvalMetrics::compute(&y_true, &y_pred, 0);
        // sqrt((9 + 16) / 2)
        assert!((metrics.rmse - (12.5f64).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_constant_truth_gives_zero_r2() {
        let y_true = array![2.0, 2.0, 2.0];
        let y_pred = array![1.0, 2.0, 3.0];
        let metrics = EvalMetrics::compute(&y_true, &y_pred, 0);
        assert_eq!(metrics.r2, 0.0);
    }
}

//! Seeded split-train-evaluate driver

use crate::error::{GrowthError, Result};
use crate::training::config::ForestConfig;
use crate::training::forest::RandomForest;
use crate::training::metrics::EvalMetrics;
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A fitted forest together with its held-out evaluation
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub forest: RandomForest,
    pub metrics: EvalMetrics,
}

/// Trains a forest on a preprocessed table: seeded shuffle split, fit on the
/// training partition, RMSE/R² on the held-out partition.
#[derive(Debug, Clone)]
pub struct Trainer {
    config: ForestConfig,
}

impl Trainer {
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }

    pub fn train(&self, df: &DataFrame, features: &[&str], target: &str) -> Result<TrainedModel> {
        let target_column = df
            .column(target)
            .map_err(|_| GrowthError::MissingColumn(target.to_string()))?;
        let target_f64 = target_column
            .cast(&DataType::Float64)
            .map_err(|e| GrowthError::Data(e.to_string()))?;
        let y: Array1<f64> = target_f64
            .f64()
            .map_err(|e| GrowthError::Data(e.to_string()))?
            .into_iter()
            .map(|v| v.unwrap_or(0.0))
            .collect();

        let x = columns_to_array2(df, features)?;

        let n = x.nrows();
        if n < 2 {
            return Err(GrowthError::DegenerateInput(format!(
                "need at least 2 rows to split for evaluation, got {n}"
            )));
        }

        let (train_idx, test_idx) = shuffle_split(n, self.config.test_split, self.config.seed);

        let x_train = x.select(Axis(0), &train_idx);
        let y_train: Array1<f64> = Array1::from_vec(train_idx.iter().map(|&i| y[i]).collect());
        let x_test = x.select(Axis(0), &test_idx);
        let y_test: Array1<f64> = Array1::from_vec(test_idx.iter().map(|&i| y[i]).collect());

        let mut forest = RandomForest::new(self.config.clone());
        forest.fit(&x_train, &y_train)?;

        let y_pred = forest.predict(&x_test)?;
        let metrics = EvalMetrics::compute(&y_test, &y_pred, train_idx.len());

        Ok(TrainedModel { forest, metrics })
    }
}

/// Seeded shuffle split. Always keeps at least one row on each side.
fn shuffle_split(n: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n as f64 * test_fraction).round() as usize).clamp(1, n - 1);
    let test_idx = indices.split_off(n - n_test);
    (indices, test_idx)
}

/// Extract named columns from a DataFrame into a row-major Array2<f64>.
/// Builds the array with `from_shape_fn` over contiguous per-column Vecs.
pub(crate) fn columns_to_array2(df: &DataFrame, col_names: &[&str]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            let column = df
                .column(col_name)
                .map_err(|_| GrowthError::MissingFeature(vec![col_name.to_string()]))?;
            let casted = column
                .cast(&DataType::Float64)
                .map_err(|e| GrowthError::Data(e.to_string()))?;
            let values: Vec<f64> = casted
                .f64()
                .map_err(|e| GrowthError::Data(e.to_string()))?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            Ok(values)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
        col_refs[c][r]
    }))
}

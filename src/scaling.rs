//! Standard scaling over the model feature columns

use crate::error::{GrowthError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-column fitted scaling parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnStats {
    pub mean: f64,
    /// Population standard deviation (ddof = 0)
    pub std: f64,
}

/// Standard scaler: (x - mean) / std per column.
///
/// Columns with zero variance scale to exactly 0.0 for every row, at fit and
/// at transform time alike, so training rows and unseen rows agree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    params: HashMap<String, ColumnStats>,
    columns: Vec<String>,
    is_fitted: bool,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardScaler {
    pub fn new() -> Self {
        Self {
            params: HashMap::new(),
            columns: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the scaler to the given columns
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.params.clear();
        self.columns.clear();

        for col_name in columns {
            let ca = numeric_column(df, col_name)?;
            let mean = ca.mean().unwrap_or(0.0);
            let std = ca.std(0).unwrap_or(0.0);

            self.params
                .insert(col_name.to_string(), ColumnStats { mean, std });
            self.columns.push(col_name.to_string());
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the fitted columns. Never refits.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(GrowthError::NotFitted);
        }

        let mut result = df.clone();

        for col_name in &self.columns {
            let stats = &self.params[col_name];
            let ca = numeric_column(df, col_name)?;

            let scaled: Float64Chunked = if stats.std == 0.0 {
                ca.into_iter().map(|opt| opt.map(|_| 0.0)).collect()
            } else {
                ca.into_iter()
                    .map(|opt| opt.map(|v| (v - stats.mean) / stats.std))
                    .collect()
            };

            result.with_column(scaled.with_name(col_name.as_str().into()).into_series())?;
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Fitted stats for a column
    pub fn stats(&self, column: &str) -> Option<&ColumnStats> {
        self.params.get(column)
    }
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
    let column = df
        .column(name)
        .map_err(|_| GrowthError::MissingFeature(vec![name.to_string()]))?;
    let casted = column
        .cast(&DataType::Float64)
        .map_err(|e| GrowthError::Data(e.to_string()))?;
    Ok(casted.f64().map_err(|e| GrowthError::Data(e.to_string()))?.clone())
}

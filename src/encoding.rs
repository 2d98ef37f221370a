//! Label encoding for categorical columns

use crate::error::{GrowthError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Label encoder for categorical columns.
///
/// Codes are dense `0..n` per column, assigned in first-occurrence order at
/// fit time and frozen afterwards. Transforming a value that was never seen
/// during fit is a client data error, not an excuse to grow the map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEncoder {
    // Maps column name -> (category -> code)
    mappings: HashMap<String, HashMap<String, usize>>,
    // Fit-order column list, kept for deterministic iteration
    columns: Vec<String>,
    is_fitted: bool,
}

impl Default for CategoryEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryEncoder {
    pub fn new() -> Self {
        Self {
            mappings: HashMap::new(),
            columns: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the encoder to the given columns
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.mappings.clear();
        self.columns.clear();

        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| GrowthError::MissingFeature(vec![col_name.to_string()]))?;
            let series = column.as_materialized_series();

            let mapping = build_mapping(series)?;
            self.mappings.insert(col_name.to_string(), mapping);
            self.columns.push(col_name.to_string());
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the fitted columns to their integer codes
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(GrowthError::NotFitted);
        }

        let mut result = df.clone();

        for col_name in &self.columns {
            let mapping = &self.mappings[col_name];
            let column = df
                .column(col_name)
                .map_err(|_| GrowthError::MissingFeature(vec![col_name.clone()]))?;
            let ca = column
                .as_materialized_series()
                .str()
                .map_err(|e| GrowthError::Data(e.to_string()))?;

            let values: Vec<i64> = ca
                .into_iter()
                .map(|v| match v {
                    Some(s) => mapping
                        .get(s)
                        .map(|&code| code as i64)
                        .ok_or_else(|| GrowthError::UnknownCategory {
                            column: col_name.clone(),
                            value: s.to_string(),
                        }),
                    None => Err(GrowthError::Data(format!(
                        "null value in categorical column {col_name}"
                    ))),
                })
                .collect::<Result<_>>()?;

            let encoded = Series::new(col_name.as_str().into(), values);
            result.with_column(encoded)?;
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Number of distinct categories seen for a column at fit time
    pub fn cardinality(&self, column: &str) -> Option<usize> {
        self.mappings.get(column).map(|m| m.len())
    }
}

fn build_mapping(series: &Series) -> Result<HashMap<String, usize>> {
    let mut mapping = HashMap::new();
    let ca = series
        .str()
        .map_err(|e| GrowthError::Data(e.to_string()))?;

    let mut idx = 0usize;
    for val in ca.into_iter().flatten() {
        if !mapping.contains_key(val) {
            mapping.insert(val.to_string(), idx);
            idx += 1;
        }
    }

    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_occurrence_order() {
        let df = df!("State" => &["TX", "CA", "TX", "NY", "CA"]).unwrap();

        let mut encoder = CategoryEncoder::new();
        let result = encoder.fit_transform(&df, &["State"]).unwrap();

        let codes = result.column("State").unwrap().i64().unwrap();
        let expected = [0i64, 1, 0, 2, 1];
        for (i, want) in expected.iter().enumerate() {
            assert_eq!(codes.get(i).unwrap(), *want);
        }
    }

    #[test]
    fn test_unknown_category_errors() {
        let train = df!("State" => &["TX", "CA"]).unwrap();
        let infer = df!("State" => &["TX", "OR"]).unwrap();

        let mut encoder = CategoryEncoder::new();
        encoder.fit(&train, &["State"]).unwrap();

        let err = encoder.transform(&infer).unwrap_err();
        match err {
            GrowthError::UnknownCategory { column, value } => {
                assert_eq!(column, "State");
                assert_eq!(value, "OR");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_maps_frozen_across_transforms() {
        let train = df!("State" => &["TX", "CA"]).unwrap();
        let infer = df!("State" => &["CA", "CA", "TX"]).unwrap();

        let mut encoder = CategoryEncoder::new();
        encoder.fit(&train, &["State"]).unwrap();

        let result = encoder.transform(&infer).unwrap();
        let codes = result.column("State").unwrap().i64().unwrap();
        assert_eq!(codes.get(0).unwrap(), 1);
        assert_eq!(codes.get(2).unwrap(), 0);
        assert_eq!(encoder.cardinality("State"), Some(2));
    }

    #[test]
    fn test_transform_before_fit() {
        let df = df!("State" => &["TX"]).unwrap();
        let encoder = CategoryEncoder::new();
        assert!(matches!(
            encoder.transform(&df),
            Err(GrowthError::NotFitted)
        ));
    }
}

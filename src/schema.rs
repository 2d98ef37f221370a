//! Column names and schema validation for the business records table

use crate::error::{GrowthError, Result};
use polars::prelude::*;

/// Optional identifier column, passed through untouched when present.
pub const ID_COLUMN: &str = "Business_ID";

/// Training target column.
pub const TARGET: &str = "Growth_Rate (%)";

/// Prediction output column name.
pub const PREDICTED: &str = "Predicted_Growth_Rate (%)";

/// Raw numeric input columns.
pub const RAW_NUMERIC: [&str; 8] = [
    "Employees",
    "Years_in_Operation",
    "Credit_Score",
    "Annual_Revenue_Year1",
    "Annual_Revenue_Year3",
    "Assets_Year1",
    "Assets_Year3",
    "Loan_Amount_Year3",
];

/// Categorical input columns, label-encoded before training.
pub const CATEGORICAL: [&str; 4] = ["Industry_Type", "Business_Type", "State", "District"];

/// Columns derived from the raw numerics.
pub const DERIVED: [&str; 3] = [
    "Revenue_Growth_Rate",
    "Asset_Growth_Rate",
    "Loan_Dependency_Ratio",
];

/// Model feature columns, in the fixed order the forest expects.
pub const MODEL_FEATURES: [&str; 10] = [
    "Employees",
    "Years_in_Operation",
    "Credit_Score",
    "Revenue_Growth_Rate",
    "Asset_Growth_Rate",
    "Loan_Dependency_Ratio",
    "Industry_Type",
    "Business_Type",
    "State",
    "District",
];

/// Columns a training upload must carry.
pub fn training_columns() -> Vec<&'static str> {
    let mut cols: Vec<&str> = RAW_NUMERIC.to_vec();
    cols.extend_from_slice(&CATEGORICAL);
    cols.push(TARGET);
    cols
}

/// Columns a prediction input must carry.
pub fn prediction_columns() -> Vec<&'static str> {
    let mut cols: Vec<&str> = RAW_NUMERIC.to_vec();
    cols.extend_from_slice(&CATEGORICAL);
    cols
}

/// Validate that every required column is present, reporting all absences at once.
pub fn require_columns(df: &DataFrame, required: &[&str]) -> Result<()> {
    let present: Vec<&str> = df.get_column_names().iter().map(|s| s.as_str()).collect();
    let missing: Vec<String> = required
        .iter()
        .filter(|c| !present.contains(c))
        .map(|c| c.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(GrowthError::MissingFeature(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_columns_reports_all_missing() {
        let df = df!("Employees" => &[1.0, 2.0]).unwrap();
        let err = require_columns(&df, &["Employees", "State", "District"]).unwrap_err();
        match err {
            GrowthError::MissingFeature(cols) => {
                assert_eq!(cols, vec!["State".to_string(), "District".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_require_columns_ok() {
        let df = df!("Employees" => &[1.0], "State" => &["TX"]).unwrap();
        assert!(require_columns(&df, &["Employees", "State"]).is_ok());
    }

    #[test]
    fn test_feature_order_is_fixed() {
        assert_eq!(MODEL_FEATURES[0], "Employees");
        assert_eq!(MODEL_FEATURES[5], "Loan_Dependency_Ratio");
        assert_eq!(MODEL_FEATURES[9], "District");
    }
}

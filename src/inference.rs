//! Prediction over frozen artifact generations

use crate::artifact::ArtifactStore;
use crate::error::{GrowthError, Result};
use crate::features;
use crate::schema;
use crate::training::columns_to_array2;
use polars::prelude::*;
use std::sync::Arc;

/// Applies the current generation's encoder, scaler, and forest to raw rows.
///
/// Every call resolves the generation once up front, so a training event
/// landing mid-request never mixes transforms from different fits.
#[derive(Debug, Clone)]
pub struct Predictor {
    store: Arc<ArtifactStore>,
}

impl Predictor {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self { store }
    }

    /// Predict the growth rate for a single raw record.
    ///
    /// The record carries the same columns as an upload row minus the target;
    /// ratio features are derived here. A record whose derivations are
    /// degenerate (zero denominators, missing values) cannot be scored.
    pub fn predict_one(&self, record: &DataFrame) -> Result<f64> {
        schema::require_columns(record, &schema::prediction_columns())?;

        let engineered = features::engineer(record)?;
        if engineered.height() == 0 {
            return Err(GrowthError::DegenerateInput(
                "record dropped during feature derivation".to_string(),
            ));
        }

        let predictions = self.score(&engineered)?;
        Ok(predictions[0])
    }

    /// Predict from a record whose ratio columns are already derived.
    ///
    /// Used when the caller holds engineered rows, for example the stored
    /// training table. No derivation or row dropping happens here.
    pub fn predict_one_engineered(&self, record: &DataFrame) -> Result<f64> {
        if record.height() == 0 {
            return Err(GrowthError::DegenerateInput(
                "empty record".to_string(),
            ));
        }

        let predictions = self.score(record)?;
        Ok(predictions[0])
    }

    /// Predict growth rates for every valid row of a raw table.
    ///
    /// Rows that fail derivation are dropped, exactly as during training, so
    /// the output aligns with the surviving rows.
    pub fn predict_batch(&self, df: &DataFrame) -> Result<Vec<f64>> {
        schema::require_columns(df, &schema::prediction_columns())?;

        let engineered = features::engineer(df)?;
        if engineered.height() == 0 {
            return Err(GrowthError::DegenerateInput(
                "no rows survived feature derivation".to_string(),
            ));
        }

        self.score(&engineered)
    }

    /// Score a table that already carries the derived columns
    fn score(&self, engineered: &DataFrame) -> Result<Vec<f64>> {
        let generation = self.store.get().ok_or(GrowthError::ArtifactNotReady)?;

        let encoded = generation.encoder.transform(engineered)?;
        let scaled = generation.scaler.transform(&encoded)?;

        let feature_refs: Vec<&str> = generation
            .feature_names
            .iter()
            .map(|s| s.as_str())
            .collect();
        let x = columns_to_array2(&scaled, &feature_refs)?;

        let predictions = generation.forest.predict(&x)?;
        Ok(predictions.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::GrowthPipeline;
    use crate::training::ForestConfig;

    fn raw_frame(n: usize) -> DataFrame {
        let industries = ["Retail", "Manufacturing", "Services"];
        let types = ["LLC", "Partnership"];
        let states = ["TX", "CA", "NY", "WA"];
        let districts = ["North", "South", "East", "West"];

        let mut employees = Vec::with_capacity(n);
        let mut years = Vec::with_capacity(n);
        let mut credit = Vec::with_capacity(n);
        let mut rev1 = Vec::with_capacity(n);
        let mut rev3 = Vec::with_capacity(n);
        let mut assets1 = Vec::with_capacity(n);
        let mut assets3 = Vec::with_capacity(n);
        let mut loan = Vec::with_capacity(n);
        let mut industry = Vec::with_capacity(n);
        let mut btype = Vec::with_capacity(n);
        let mut state = Vec::with_capacity(n);
        let mut district = Vec::with_capacity(n);
        let mut growth = Vec::with_capacity(n);

        for i in 0..n {
            let x = i as f64;
            employees.push(10.0 + x);
            years.push(2.0 + (i % 15) as f64);
            credit.push(600.0 + (i % 150) as f64);
            rev1.push(100_000.0 + x * 1_000.0);
            rev3.push(120_000.0 + x * 1_500.0);
            assets1.push(50_000.0 + x * 500.0);
            assets3.push(55_000.0 + x * 800.0);
            loan.push(20_000.0 + x * 200.0);
            industry.push(industries[i % industries.len()]);
            btype.push(types[i % types.len()]);
            state.push(states[i % states.len()]);
            district.push(districts[i % districts.len()]);
            growth.push(5.0 + (x * 0.7).sin() * 3.0 + x * 0.1);
        }

        df!(
            "Employees" => &employees,
            "Years_in_Operation" => &years,
            "Credit_Score" => &credit,
            "Annual_Revenue_Year1" => &rev1,
            "Annual_Revenue_Year3" => &rev3,
            "Assets_Year1" => &assets1,
            "Assets_Year3" => &assets3,
            "Loan_Amount_Year3" => &loan,
            "Industry_Type" => &industry,
            "Business_Type" => &btype,
            "State" => &state,
            "District" => &district,
            "Growth_Rate (%)" => &growth
        )
        .unwrap()
    }

    fn trained_store() -> Arc<ArtifactStore> {
        let raw = raw_frame(30);
        let pipeline = GrowthPipeline::new(ForestConfig::default().with_n_estimators(5));
        let (_, generation) = pipeline.train(&raw).unwrap();

        let store = Arc::new(ArtifactStore::new());
        store.put(generation);
        store
    }

    fn single_record() -> DataFrame {
        df!(
            "Employees" => &[25.0],
            "Years_in_Operation" => &[5.0],
            "Credit_Score" => &[680.0],
            "Annual_Revenue_Year1" => &[110_000.0],
            "Annual_Revenue_Year3" => &[135_000.0],
            "Assets_Year1" => &[55_000.0],
            "Assets_Year3" => &[62_000.0],
            "Loan_Amount_Year3" => &[22_000.0],
            "Industry_Type" => &["Retail"],
            "Business_Type" => &["LLC"],
            "State" => &["TX"],
            "District" => &["North"]
        )
        .unwrap()
    }

    #[test]
    fn test_predict_one() {
        let predictor = Predictor::new(trained_store());
        let prediction = predictor.predict_one(&single_record()).unwrap();
        assert!(prediction.is_finite());
    }

    #[test]
    fn test_predict_one_engineered_matches_raw_path() {
        let predictor = Predictor::new(trained_store());
        let record = single_record();

        let engineered = features::engineer(&record).unwrap();
        let via_raw = predictor.predict_one(&record).unwrap();
        let via_engineered = predictor.predict_one_engineered(&engineered).unwrap();
        assert_eq!(via_raw, via_engineered);
    }

    #[test]
    fn test_predict_without_generation() {
        let predictor = Predictor::new(Arc::new(ArtifactStore::new()));
        assert!(matches!(
            predictor.predict_one(&single_record()),
            Err(GrowthError::ArtifactNotReady)
        ));
    }

    #[test]
    fn test_predict_batch_aligns_with_survivors() {
        let predictor = Predictor::new(trained_store());
        let batch = raw_frame(12).drop("Growth_Rate (%)").unwrap();

        let predictions = predictor.predict_batch(&batch).unwrap();
        assert_eq!(predictions.len(), 12);
        assert!(predictions.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_unknown_category_rejected() {
        let predictor = Predictor::new(trained_store());
        let mut record = single_record();
        record
            .with_column(Series::new("State".into(), &["ZZ"]))
            .unwrap();

        let err = predictor.predict_one(&record).unwrap_err();
        assert!(matches!(
            err,
            GrowthError::UnknownCategory { column, .. } if column == "State"
        ));
    }

    #[test]
    fn test_missing_column_rejected() {
        let predictor = Predictor::new(trained_store());
        let record = single_record().drop("District").unwrap();

        let err = predictor.predict_one(&record).unwrap_err();
        assert!(matches!(err, GrowthError::MissingFeature(cols) if cols == vec!["District"]));
    }

    #[test]
    fn test_degenerate_record_rejected() {
        let predictor = Predictor::new(trained_store());
        let mut record = single_record();
        record
            .with_column(Series::new("Annual_Revenue_Year1".into(), &[0.0]))
            .unwrap();

        assert!(matches!(
            predictor.predict_one(&record),
            Err(GrowthError::DegenerateInput(_))
        ));
    }
}

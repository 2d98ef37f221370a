//! End-to-end training pipeline: engineer, encode, scale, train

use crate::artifact::ArtifactGeneration;
use crate::encoding::CategoryEncoder;
use crate::error::{GrowthError, Result};
use crate::features;
use crate::scaling::StandardScaler;
use crate::schema;
use crate::training::{ForestConfig, Trainer};
use polars::prelude::*;
use tracing::info;

/// Drives a full training event over a raw upload.
///
/// Returns the engineered, label-encoded table (unscaled, for reporting) and
/// the frozen artifact generation produced from it.
#[derive(Debug, Clone, Default)]
pub struct GrowthPipeline {
    config: ForestConfig,
}

impl GrowthPipeline {
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }

    pub fn train(&self, raw: &DataFrame) -> Result<(DataFrame, ArtifactGeneration)> {
        schema::require_columns(raw, &schema::training_columns())?;

        let engineered = features::engineer(raw)?;
        if engineered.height() == 0 {
            return Err(GrowthError::DegenerateInput(
                "no rows survived feature derivation".to_string(),
            ));
        }
        info!(
            raw_rows = raw.height(),
            surviving_rows = engineered.height(),
            "Feature derivation complete"
        );

        let mut encoder = CategoryEncoder::new();
        let encoded = encoder.fit_transform(&engineered, &schema::CATEGORICAL)?;

        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&encoded, &schema::MODEL_FEATURES)?;

        let trainer = Trainer::new(self.config.clone());
        let trained = trainer.train(&scaled, &schema::MODEL_FEATURES, schema::TARGET)?;

        info!(
            rmse = trained.metrics.rmse,
            r2 = trained.metrics.r2,
            n_train = trained.metrics.n_train,
            n_test = trained.metrics.n_test,
            "Training complete"
        );

        let feature_names: Vec<String> =
            schema::MODEL_FEATURES.iter().map(|s| s.to_string()).collect();
        let generation = ArtifactGeneration::new(
            encoder,
            scaler,
            trained.forest,
            trained.metrics,
            feature_names,
        );

        Ok((encoded, generation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_train_full_flow() {
        let raw = raw_frame(30);
        let pipeline = GrowthPipeline::new(ForestConfig::default().with_n_estimators(5));

        let (table, generation) = pipeline.train(&raw).unwrap();
        assert_eq!(table.height(), 30);
        assert!(generation.metrics.rmse.is_finite());
        assert_eq!(generation.feature_names.len(), 10);

        // Categoricals are encoded in the returned table
        assert!(table.column("State").unwrap().i64().is_ok());
        // Derived columns are present
        assert!(table.column("Revenue_Growth_Rate").is_ok());
    }

    #[test]
    fn test_missing_columns_rejected() {
        let raw = raw_frame(10).drop("State").unwrap();
        let pipeline = GrowthPipeline::default();

        let err = pipeline.train(&raw).unwrap_err();
        assert!(matches!(err, GrowthError::MissingFeature(cols) if cols == vec!["State"]));
    }

    #[test]
    fn test_degenerate_when_all_rows_dropped() {
        let mut raw = raw_frame(3);
        let zeros = Series::new(
            "Annual_Revenue_Year1".into(),
            vec![0.0; raw.height()],
        );
        raw.with_column(zeros).unwrap();
        let pipeline = GrowthPipeline::default();

        assert!(matches!(
            pipeline.train(&raw),
            Err(GrowthError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_train_is_deterministic() {
        let raw = raw_frame(30);
        let pipeline = GrowthPipeline::new(ForestConfig::default().with_n_estimators(5));

        let (_, a) = pipeline.train(&raw).unwrap();
        let (_, b) = pipeline.train(&raw).unwrap();
        assert_eq!(a.metrics.rmse, b.metrics.rmse);
        assert_eq!(a.metrics.r2, b.metrics.r2);
    }
}

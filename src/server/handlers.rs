//! HTTP request handlers

use std::io::Cursor;
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
    Json,
};
use polars::prelude::*;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::GrowthError;
use crate::features;
use crate::pipeline::GrowthPipeline;
use crate::schema;

use super::error::{Result, ServerError};
use super::state::{AppState, ProcessedData};

// ============================================================================
// Upload & Training
// ============================================================================

/// Upload a training CSV and run a full training event.
///
/// Replaces the current artifact generation and the stored processed table.
pub async fn upload_data(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>> {
    let (file_name, df) = csv_from_multipart(&mut multipart).await?;
    info!(file = %file_name, rows = df.height(), "Received training upload");

    let raw = df.clone();
    let trained = tokio::task::spawn_blocking(move || {
        let pipeline = GrowthPipeline::default();
        pipeline.train(&raw)
    })
    .await
    .map_err(|e| ServerError::Internal(format!("training task panicked: {e}")))?;
    let (table, generation) = trained?;

    let metrics = generation.metrics.clone();
    let generation_id = generation.id.clone();

    let path = std::path::Path::new(&state.config.models_dir)
        .join(format!("generation-{generation_id}.json"));
    if let Err(e) = generation.save(&path) {
        warn!(path = %path.display(), error = %e, "Failed to persist generation");
    }

    state.artifacts.put(generation);

    // Full-table predictions align with the engineered table because the
    // row-drop rules are identical on both paths.
    let predictions = state.predictor().predict_batch(&df)?;

    let rows = table.height();
    let columns = table.width();
    *state.processed.write().await = Some(ProcessedData { table, predictions });

    Ok(Json(serde_json::json!({
        "message": "Data processed successfully!",
        "generation_id": generation_id,
        "rows": rows,
        "columns": columns,
        "accuracy": {
            "RMSE": metrics.rmse,
            "R2": metrics.r2,
        },
    })))
}

/// Engineered records, their predictions, and the generation's accuracy
pub async fn get_processed_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>> {
    let processed = state.processed.read().await;
    let data = processed
        .as_ref()
        .ok_or_else(|| ServerError::NotFound("No data uploaded yet".to_string()))?;

    let generation = state.artifacts.get().ok_or(GrowthError::ArtifactNotReady)?;

    Ok(Json(serde_json::json!({
        "processed_data": dataframe_records(&data.table),
        "growth_predictions": data.predictions,
        "accuracy": {
            "RMSE": generation.metrics.rmse,
            "R2": generation.metrics.r2,
        },
    })))
}

// ============================================================================
// Reporting
// ============================================================================

pub async fn get_accuracy(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>> {
    let generation = state.artifacts.get().ok_or(GrowthError::ArtifactNotReady)?;

    Ok(Json(serde_json::json!({
        "RMSE": generation.metrics.rmse,
        "R2": generation.metrics.r2,
        "n_train": generation.metrics.n_train,
        "n_test": generation.metrics.n_test,
    })))
}

/// Per-feature importance weights, in model feature order
pub async fn get_feature_importance(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>> {
    let generation = state.artifacts.get().ok_or(GrowthError::ArtifactNotReady)?;

    let importances = generation.forest.feature_importances();
    let entries: Vec<serde_json::Value> = generation
        .feature_names
        .iter()
        .zip(importances.iter())
        .map(|(name, weight)| {
            serde_json::json!({
                "feature": name,
                "importance": weight,
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "feature_importance": entries,
    })))
}

// ============================================================================
// Prediction
// ============================================================================

/// A single raw business record, field names as in the upload schema
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(rename = "Employees")]
    pub employees: f64,
    #[serde(rename = "Years_in_Operation")]
    pub years_in_operation: f64,
    #[serde(rename = "Credit_Score")]
    pub credit_score: f64,
    #[serde(rename = "Annual_Revenue_Year1")]
    pub annual_revenue_year1: f64,
    #[serde(rename = "Annual_Revenue_Year3")]
    pub annual_revenue_year3: f64,
    #[serde(rename = "Assets_Year1")]
    pub assets_year1: f64,
    #[serde(rename = "Assets_Year3")]
    pub assets_year3: f64,
    #[serde(rename = "Loan_Amount_Year3")]
    pub loan_amount_year3: f64,
    #[serde(rename = "Industry_Type")]
    pub industry_type: String,
    #[serde(rename = "Business_Type")]
    pub business_type: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "District")]
    pub district: String,
}

impl PredictRequest {
    fn to_frame(&self) -> Result<DataFrame> {
        let df = df!(
            "Employees" => &[self.employees],
            "Years_in_Operation" => &[self.years_in_operation],
            "Credit_Score" => &[self.credit_score],
            "Annual_Revenue_Year1" => &[self.annual_revenue_year1],
            "Annual_Revenue_Year3" => &[self.annual_revenue_year3],
            "Assets_Year1" => &[self.assets_year1],
            "Assets_Year3" => &[self.assets_year3],
            "Loan_Amount_Year3" => &[self.loan_amount_year3],
            "Industry_Type" => &[self.industry_type.as_str()],
            "Business_Type" => &[self.business_type.as_str()],
            "State" => &[self.state.as_str()],
            "District" => &[self.district.as_str()]
        )?;
        Ok(df)
    }
}

/// Predict the growth rate for one record
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<serde_json::Value>> {
    let record = request.to_frame()?;
    let prediction = state.predictor().predict_one(&record)?;

    Ok(Json(serde_json::json!({
        "prediction": prediction,
    })))
}

/// Predict growth rates for every valid row of an uploaded CSV.
///
/// Reuses the stored generation's encoders and scaler; never refits.
pub async fn predict_batch(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>> {
    let (file_name, df) = csv_from_multipart(&mut multipart).await?;
    info!(file = %file_name, rows = df.height(), "Received batch prediction upload");

    let predictions = state.predictor().predict_batch(&df)?;

    let mut engineered = features::engineer(&df)?;
    engineered.with_column(Series::new(schema::PREDICTED.into(), predictions.clone()))?;

    Ok(Json(serde_json::json!({
        "records": dataframe_records(&engineered),
        "count": predictions.len(),
    })))
}

// ============================================================================
// Export
// ============================================================================

/// Download the processed table with predictions as a CSV attachment
pub async fn export_processed(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse> {
    let processed = state.processed.read().await;
    let data = processed
        .as_ref()
        .ok_or_else(|| ServerError::NotFound("No data uploaded yet".to_string()))?;

    let mut table = data.table.clone();
    table.with_column(Series::new(
        schema::PREDICTED.into(),
        data.predictions.clone(),
    ))?;

    let mut buf = Vec::new();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .finish(&mut table)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"processed_growth_data.csv\"",
            ),
        ],
        buf,
    ))
}

// ============================================================================
// System
// ============================================================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model_loaded": state.artifacts.is_loaded(),
    }))
}

// ============================================================================
// Helpers
// ============================================================================

/// Pull the first file field out of a multipart body and parse it as CSV
async fn csv_from_multipart(multipart: &mut Multipart) -> Result<(String, DataFrame)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(e.to_string()))?
    {
        let file_name = field.file_name().unwrap_or("data.csv").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ServerError::BadRequest(e.to_string()))?;

        info!("Received file: {} ({} bytes)", file_name, data.len());

        if !file_name.ends_with(".csv") {
            return Err(ServerError::BadRequest(
                "Unsupported file format. Upload a CSV file.".to_string(),
            ));
        }

        let df = CsvReadOptions::default()
            .with_infer_schema_length(Some(1000))
            .with_has_header(true)
            .into_reader_with_file_handle(Cursor::new(&data))
            .finish()?;

        return Ok((file_name, df));
    }

    Err(ServerError::BadRequest("No file uploaded".to_string()))
}

/// Convert a DataFrame into an array of JSON records, one object per row
fn dataframe_records(df: &DataFrame) -> Vec<serde_json::Value> {
    let columns = df.get_columns();
    let mut records = Vec::with_capacity(df.height());

    for i in 0..df.height() {
        let mut record = serde_json::Map::with_capacity(columns.len());
        for col in columns {
            let value = match col.get(i) {
                Ok(AnyValue::Float64(v)) if v.is_finite() => serde_json::json!(v),
                Ok(AnyValue::Float64(_)) => serde_json::Value::Null,
                Ok(AnyValue::Float32(v)) => serde_json::json!(v),
                Ok(AnyValue::Int64(v)) => serde_json::json!(v),
                Ok(AnyValue::Int32(v)) => serde_json::json!(v),
                Ok(AnyValue::UInt32(v)) => serde_json::json!(v),
                Ok(AnyValue::String(v)) => serde_json::json!(v),
                Ok(AnyValue::Boolean(v)) => serde_json::json!(v),
                Ok(AnyValue::Null) => serde_json::Value::Null,
                Ok(other) => serde_json::json!(format!("{:?}", other)),
                Err(_) => serde_json::Value::Null,
            };
            record.insert(col.name().to_string(), value);
        }
        records.push(serde_json::Value::Object(record));
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataframe_records_shapes() {
        let df = df!(
            "name" => &["a", "b"],
            "value" => &[1.5, 2.5]
        )
        .unwrap();

        let records = dataframe_records(&df);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["name"], "a");
        assert_eq!(records[1]["value"], 2.5);
    }

    #[test]
    fn test_dataframe_records_null_and_nonfinite() {
        let df = df!(
            "value" => &[Some(1.0), None, Some(f64::NAN)]
        )
        .unwrap();

        let records = dataframe_records(&df);
        assert_eq!(records[0]["value"], 1.0);
        assert_eq!(records[1]["value"], serde_json::Value::Null);
        assert_eq!(records[2]["value"], serde_json::Value::Null);
    }

    #[test]
    fn test_predict_request_to_frame() {
        let request: PredictRequest = serde_json::from_value(serde_json::json!({
            "Employees": 25.0,
            "Years_in_Operation": 5.0,
            "Credit_Score": 680.0,
            "Annual_Revenue_Year1": 110000.0,
            "Annual_Revenue_Year3": 135000.0,
            "Assets_Year1": 55000.0,
            "Assets_Year3": 62000.0,
            "Loan_Amount_Year3": 22000.0,
            "Industry_Type": "Retail",
            "Business_Type": "LLC",
            "State": "TX",
            "District": "North"
        }))
        .unwrap();

        let df = request.to_frame().unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.width(), 12);
    }
}

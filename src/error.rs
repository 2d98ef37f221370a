//! Error types for the growthcast pipeline

use thiserror::Error;

/// Result type alias for growthcast operations
pub type Result<T> = std::result::Result<T, GrowthError>;

/// Main error type for the growthcast pipeline
#[derive(Error, Debug)]
pub enum GrowthError {
    #[error("missing required columns: {}", .0.join(", "))]
    MissingFeature(Vec<String>),

    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("unknown category in column {column}: {value:?}")]
    UnknownCategory { column: String, value: String },

    #[error("no trained model generation available")]
    ArtifactNotReady,

    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    #[error("component not fitted")]
    NotFitted,

    #[error("data error: {0}")]
    Data(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid shape: expected {expected}, got {actual}")]
    Shape { expected: String, actual: String },
}

impl From<polars::error::PolarsError> for GrowthError {
    fn from(err: polars::error::PolarsError) -> Self {
        GrowthError::Data(err.to_string())
    }
}

impl From<serde_json::Error> for GrowthError {
    fn from(err: serde_json::Error) -> Self {
        GrowthError::Serialization(err.to_string())
    }
}

impl From<ndarray::ShapeError> for GrowthError {
    fn from(err: ndarray::ShapeError) -> Self {
        GrowthError::Shape {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

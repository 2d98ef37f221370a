//! Growthcast - business growth rate prediction
//!
//! Ingests tabular business records, derives ratio features, and trains a
//! seeded random-forest regressor to predict annual growth rates. Serves
//! predictions and accuracy reports over a REST API.
//!
//! # Modules
//!
//! ## Data preparation
//! - [`schema`] - Column names and validation
//! - [`features`] - Ratio feature derivation and row filtering
//! - [`encoding`] - Categorical label encoding
//! - [`scaling`] - Standard scaling
//!
//! ## Modeling
//! - [`training`] - Random-forest training and evaluation
//! - [`pipeline`] - End-to-end training pipeline
//! - [`artifact`] - Fitted artifacts and the generation store
//! - [`inference`] - Prediction over frozen generations
//!
//! ## Services
//! - [`server`] - HTTP server with REST API
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Data preparation
pub mod schema;
pub mod features;
pub mod encoding;
pub mod scaling;

// Modeling
pub mod training;
pub mod pipeline;
pub mod artifact;
pub mod inference;

// Services
pub mod server;
pub mod cli;

pub use error::{GrowthError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::artifact::{ArtifactGeneration, ArtifactStore};
    pub use crate::encoding::CategoryEncoder;
    pub use crate::error::{GrowthError, Result};
    pub use crate::inference::Predictor;
    pub use crate::pipeline::GrowthPipeline;
    pub use crate::scaling::StandardScaler;
    pub use crate::training::{EvalMetrics, ForestConfig, RandomForest, Trainer};
}

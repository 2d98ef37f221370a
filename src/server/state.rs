//! Application state shared across handlers

use std::sync::Arc;

use polars::prelude::*;
use tokio::sync::RwLock;

use crate::artifact::ArtifactStore;
use crate::inference::Predictor;

use super::ServerConfig;

/// Output of the most recent training event, kept for reporting and export.
///
/// `predictions` is row-aligned with `table`: both come from the same
/// engineered survivor set.
#[derive(Debug, Clone)]
pub struct ProcessedData {
    pub table: DataFrame,
    pub predictions: Vec<f64>,
}

/// Shared server state: config, the artifact slot, and the last processed
/// table.
pub struct AppState {
    pub config: ServerConfig,
    pub artifacts: Arc<ArtifactStore>,
    pub processed: RwLock<Option<ProcessedData>>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            artifacts: Arc::new(ArtifactStore::new()),
            processed: RwLock::new(None),
        }
    }

    pub fn predictor(&self) -> Predictor {
        Predictor::new(Arc::clone(&self.artifacts))
    }
}

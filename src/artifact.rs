//! Fitted model artifacts and the in-process generation store

use crate::encoding::CategoryEncoder;
use crate::error::Result;
use crate::scaling::StandardScaler;
use crate::training::{EvalMetrics, RandomForest};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Everything a training event produces, frozen together.
///
/// Encoders, scaler, forest, and metrics always come from the same fit;
/// readers see a whole generation or none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactGeneration {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub encoder: CategoryEncoder,
    pub scaler: StandardScaler,
    pub forest: RandomForest,
    pub metrics: EvalMetrics,
    pub feature_names: Vec<String>,
}

impl ArtifactGeneration {
    pub fn new(
        encoder: CategoryEncoder,
        scaler: StandardScaler,
        forest: RandomForest,
        metrics: EvalMetrics,
        feature_names: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string()[..8].to_string(),
            created_at: Utc::now(),
            encoder,
            scaler,
            forest,
            metrics,
            feature_names,
        }
    }

    /// Serialize the whole generation to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a generation from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let generation: Self = serde_json::from_str(&json)?;
        Ok(generation)
    }
}

/// Single-slot store for the current generation.
///
/// `put` replaces unconditionally and atomically; `get` hands out a cheap
/// `Arc` clone so in-flight predictions keep their generation even if a new
/// training event replaces the slot underneath them.
#[derive(Debug, Default)]
pub struct ArtifactStore {
    slot: RwLock<Option<Arc<ArtifactGeneration>>>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    pub fn put(&self, generation: ArtifactGeneration) {
        *self.slot.write() = Some(Arc::new(generation));
    }

    pub fn get(&self) -> Option<Arc<ArtifactGeneration>> {
        self.slot.read().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.read().is_some()
    }
}

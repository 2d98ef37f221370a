//! Forest training: configuration, trees, ensemble, and evaluation

mod config;
mod forest;
mod metrics;
mod trainer;
mod tree;

pub use config::ForestConfig;
pub use forest::RandomForest;
pub use metrics::EvalMetrics;
pub use trainer::{TrainedModel, Trainer};
pub use tree::RegressionTree;

pub(crate) use trainer::columns_to_array2;

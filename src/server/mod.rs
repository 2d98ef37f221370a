//! HTTP serving layer
//!
//! REST API for uploads, training, prediction, and reporting over the
//! in-process artifact store.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use state::{AppState, ProcessedData};

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};

use crate::artifact::{ArtifactGeneration, ArtifactStore};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub models_dir: String,
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            models_dir: std::env::var("MODELS_DIR").unwrap_or_else(|_| "./models".to_string()),
            max_upload_size: std::env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100 * 1024 * 1024), // 100MB
        }
    }
}

/// Start the server with the given configuration
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();
    info!(
        models_dir = %config.models_dir,
        started_at = %start_time.to_rfc3339(),
        "Initializing server directories"
    );

    std::fs::create_dir_all(&config.models_dir)?;

    let state = Arc::new(AppState::new(config.clone()));
    load_latest_generation(&config.models_dir, &state.artifacts);

    let app = create_router(Arc::clone(&state), &config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        host = %config.host,
        port = config.port,
        address = %addr,
        max_upload_size_mb = config.max_upload_size / 1024 / 1024,
        started_at = %start_time.to_rfc3339(),
        "Growthcast server starting"
    );
    info!(url = %format!("http://{}/api", addr), "REST API available");
    info!(url = %format!("http://{}/api/health", addr), "Health endpoint available");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening and ready to accept connections");

    // Graceful shutdown on ctrl+c
    let start_time_for_shutdown = start_time;
    let shutdown_signal = async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        let stop_time = chrono::Utc::now();
        let uptime = stop_time.signed_duration_since(start_time_for_shutdown);
        info!(
            stopped_at = %stop_time.to_rfc3339(),
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    info!("Server started successfully (press ctrl+c to stop)");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

/// Load the newest persisted generation from `models_dir`, if any.
///
/// Best-effort: a missing directory or an unreadable file leaves the slot
/// empty and the server starts anyway.
fn load_latest_generation(models_dir: &str, store: &ArtifactStore) {
    let entries = match std::fs::read_dir(models_dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };

    let mut newest: Option<(std::time::SystemTime, std::path::PathBuf)> = None;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let Ok(modified) = metadata.modified() else {
            continue;
        };
        if newest.as_ref().map_or(true, |(t, _)| modified > *t) {
            newest = Some((modified, path));
        }
    }

    if let Some((_, path)) = newest {
        match ArtifactGeneration::load(&path) {
            Ok(generation) => {
                info!(path = %path.display(), id = %generation.id, "Loaded persisted generation");
                store.put(generation);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load persisted generation");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_size, 100 * 1024 * 1024);
    }

    #[test]
    fn test_load_latest_from_missing_dir() {
        let store = ArtifactStore::new();
        load_latest_generation("/nonexistent/models", &store);
        assert!(!store.is_loaded());
    }
}

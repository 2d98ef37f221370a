//! API route definitions

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::{handlers, state::AppState, ServerConfig};

async fn handle_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": true,
            "message": "Not found. Visit /api/health to check API status.",
        })),
    )
}

async fn handle_405() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "error": true,
            "message": "Method not allowed. Check the API documentation for supported methods.",
        })),
    )
}

/// Create the main application router
pub fn create_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let api_routes = Router::new()
        .route("/upload", post(handlers::upload_data))
        .route("/processed-data", get(handlers::get_processed_data))
        .route("/accuracy", get(handlers::get_accuracy))
        .route("/feature-importance", get(handlers::get_feature_importance))
        .route("/predict", post(handlers::predict))
        .route("/predict/batch", post(handlers::predict_batch))
        .route("/export", get(handlers::export_processed))
        .route("/health", get(handlers::health_check))
        .fallback(handle_404)
        .method_not_allowed_fallback(handle_405);

    // CORS configured via CORS_ORIGIN env var (default: allow all for local-first)
    let cors = match std::env::var("CORS_ORIGIN") {
        Ok(origin) if !origin.is_empty() && origin != "*" => CorsLayer::new()
            .allow_origin(
                origin
                    .parse::<axum::http::HeaderValue>()
                    .unwrap_or_else(|_| axum::http::HeaderValue::from_static("*")),
            )
            .allow_methods(Any)
            .allow_headers(Any),
        _ => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    Router::new()
        .nest("/api", api_routes)
        .fallback(handle_404)
        .method_not_allowed_fallback(handle_405)
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_upload_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

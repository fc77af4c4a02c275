pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod posts;
pub mod rooms;
pub mod users;
pub mod ws;

use std::sync::Arc;

use axum::{extract::FromRef, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use sqlx::SqlitePool;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::auth::provider::IdentityProvider;

pub use crate::error::{ApiError, ApiResult};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub auth_provider: Arc<dyn IdentityProvider>,
}

/// Assembles the full application router. Lives in the library so the
/// integration tests can drive it directly.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/ws", get(ws::connect))
        .merge(auth::router())
        .merge(users::router())
        .merge(rooms::router())
        .merge(posts::router());

    // Mirrors rather than wildcards the request origin so credentialed
    // cross-origin requests still pass.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Router::new().nest("/api/", api).with_state(state).layer(cors)
}

async fn root() -> impl IntoResponse {
    Json(json!({ "message": "i-Recommend API is running" }))
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": models::format_ts(models::now_ms()),
    }))
}

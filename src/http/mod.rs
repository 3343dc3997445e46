//! HTTP surface.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{Config, ProductCatalog};

pub mod auth;
pub mod error;
pub mod products;

// Multipart framing on top of the image itself.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub catalog: ProductCatalog,
    pub config: Arc<Config>,
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_image_bytes + FORM_OVERHEAD_BYTES;
    Router::new()
        .route("/health", get(health))
        .route("/api/config", get(public_config))
        .route("/api/admin/login", post(auth::login))
        .route("/api/products", get(products::list).post(products::create))
        .route("/api/products/meta/categories", get(products::categories))
        .route("/api/products/:id", get(products::get).put(products::update).delete(products::delete))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(s): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let backend = s.catalog.backend();
    match s.catalog.health().await {
        Ok(()) => (StatusCode::OK, Json(json!({"status": "healthy", "service": "storefront-catalog", "backend": backend}))),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"status": "unhealthy", "service": "storefront-catalog", "backend": backend})))
        }
    }
}

/// Public settings the shop page needs to build the checkout redirect.
async fn public_config(State(s): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "whatsappNumber": s.config.whatsapp_number }))
}

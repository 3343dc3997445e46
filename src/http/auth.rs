//! Admin gate: the bearer token must equal the configured admin password.

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts},
    Json,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::CatalogError;

/// Extractor for admin-only handlers. Rejects with 401.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

#[async_trait]
impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = CatalogError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.strip_prefix("Bearer ").unwrap_or(v));
        match token {
            Some(t) if state.config.is_admin_secret(t) => Ok(Self),
            Some(_) => {
                tracing::warn!("admin request with wrong credential");
                Err(CatalogError::Unauthorized)
            }
            None => Err(CatalogError::Unauthorized),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
}

/// Exchanges the admin password for the bearer token the admin page stores.
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Result<Json<LoginResponse>, CatalogError> {
    if !state.config.is_admin_secret(&req.password) {
        return Err(CatalogError::Unauthorized);
    }
    Ok(Json(LoginResponse { success: true, token: req.password }))
}

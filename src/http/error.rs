use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::CatalogError;

impl CatalogError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Storage details stay in the logs.
        let message = match &self {
            Self::Storage(e) => {
                tracing::error!(error = %e, "storage failure");
                "Internal server error".to_string()
            }
            Self::Upstream(e) => {
                tracing::error!(error = %e, "image host failure");
                self.to_string()
            }
            _ => self.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_status_codes() {
        assert_eq!(CatalogError::NotFound(1).into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(CatalogError::Validation("x".into()).into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(CatalogError::Unauthorized.into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(CatalogError::Upstream("x".into()).into_response().status(), StatusCode::BAD_GATEWAY);
        let storage = CatalogError::Storage(StoreError::Corrupt { id: 1, reason: "negative price".into() });
        assert_eq!(storage.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_display() {
        assert_eq!(CatalogError::NotFound(12).to_string(), "product 12 not found");
    }
}

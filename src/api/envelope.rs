//! Consistent response envelope for the command-center API (SPEC_FULL §7).
//!
//! Every response is either `{"success": true, "data": ...}` or
//! `{"success": false, "error": "<message>"}`. There is no nested error
//! object and no nondeterministic metadata — byte-identical query
//! parameters within the dashboard cache TTL must produce byte-identical
//! bodies aside from a `cached` flag (SPEC_FULL §8).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Envelope<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Wrap `data` as a successful `200 OK` response.
pub fn ok<T: Serialize>(data: T) -> Response {
    let body = Envelope { success: true, data: Some(data), error: None };
    (StatusCode::OK, axum::Json(body)).into_response()
}

/// The module-level API error taxonomy (SPEC_FULL §10.2): contract
/// violations (4xx) are distinct from generation/storage failures (5xx).
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    ServiceUnavailable(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Envelope::<()> { success: false, data: None, error: Some(self.to_string()) };
        (self.status(), axum::Json(body)).into_response()
    }
}

impl From<crate::aggregator::AggregatorError> for ApiError {
    fn from(err: crate::aggregator::AggregatorError) -> Self {
        ApiError::ServiceUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn ok_response_has_success_true_and_data() {
        let resp = ok(serde_json::json!({"hello": "world"}));
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["success"], true);
        assert_eq!(v["data"]["hello"], "world");
        assert!(v.get("error").is_none());
    }

    #[tokio::test]
    async fn error_response_has_success_false_and_flat_message() {
        let resp = ApiError::NotFound("truck T-9 unknown".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["success"], false);
        assert_eq!(v["error"], "truck T-9 unknown");
        assert!(v.get("data").is_none());
    }
}

//! The stable HTTP error envelope.

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use statgate_core::ErrorClass;

/// An error leaving the HTTP surface. Every field of the envelope is part
/// of the public contract:
///
/// ```json
/// { "error": "...", "type": "rate_limit", "status_code": 429,
///   "request_id": "a1b2c3d4e5f60718", "retry_after": 2, "details": "..." }
/// ```
#[derive(Debug)]
pub struct ApiError {
    pub class: ErrorClass,
    pub request_id: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(class: ErrorClass, request_id: impl Into<String>) -> Self {
        Self {
            class,
            request_id: request_id.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.class.status_code();
        let mut body = json!({
            "error": self.class.to_string(),
            "type": self.class.kind(),
            "status_code": status_code,
            "request_id": self.request_id,
        });
        if let Some(retry_after) = self.class.retry_after_secs() {
            body["retry_after"] = json!(retry_after);
        }
        if let Some(details) = &self.details {
            body["details"] = json!(details);
        }

        let status =
            StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(body)).into_response();
        if let Ok(value) = HeaderValue::from_str(&self.request_id) {
            response.headers_mut().insert("x-request-id", value);
        }
        response
    }
}

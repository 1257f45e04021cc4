//! JSON error bodies returned by the handlers.

use axum::{Json, http::StatusCode};
use serde_json::{Value, json};

use crate::errors::UpstreamError;

pub(crate) type ErrorResponse = (StatusCode, Json<Value>);

pub(crate) const MISSING_CODE: &str = "Missing authorization code";
pub(crate) const EXCHANGE_FAILED: &str = "Failed to exchange code";
pub(crate) const REFRESH_FAILED: &str = "Failed to refresh token";
pub(crate) const NO_REFRESH_TOKEN: &str = "No refresh token stored";
pub(crate) const PERSIST_FAILED: &str = "Failed to persist refresh token";
pub(crate) const INTERNAL_ERROR: &str = "Internal server error";

pub(crate) fn error_response(status: StatusCode, error: &str) -> ErrorResponse {
    (status, Json(json!({ "error": error })))
}

/// Pass the provider's status and details through to the caller.
pub(crate) fn upstream_error_response(error: &str, upstream: UpstreamError) -> ErrorResponse {
    (
        upstream.status_code,
        Json(json!({
            "error": error,
            "details": upstream.details,
        })),
    )
}

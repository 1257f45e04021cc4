//! Handles GET /refresh - Derives a fresh access token from the stored refresh token

use axum::{Json, extract::State, http::StatusCode};

use super::context::AppState;
use super::utils_response::{
    ErrorResponse, NO_REFRESH_TOKEN, REFRESH_FAILED, error_response, upstream_error_response,
};
use crate::oauth::AccessTokenResponse;

/// Handle access token refresh
/// GET /refresh - Returns `{access_token, expires_in}`; never modifies the stored credential
pub async fn handle_refresh(
    State(state): State<AppState>,
) -> Result<Json<AccessTokenResponse>, ErrorResponse> {
    let record = match state.credential_store.get_credential().await {
        Ok(Some(record)) if !record.refresh_token.is_empty() => record,
        Ok(_) => {
            tracing::debug!("refresh requested before any refresh token was stored");
            return Err(error_response(StatusCode::BAD_REQUEST, NO_REFRESH_TOKEN));
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to read stored credential");
            return Err(error_response(StatusCode::BAD_REQUEST, NO_REFRESH_TOKEN));
        }
    };

    let grant = state.refresh_grant(record.refresh_token);

    match state.upstream.exchange(grant.into()).await {
        Ok(result) => {
            if result.refresh_token.is_some() {
                tracing::debug!("ignoring refresh token returned by refresh grant");
            }
            Ok(Json(result.into()))
        }
        Err(e) => Err(upstream_error_response(REFRESH_FAILED, e)),
    }
}

//! Handles POST /auth - Exchanges an authorization code and stores the issued refresh token

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;

use super::context::AppState;
use super::utils_response::{
    EXCHANGE_FAILED, ErrorResponse, INTERNAL_ERROR, MISSING_CODE, PERSIST_FAILED, error_response,
    upstream_error_response,
};
use crate::errors::{StorageError, UpstreamError};
use crate::oauth::{AccessTokenResponse, TokenExchangeResult};
use crate::storage::CredentialRecord;

/// Body of POST /auth
#[derive(Debug, Default, Deserialize)]
pub struct AuthRequest {
    #[serde(default)]
    pub code: Option<String>,
    /// Accepted and recorded with the credential; does not select a storage slot.
    #[serde(default)]
    pub user_id: Option<String>,
}

enum ExchangeFailure {
    Upstream(UpstreamError),
    Store(StorageError),
}

/// Handle authorization code exchange
/// POST /auth - Returns `{access_token, expires_in}`; the refresh token stays server-side
pub async fn handle_auth(
    State(state): State<AppState>,
    payload: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Json<AccessTokenResponse>, ErrorResponse> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable auth request body");
            AuthRequest::default()
        }
    };

    let code = match request.code {
        Some(code) if !code.is_empty() => code,
        _ => return Err(error_response(StatusCode::BAD_REQUEST, MISSING_CODE)),
    };

    let grant = state.authorization_code_grant(code);
    let user_id = request.user_id;

    // Tracked so neither a disconnecting caller nor shutdown cancels a started exchange or write
    let tracker = state.task_tracker.clone();
    let task = tracker.spawn(async move {
        let result = state
            .upstream
            .exchange(grant.into())
            .await
            .map_err(ExchangeFailure::Upstream)?;
        persist_refresh_token(&state, &result, user_id)
            .await
            .map_err(ExchangeFailure::Store)?;
        Ok::<_, ExchangeFailure>(result)
    });

    match task.await {
        Ok(Ok(result)) => Ok(Json(result.into())),
        Ok(Err(ExchangeFailure::Upstream(e))) => Err(upstream_error_response(EXCHANGE_FAILED, e)),
        Ok(Err(ExchangeFailure::Store(e))) => {
            tracing::error!(error = %e, "failed to persist refresh token");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                PERSIST_FAILED,
            ))
        }
        Err(e) => {
            tracing::error!(error = %e, "authorization code exchange task failed");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_ERROR,
            ))
        }
    }
}

async fn persist_refresh_token(
    state: &AppState,
    result: &TokenExchangeResult,
    user_id: Option<String>,
) -> Result<(), StorageError> {
    let Some(refresh_token) = result.refresh_token.as_deref().filter(|t| !t.is_empty()) else {
        tracing::info!("provider issued no refresh token, keeping stored credential");
        return Ok(());
    };

    let record = CredentialRecord::new(refresh_token, user_id);
    state.credential_store.put_credential(&record).await?;
    tracing::info!(user_id = ?record.user_id, "stored refresh token");
    Ok(())
}

//! Client for the identity provider's token endpoint.

use async_trait::async_trait;
use http::header::ACCEPT;
use url::Url;

use super::types::{TokenExchangeResult, TokenGrant};
use crate::errors::UpstreamError;

/// Performs a single grant exchange against the provider.
///
/// Implementations send exactly one request per call and never retry: an authorization
/// code is single-use, so a second attempt could only fail.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn exchange(&self, grant: TokenGrant) -> Result<TokenExchangeResult, UpstreamError>;
}

/// [`UpstreamClient`] backed by a shared `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestUpstreamClient {
    http_client: reqwest::Client,
    token_endpoint: Url,
}

impl ReqwestUpstreamClient {
    pub fn new(http_client: reqwest::Client, token_endpoint: Url) -> Self {
        Self {
            http_client,
            token_endpoint,
        }
    }

    pub fn token_endpoint(&self) -> &Url {
        &self.token_endpoint
    }
}

#[async_trait]
impl UpstreamClient for ReqwestUpstreamClient {
    async fn exchange(&self, grant: TokenGrant) -> Result<TokenExchangeResult, UpstreamError> {
        let grant_type = grant.grant_type();

        let response = self
            .http_client
            .post(self.token_endpoint.clone())
            .header(ACCEPT, "application/json")
            .form(&grant)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(%grant_type, error = %e, "token endpoint request failed");
                UpstreamError::transport(e)
            })?;

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if status.is_success() => {
                tracing::warn!(%grant_type, %status, error = %e, "failed to read token response");
                return Err(UpstreamError::transport(format!(
                    "failed to read response body: {}",
                    e
                )));
            }
            Err(e) => {
                tracing::warn!(%grant_type, %status, error = %e, "failed to read error response");
                String::new()
            }
        };

        if !status.is_success() {
            let error = UpstreamError::from_response_body(status, &body);
            tracing::warn!(%grant_type, %status, details = %error.details, "token endpoint rejected grant");
            return Err(error);
        }

        let result = serde_json::from_str::<TokenExchangeResult>(&body).map_err(|e| {
            tracing::warn!(%grant_type, %status, error = %e, "token endpoint returned an unexpected body");
            UpstreamError::malformed_success(&body, e)
        })?;

        tracing::debug!(
            %grant_type,
            expires_in = result.expires_in,
            refresh_token_issued = result.refresh_token.is_some(),
            "token exchange succeeded"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::types::{AuthorizationCodeGrant, RefreshGrant};
    use axum::{Form, Router, http::StatusCode, response::IntoResponse, routing::post};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    type Captured = Arc<Mutex<Vec<HashMap<String, String>>>>;

    /// Stub provider keyed on the submitted code or refresh token.
    async fn spawn_provider() -> (Url, Captured) {
        let captured: Captured = Arc::default();
        let inner = captured.clone();

        let router = Router::new().route(
            "/token",
            post(move |Form(form): Form<HashMap<String, String>>| {
                let inner = inner.clone();
                async move {
                    inner.lock().unwrap().push(form.clone());
                    let key = form
                        .get("code")
                        .or_else(|| form.get("refresh_token"))
                        .cloned()
                        .unwrap_or_default();
                    match key.as_str() {
                        "abc123" => axum::Json(json!({
                            "access_token": "AT1",
                            "expires_in": 3600,
                            "refresh_token": "RT1",
                            "token_type": "Bearer"
                        }))
                        .into_response(),
                        "RT1" => axum::Json(json!({
                            "access_token": "AT2",
                            "expires_in": 3600
                        }))
                        .into_response(),
                        "used" => (
                            StatusCode::BAD_REQUEST,
                            axum::Json(json!({"error": "invalid_grant"})),
                        )
                            .into_response(),
                        "garbage" => (StatusCode::BAD_REQUEST, "Bad Request!").into_response(),
                        "empty" => StatusCode::UNAUTHORIZED.into_response(),
                        _ => (StatusCode::OK, "ok").into_response(),
                    }
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        (
            Url::parse(&format!("http://{}/token", addr)).unwrap(),
            captured,
        )
    }

    fn client(endpoint: Url) -> ReqwestUpstreamClient {
        let http_client = reqwest::Client::builder().no_proxy().build().unwrap();
        ReqwestUpstreamClient::new(http_client, endpoint)
    }

    fn code_grant(code: &str) -> TokenGrant {
        AuthorizationCodeGrant {
            code: code.to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "https://app.example.com/callback".to_string(),
        }
        .into()
    }

    #[tokio::test]
    async fn test_authorization_code_exchange() {
        let (endpoint, captured) = spawn_provider().await;
        let result = client(endpoint).exchange(code_grant("abc123")).await.unwrap();

        assert_eq!(result.access_token, "AT1");
        assert_eq!(result.expires_in, 3600);
        assert_eq!(result.refresh_token.as_deref(), Some("RT1"));

        let requests = captured.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0]["grant_type"], "authorization_code");
        assert_eq!(requests[0]["client_secret"], "secret");
        assert_eq!(requests[0]["redirect_uri"], "https://app.example.com/callback");
    }

    #[tokio::test]
    async fn test_refresh_exchange() {
        let (endpoint, captured) = spawn_provider().await;
        let grant = RefreshGrant {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            refresh_token: "RT1".to_string(),
        };
        let result = client(endpoint).exchange(grant.into()).await.unwrap();

        assert_eq!(result.access_token, "AT2");
        assert_eq!(result.refresh_token, None);
        assert_eq!(captured.lock().unwrap()[0]["grant_type"], "refresh_token");
    }

    #[tokio::test]
    async fn test_structured_rejection() {
        let (endpoint, captured) = spawn_provider().await;
        let error = client(endpoint).exchange(code_grant("used")).await.unwrap_err();

        assert_eq!(error.status_code, StatusCode::BAD_REQUEST);
        assert_eq!(error.details, json!({"error": "invalid_grant"}));
        // no retry
        assert_eq!(captured.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unparsable_rejection_keeps_raw_text() {
        let (endpoint, _) = spawn_provider().await;
        let error = client(endpoint).exchange(code_grant("garbage")).await.unwrap_err();

        assert_eq!(error.status_code, StatusCode::BAD_REQUEST);
        assert_eq!(error.details, json!("Bad Request!"));
    }

    #[tokio::test]
    async fn test_empty_rejection_is_described() {
        let (endpoint, _) = spawn_provider().await;
        let error = client(endpoint).exchange(code_grant("empty")).await.unwrap_err();

        assert_eq!(error.status_code, StatusCode::UNAUTHORIZED);
        assert!(error.details.as_str().unwrap().contains("empty response body"));
    }

    #[tokio::test]
    async fn test_malformed_success_is_bad_gateway() {
        let (endpoint, _) = spawn_provider().await;
        let error = client(endpoint).exchange(code_grant("other")).await.unwrap_err();

        assert_eq!(error.status_code, StatusCode::BAD_GATEWAY);
        assert_eq!(error.details["body"], json!("ok"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_bad_gateway() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let endpoint = Url::parse(&format!("http://{}/token", addr)).unwrap();
        let error = client(endpoint).exchange(code_grant("abc123")).await.unwrap_err();

        assert_eq!(error.status_code, StatusCode::BAD_GATEWAY);
        assert!(
            error
                .details
                .as_str()
                .unwrap()
                .starts_with("token endpoint request failed")
        );
    }
}

//! Application state shared by the request handlers.

use std::sync::Arc;
use tokio_util::task::TaskTracker;

use crate::config::Config;
use crate::oauth::{AuthorizationCodeGrant, RefreshGrant, UpstreamClient};
use crate::storage::CredentialStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Client for the provider's token endpoint
    pub upstream: Arc<dyn UpstreamClient>,
    /// Owner of the stored refresh token
    pub credential_store: Arc<dyn CredentialStore>,
    /// Exchange tasks that shutdown waits on
    pub task_tracker: TaskTracker,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        upstream: Arc<dyn UpstreamClient>,
        credential_store: Arc<dyn CredentialStore>,
        task_tracker: TaskTracker,
    ) -> Self {
        Self {
            config,
            upstream,
            credential_store,
            task_tracker,
        }
    }

    /// Build the code exchange grant from the configured client registration.
    pub fn authorization_code_grant(&self, code: String) -> AuthorizationCodeGrant {
        AuthorizationCodeGrant {
            code,
            client_id: self.config.client_id.clone(),
            client_secret: self.config.client_secret.expose().to_string(),
            redirect_uri: self.config.redirect_uri.as_ref().to_string(),
        }
    }

    /// Build the refresh grant from the configured client registration.
    pub fn refresh_grant(&self, refresh_token: String) -> RefreshGrant {
        RefreshGrant {
            client_id: self.config.client_id.clone(),
            client_secret: self.config.client_secret.expose().to_string(),
            refresh_token,
        }
    }
}

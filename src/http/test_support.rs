//! Shared fixtures for handler and router tests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio_util::task::TaskTracker;

use super::context::AppState;
use crate::config::Config;
use crate::errors::{StorageError, UpstreamError};
use crate::oauth::{TokenExchangeResult, TokenGrant, UpstreamClient};
use crate::storage::{CredentialRecord, CredentialStore, MemoryCredentialStore};

/// Upstream client that replays scripted responses and records every grant.
#[derive(Default)]
pub(crate) struct ScriptedUpstream {
    responses: Mutex<VecDeque<Result<TokenExchangeResult, UpstreamError>>>,
    grants: Mutex<Vec<TokenGrant>>,
}

impl ScriptedUpstream {
    pub(crate) fn with_responses(
        responses: Vec<Result<TokenExchangeResult, UpstreamError>>,
    ) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            grants: Mutex::default(),
        }
    }

    pub(crate) fn grants(&self) -> Vec<TokenGrant> {
        self.grants.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpstreamClient for ScriptedUpstream {
    async fn exchange(&self, grant: TokenGrant) -> Result<TokenExchangeResult, UpstreamError> {
        self.grants.lock().unwrap().push(grant);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(UpstreamError::transport("no scripted response")))
    }
}

/// Store whose medium is always unavailable.
pub(crate) struct UnavailableStore;

#[async_trait]
impl CredentialStore for UnavailableStore {
    async fn put_credential(&self, _record: &CredentialRecord) -> Result<(), StorageError> {
        Err(StorageError::ConnectionFailed("disk on fire".to_string()))
    }

    async fn get_credential(&self) -> Result<Option<CredentialRecord>, StorageError> {
        Err(StorageError::ConnectionFailed("disk on fire".to_string()))
    }
}

pub(crate) fn token_result(
    access_token: &str,
    refresh_token: Option<&str>,
) -> TokenExchangeResult {
    TokenExchangeResult {
        access_token: access_token.to_string(),
        expires_in: 3600,
        refresh_token: refresh_token.map(str::to_string),
        token_type: Some("Bearer".to_string()),
        scope: None,
    }
}

pub(crate) fn test_config(extra: &[(&str, &str)]) -> Arc<Config> {
    let mut vars: HashMap<String, String> = [
        ("CLIENT_ID", "client-123"),
        ("CLIENT_SECRET", "secret-456"),
        ("REDIRECT_URI", "https://app.example.com/callback"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }

    Arc::new(Config::from_lookup(|name| vars.get(name).cloned()).unwrap())
}

pub(crate) fn test_state(
    upstream: Arc<ScriptedUpstream>,
    store: Arc<dyn CredentialStore>,
) -> AppState {
    AppState::new(test_config(&[]), upstream, store, TaskTracker::new())
}

pub(crate) fn memory_store() -> Arc<MemoryCredentialStore> {
    Arc::new(MemoryCredentialStore::new())
}

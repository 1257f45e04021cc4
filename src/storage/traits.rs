//! Storage trait definitions for the broker's credential record.

use crate::errors::StorageError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, StorageError>;

/// Identifier of the single credential slot.
pub const CREDENTIAL_SLOT_ID: &str = "default";

/// The persisted refresh token.
///
/// `user_id` is informational only: every write replaces the one slot regardless of it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub refresh_token: String,
    pub user_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl CredentialRecord {
    pub fn new(refresh_token: impl Into<String>, user_id: Option<String>) -> Self {
        Self {
            refresh_token: refresh_token.into(),
            user_id,
            updated_at: Utc::now(),
        }
    }
}

impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("refresh_token", &"[redacted]")
            .field("user_id", &self.user_id)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Single-slot durable storage for the refresh token.
///
/// A `put` replaces the record wholesale and a concurrent `get` observes either the
/// previous record or the new one, never a mix.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist `record` as the only credential, replacing any existing one
    async fn put_credential(&self, record: &CredentialRecord) -> Result<()>;

    /// Retrieve the current credential, if one has been stored
    async fn get_credential(&self) -> Result<Option<CredentialRecord>>;
}

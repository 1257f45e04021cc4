//! In-memory credential storage
//!
//! Holds the record in process memory only. Used as a test double; it is not
//! selectable through configuration because it does not survive a restart.

use crate::errors::StorageError;
use crate::storage::traits::{CredentialRecord, CredentialStore, Result};
use async_trait::async_trait;
use std::sync::RwLock;

/// In-memory credential store (for testing)
#[derive(Default)]
pub struct MemoryCredentialStore {
    record: RwLock<Option<CredentialRecord>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `record`.
    pub fn with_record(record: CredentialRecord) -> Self {
        Self {
            record: RwLock::new(Some(record)),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn put_credential(&self, record: &CredentialRecord) -> Result<()> {
        let mut slot = self.record.write().map_err(|e| {
            StorageError::ConnectionFailed(format!("Failed to acquire credential lock: {}", e))
        })?;
        *slot = Some(record.clone());
        Ok(())
    }

    async fn get_credential(&self) -> Result<Option<CredentialRecord>> {
        let slot = self.record.read().map_err(|e| {
            StorageError::ConnectionFailed(format!("Failed to acquire credential lock: {}", e))
        })?;
        Ok(slot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_store_returns_none() {
        let store = MemoryCredentialStore::new();
        assert!(store.get_credential().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_replaces_previous_record() {
        let store = MemoryCredentialStore::new();
        store
            .put_credential(&CredentialRecord::new("T1", None))
            .await
            .unwrap();
        store
            .put_credential(&CredentialRecord::new("T2", Some("user-1".to_string())))
            .await
            .unwrap();

        let record = store.get_credential().await.unwrap().unwrap();
        assert_eq!(record.refresh_token, "T2");
        assert_eq!(record.user_id.as_deref(), Some("user-1"));
    }
}

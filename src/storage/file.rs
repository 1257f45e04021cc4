//! JSON file credential storage
//!
//! The record lives in a single JSON document. Writes go to a sibling temporary
//! file which is flushed to disk and then renamed over the document, so a reader
//! only ever opens a complete old or complete new document.

use crate::errors::StorageError;
use crate::storage::traits::{CredentialRecord, CredentialStore, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

#[derive(Default, Serialize, Deserialize)]
struct CredentialDocument {
    credential: Option<CredentialRecord>,
}

/// File-backed credential store
pub struct FileCredentialStore {
    path: PathBuf,
    temp_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    /// Open the store at `path`, creating the parent directory and an empty document if
    /// neither exists yet. An existing document is left untouched.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file_name = path.file_name().ok_or_else(|| {
            StorageError::InvalidData(format!("{} is not a file path", path.display()))
        })?;
        let mut temp_name = file_name.to_os_string();
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);

        let store = Self {
            path,
            temp_path,
            write_lock: Mutex::new(()),
        };
        store.initialize().await?;
        Ok(store)
    }

    async fn initialize(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Io(parent.display().to_string(), e))?;
        }

        let _guard = self.write_lock.lock().await;
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        if exists {
            tracing::debug!(path = %self.path.display(), "using existing credential file");
            return Ok(());
        }

        tracing::info!(path = %self.path.display(), "creating credential file");
        self.write_document(&CredentialDocument::default()).await
    }

    /// Callers must hold `write_lock`.
    async fn write_document(&self, document: &CredentialDocument) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(document)
            .map_err(|e| StorageError::SerializationFailed(e.to_string()))?;

        let mut file = tokio::fs::File::create(&self.temp_path)
            .await
            .map_err(|e| self.temp_io_error(e))?;
        file.write_all(&bytes)
            .await
            .map_err(|e| self.temp_io_error(e))?;
        file.sync_all().await.map_err(|e| self.temp_io_error(e))?;
        drop(file);

        tokio::fs::rename(&self.temp_path, &self.path)
            .await
            .map_err(|e| self.io_error(e))
    }

    fn io_error(&self, error: std::io::Error) -> StorageError {
        StorageError::Io(self.path.display().to_string(), error)
    }

    fn temp_io_error(&self, error: std::io::Error) -> StorageError {
        StorageError::Io(self.temp_path.display().to_string(), error)
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn put_credential(&self, record: &CredentialRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write_document(&CredentialDocument {
            credential: Some(record.clone()),
        })
        .await
    }

    async fn get_credential(&self) -> Result<Option<CredentialRecord>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "credential file not found");
                return Ok(None);
            }
            Err(e) => return Err(self.io_error(e)),
        };

        match serde_json::from_slice::<CredentialDocument>(&bytes) {
            Ok(document) => Ok(document.credential),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "credential file is corrupt");
                Ok(None)
            }
        }
    }
}

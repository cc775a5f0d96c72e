//! # JSON File Settings Store
//!
//! Settings persisted as one pretty-printed JSON object, the same key/value
//! shape `chrome.storage.local` holds. Reads come from an in-memory working
//! copy; every effective write rewrites the file.

use async_channel::Receiver;
use async_trait::async_trait;
use lib_core::model::store::{MemoryStore, SettingsChange, SettingsMap, SettingsStore};
use lib_core::{AppError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct JsonFileStore {
    path: PathBuf,
    memory: MemoryStore,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store; the file is
    /// created on the first write.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match tokio::fs::read_to_string(&path).await {
            Ok(source) => serde_json::from_str::<SettingsMap>(&source).map_err(|e| {
                AppError::Decoding(format!("Settings file {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No settings file yet");
                SettingsMap::new()
            }
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        Ok(Self {
            path,
            memory: MemoryStore::with_values(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.memory.snapshot())?;
        tokio::fs::write(&self.path, json + "\n")
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", self.path.display(), e)))?;
        debug!(path = %self.path.display(), "Settings file written");
        Ok(())
    }
}

#[async_trait(?Send)]
impl SettingsStore for JsonFileStore {
    async fn get_all(&self) -> Result<SettingsMap> {
        self.memory.get_all().await
    }

    async fn set(&self, values: SettingsMap) -> Result<()> {
        let changed = self.memory.merge(values);
        if changed.is_empty() && self.path.exists() {
            return Ok(());
        }
        self.persist().await
    }

    fn subscribe(&self) -> Receiver<SettingsChange> {
        self.memory.subscribe()
    }
}

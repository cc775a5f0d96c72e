//! # Settings Store
//!
//! Flat key-value persistence for [`Settings`], shared by the popup and the
//! content script.
//!
//! - [`SettingsStore`] - async get / merge-set / change subscription
//! - [`MemoryStore`] - in-process implementation
//! - [`install_defaults`] - first-install initialization
//!
//! Frontends provide their own backends: `chrome.storage.local` in the
//! extension and a JSON file in the preview tool.

// region: --- Modules
pub mod memory;
// endregion: --- Modules

// region: --- Re-exports
pub use memory::MemoryStore;
// endregion: --- Re-exports

// region: --- Types and Functions
use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use shared::dto::settings::Settings;
use std::str::FromStr;

/// Raw store snapshot: setting key to JSON value.
pub type SettingsMap = Map<String, Value>;

/// Keys whose values changed in one write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsChange {
    pub keys: Vec<String>,
}

/// Async key-value settings persistence.
///
/// Writes merge into the existing values; keys not named in a write keep their
/// previous value. Subscribers receive one [`SettingsChange`] per write that
/// changed at least one value, including writes made by other contexts.
#[async_trait(?Send)]
pub trait SettingsStore {
    /// Snapshot of every stored key.
    async fn get_all(&self) -> Result<SettingsMap>;

    /// Merge `values` into the store.
    async fn set(&self, values: SettingsMap) -> Result<()>;

    /// Channel receiving a notification after every effective write.
    fn subscribe(&self) -> async_channel::Receiver<SettingsChange>;

    /// Current settings; unset keys read as their type default.
    async fn settings(&self) -> Result<Settings> {
        let map = self.get_all().await?;
        Settings::from_map(&map).map_err(|e| AppError::Decoding(format!("Stored settings: {}", e)))
    }

    /// Merge a single key.
    async fn set_value(&self, key: &str, value: Value) -> Result<()> {
        let mut values = SettingsMap::new();
        values.insert(key.to_string(), value);
        self.set(values).await
    }
}

/// Why the extension's install handler ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallReason {
    Install,
    Update,
    BrowserUpdate,
    SharedModuleUpdate,
}

impl FromStr for InstallReason {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "install" => Ok(InstallReason::Install),
            "update" => Ok(InstallReason::Update),
            "chrome_update" | "browser_update" => Ok(InstallReason::BrowserUpdate),
            "shared_module_update" => Ok(InstallReason::SharedModuleUpdate),
            other => Err(AppError::Config(format!("Unknown install reason '{}'", other))),
        }
    }
}

/// Write the default settings on first install.
///
/// Updates leave existing settings untouched. Returns whether anything was
/// written.
pub async fn install_defaults<S>(store: &S, reason: InstallReason) -> Result<bool>
where
    S: SettingsStore + ?Sized,
{
    if reason != InstallReason::Install {
        tracing::debug!(?reason, "Keeping existing settings");
        return Ok(false);
    }

    store.set(Settings::install_defaults().to_map()).await?;
    tracing::info!("Default settings written");
    Ok(true)
}
// endregion: --- Types and Functions

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_install_writes_defaults() {
        let store = MemoryStore::new();
        assert!(install_defaults(&store, InstallReason::Install).await.unwrap());

        let settings = store.settings().await.unwrap();
        assert_eq!(settings, Settings::install_defaults());
    }

    #[tokio::test]
    async fn test_update_keeps_existing_settings() {
        let store = MemoryStore::new();
        store.set_value("currency", json!("USD")).await.unwrap();

        assert!(!install_defaults(&store, InstallReason::Update).await.unwrap());
        assert_eq!(store.get_all().await.unwrap().len(), 1);
        assert_eq!(store.settings().await.unwrap().currency, "USD");
    }

    #[test]
    fn test_install_reason_from_str() {
        assert_eq!("install".parse::<InstallReason>().unwrap(), InstallReason::Install);
        assert_eq!(
            "chrome_update".parse::<InstallReason>().unwrap(),
            InstallReason::BrowserUpdate
        );
        assert!("reinstall".parse::<InstallReason>().is_err());
    }

    #[tokio::test]
    async fn test_malformed_settings_are_a_decoding_error() {
        let store = MemoryStore::new();
        store.set_value("sortBy", json!("popularity")).await.unwrap();
        assert!(matches!(store.settings().await, Err(AppError::Decoding(_))));
    }
}

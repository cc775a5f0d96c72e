//! In-process settings store.

use super::{SettingsChange, SettingsMap, SettingsStore};
use crate::error::Result;
use async_channel::{Receiver, Sender};
use async_trait::async_trait;
use parking_lot::Mutex;

/// Settings held in memory.
///
/// Used by tests and as the working copy behind file-backed stores.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<SettingsMap>,
    subscribers: Mutex<Vec<Sender<SettingsChange>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with `values`.
    pub fn with_values(values: SettingsMap) -> Self {
        Self {
            values: Mutex::new(values),
            subscribers: Mutex::default(),
        }
    }

    /// Copy of the current values.
    pub fn snapshot(&self) -> SettingsMap {
        self.values.lock().clone()
    }

    /// Merge `values` and notify subscribers; returns the changed keys.
    pub fn merge(&self, values: SettingsMap) -> Vec<String> {
        let mut changed = Vec::new();
        {
            let mut current = self.values.lock();
            for (key, value) in values {
                if current.get(&key) != Some(&value) {
                    changed.push(key.clone());
                    current.insert(key, value);
                }
            }
        }

        if !changed.is_empty() {
            self.notify(SettingsChange {
                keys: changed.clone(),
            });
        }
        changed
    }

    fn notify(&self, change: SettingsChange) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|sender| sender.try_send(change.clone()).is_ok());
        tracing::trace!(keys = ?change.keys, subscribers = subscribers.len(), "Settings changed");
    }
}

#[async_trait(?Send)]
impl SettingsStore for MemoryStore {
    async fn get_all(&self) -> Result<SettingsMap> {
        Ok(self.snapshot())
    }

    async fn set(&self, values: SettingsMap) -> Result<()> {
        self.merge(values);
        Ok(())
    }

    fn subscribe(&self) -> Receiver<SettingsChange> {
        let (sender, receiver) = async_channel::unbounded();
        self.subscribers.lock().push(sender);
        receiver
    }
}

//! # chrome.storage Adapter
//!
//! [`ChromeStorage`] backs the engine's `SettingsStore` with
//! `chrome.storage.local`. Change notifications come from
//! `chrome.storage.onChanged`, so writes made by the popup reach every open
//! content script.

use async_channel::{Receiver, Sender};
use async_trait::async_trait;
use lib_core::model::store::{SettingsChange, SettingsMap, SettingsStore};
use lib_core::{AppError, Result};
use parking_lot::Mutex;
use serde::Serialize;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(inline_js = "
export function storageGet() {
    return chrome.storage.local.get(null);
}

export function storageSet(values) {
    return chrome.storage.local.set(values);
}

export function onStorageChanged(callback) {
    chrome.storage.onChanged.addListener((changes, area) => {
        if (area === 'local') {
            callback(Object.keys(changes));
        }
    });
}

export function extensionUrl(path) {
    return chrome.runtime.getURL(path);
}
")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn storageGet() -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn storageSet(values: JsValue) -> std::result::Result<JsValue, JsValue>;

    fn onStorageChanged(callback: &Closure<dyn FnMut(JsValue)>);

    fn extensionUrl(path: &str) -> String;
}

/// Absolute URL of a file bundled with the extension.
pub fn extension_url(path: &str) -> String {
    extensionUrl(path)
}

type Subscribers = Rc<Mutex<Vec<Sender<SettingsChange>>>>;

/// `chrome.storage.local` settings store.
pub struct ChromeStorage {
    subscribers: Subscribers,
}

impl ChromeStorage {
    /// Create the store and start listening for storage changes.
    pub fn new() -> Self {
        let subscribers: Subscribers = Rc::default();

        let listeners = Rc::clone(&subscribers);
        let on_changed = Closure::<dyn FnMut(JsValue)>::new(move |keys: JsValue| {
            let keys: Vec<String> = match serde_wasm_bindgen::from_value(keys) {
                Ok(keys) => keys,
                Err(e) => {
                    log::warn!("Unreadable storage change: {}", e);
                    return;
                }
            };
            let change = SettingsChange { keys };
            listeners
                .lock()
                .retain(|sender| sender.try_send(change.clone()).is_ok());
        });
        onStorageChanged(&on_changed);
        on_changed.forget();

        Self { subscribers }
    }
}

impl Default for ChromeStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn storage_error(e: JsValue) -> AppError {
    AppError::Storage(format!("{:?}", e))
}

#[async_trait(?Send)]
impl SettingsStore for ChromeStorage {
    async fn get_all(&self) -> Result<SettingsMap> {
        let values = storageGet().await.map_err(storage_error)?;
        serde_wasm_bindgen::from_value(values)
            .map_err(|e| AppError::Decoding(format!("Stored settings: {}", e)))
    }

    async fn set(&self, values: SettingsMap) -> Result<()> {
        // Plain objects, not JS `Map`s, so chrome.storage keeps the keys
        let values = values
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| AppError::Decoding(format!("Settings to store: {}", e)))?;
        storageSet(values).await.map_err(storage_error)?;
        Ok(())
    }

    fn subscribe(&self) -> Receiver<SettingsChange> {
        let (sender, receiver) = async_channel::unbounded();
        self.subscribers.lock().push(sender);
        receiver
    }
}

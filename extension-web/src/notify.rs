//! In-page toasts and the consent dialog.

use async_trait::async_trait;
use gloo_timers::callback::Timeout;
use lib_core::model::page::MARKER_ATTRIBUTE;
use lib_core::notify::{Consent, Notice, Notifier};
use wasm_bindgen::JsValue;
use web_sys::Document;

/// How long a toast stays on screen.
const TOAST_MILLIS: u32 = 8_000;

const TOAST_STYLE: &str = "position: fixed; top: 1rem; right: 1rem; z-index: 2147483647; \
max-width: 24rem; padding: 0.75rem 1rem; border-radius: 4px; \
background: #c0392b; color: #fff; font: 14px/1.4 sans-serif; white-space: pre-line; \
box-shadow: 0 2px 8px rgba(0, 0, 0, 0.3);";

/// Shows each notice as a dismissing toast instead of a blocking alert.
pub struct ToastNotifier {
    document: Document,
}

impl ToastNotifier {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn show(&self, message: &str) -> Result<(), JsValue> {
        let toast = self.document.create_element("div")?;
        toast.set_attribute(MARKER_ATTRIBUTE, "notice")?;
        toast.set_attribute("role", "alert")?;
        toast.set_attribute("style", TOAST_STYLE)?;
        toast.set_text_content(Some(message));

        let body = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("No body to attach the notice to"))?;
        body.append_child(&toast)?;

        Timeout::new(TOAST_MILLIS, move || toast.remove()).forget();
        Ok(())
    }
}

impl Notifier for ToastNotifier {
    fn notify(&self, notice: Notice) {
        let message = notice.message();
        log::warn!("{}", message);
        if let Err(e) = self.show(&message) {
            log::warn!("Failed to show notice: {:?}", e);
        }
    }
}

/// Consent through `window.confirm`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfirmConsent;

#[async_trait(?Send)]
impl Consent for ConfirmConsent {
    async fn confirm(&self, prompt: &str) -> bool {
        web_sys::window()
            .and_then(|window| window.confirm_with_message(prompt).ok())
            .unwrap_or(false)
    }
}

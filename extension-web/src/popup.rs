//! # Options Popup
//!
//! Binds the popup's form controls to the engine's `PopupController`. Every
//! setting key has a control whose id is the kebab-case key (`outOfStock` →
//! `#out-of-stock`); checkboxes carry booleans, everything else a value.

use crate::fetch::GlooRateFetcher;
use crate::notify::{ConfirmConsent, ToastNotifier};
use crate::storage::ChromeStorage;
use lib_core::config::Config;
use lib_core::model::store::SettingsMap;
use lib_core::{PopupController, PopupView, ToggleOutcome};
use serde_json::Value;
use shared::dto::settings::{Settings, SETTINGS_KEYS};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlInputElement, HtmlOptionElement, HtmlSelectElement};

type LivePopup = PopupController<ChromeStorage, GlooRateFetcher, ToastNotifier, ConfirmConsent>;

/// `enableConversion` → `enable-conversion`
fn element_id(key: &str) -> String {
    let mut id = String::with_capacity(key.len() + 2);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            id.push('-');
            id.push(ch.to_ascii_lowercase());
        } else {
            id.push(ch);
        }
    }
    id
}

fn missing(id: &str) -> JsValue {
    JsValue::from_str(&format!("Popup control #{} not found", id))
}

struct PopupForm {
    document: Document,
    controls: Vec<(&'static str, Element)>,
    exchange_rate: Element,
}

impl PopupForm {
    fn bind(document: Document) -> Result<Self, JsValue> {
        let controls = SETTINGS_KEYS
            .iter()
            .map(|key| {
                let id = element_id(key);
                document
                    .get_element_by_id(&id)
                    .map(|element| (*key, element))
                    .ok_or_else(|| missing(&id))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let exchange_rate = document
            .get_element_by_id("exchange-rate")
            .ok_or_else(|| missing("exchange-rate"))?;

        Ok(Self {
            document,
            controls,
            exchange_rate,
        })
    }

    fn control(&self, key: &str) -> Option<&Element> {
        self.controls
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, element)| element)
    }

    /// Current form values as settings.
    fn read(&self) -> lib_core::Result<Settings> {
        let mut values = SettingsMap::new();
        for (key, element) in &self.controls {
            let value = if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
                match input.type_().as_str() {
                    "checkbox" => Value::Bool(input.checked()),
                    "number" => input
                        .value()
                        .trim()
                        .parse::<u64>()
                        .map(Value::from)
                        .unwrap_or(Value::Null),
                    _ => Value::String(input.value()),
                }
            } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
                Value::String(select.value())
            } else {
                continue;
            };
            values.insert(key.to_string(), value);
        }
        values.retain(|_, value| !value.is_null());

        Ok(Settings::from_map(&values)?)
    }

    fn render(&self, view: &PopupView) {
        if !view.currencies.is_empty() {
            self.set_currencies(&view.currencies);
        }

        for (key, value) in view.settings.to_map() {
            let Some(element) = self.control(&key) else {
                continue;
            };
            match value {
                Value::Bool(checked) => {
                    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
                        input.set_checked(checked);
                    }
                }
                Value::String(text) => set_control_value(element, &text),
                other => set_control_value(element, &other.to_string()),
            }
        }

        self.set_currency_enabled(view.currency_enabled);
        self.set_exchange_rate(&view.exchange_rate);
    }

    fn set_currencies(&self, currencies: &[String]) {
        let Some(select) = self
            .control("currency")
            .and_then(|element| element.dyn_ref::<HtmlSelectElement>())
        else {
            return;
        };

        select.set_text_content(None);
        for code in currencies {
            match HtmlOptionElement::new_with_text_and_value(code, code) {
                Ok(option) => {
                    if let Err(e) = select.append_child(&option) {
                        log::warn!("Failed to add currency option: {:?}", e);
                    }
                }
                Err(e) => log::warn!("Failed to create currency option: {:?}", e),
            }
        }
    }

    fn set_currency_enabled(&self, enabled: bool) {
        if let Some(select) = self
            .control("currency")
            .and_then(|element| element.dyn_ref::<HtmlSelectElement>())
        {
            select.set_disabled(!enabled);
        }
    }

    fn set_conversion_checked(&self, checked: bool) {
        if let Some(input) = self
            .control("enableConversion")
            .and_then(|element| element.dyn_ref::<HtmlInputElement>())
        {
            input.set_checked(checked);
        }
    }

    fn set_exchange_rate(&self, label: &str) {
        self.exchange_rate.set_text_content(Some(label));
    }
}

fn set_control_value(element: &Element, value: &str) {
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        input.set_value(value);
    } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
        select.set_value(value);
    }
}

/// Bind the form in the current document and load the stored settings.
pub fn mount(config: Config) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("No document available"))?;

    let form = Rc::new(PopupForm::bind(document.clone())?);
    let controller: Rc<LivePopup> = Rc::new(PopupController::new(
        ChromeStorage::new(),
        GlooRateFetcher::new(&config),
        ToastNotifier::new(document),
        ConfirmConsent,
        &config,
    ));

    spawn_local(reload(Rc::clone(&form), Rc::clone(&controller)));

    for (key, element) in &form.controls {
        let key: &'static str = *key;
        let form_handle = Rc::clone(&form);
        let controller = Rc::clone(&controller);
        let on_change = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            spawn_local(changed(key, Rc::clone(&form_handle), Rc::clone(&controller)));
        });
        element.add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())?;
        on_change.forget();
    }

    log::debug!("Popup bound to {:?}", form.document.url());
    Ok(())
}

async fn reload(form: Rc<PopupForm>, controller: Rc<LivePopup>) {
    match controller.load().await {
        Ok(view) => form.render(&view),
        Err(e) => log::warn!("Failed to load settings: {}", e.user_message()),
    }
}

async fn changed(key: &'static str, form: Rc<PopupForm>, controller: Rc<LivePopup>) {
    let settings = match form.read() {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("Unreadable form: {}", e);
            return;
        }
    };

    if key != "enableConversion" {
        match controller.update(&settings).await {
            Ok(label) => form.set_exchange_rate(&label),
            Err(e) => log::warn!("Failed to save settings: {}", e.user_message()),
        }
        return;
    }

    match controller
        .toggle_conversion(settings.enable_conversion, &settings)
        .await
    {
        Ok(ToggleOutcome::Declined) => {
            form.set_conversion_checked(false);
            form.set_currency_enabled(false);
        }
        Ok(_) => reload(form, controller).await,
        Err(e) => log::warn!("Failed to toggle conversion: {}", e.user_message()),
    }
}

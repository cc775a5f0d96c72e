//! # PowerKeys Browser Extension
//!
//! Wasm entry points loaded by the extension's JavaScript shims:
//!
//! - [`start_content_script`] - injected into every candykeys.com page
//! - [`start_popup`] - the options popup
//! - [`on_installed`] - background worker, writes the install defaults
//!
//! All engine logic lives in `lib-core`; this crate adapts it to the browser:
//! the live DOM ([`dom::WebPage`]), `chrome.storage.local`
//! ([`storage::ChromeStorage`]), `fetch` ([`fetch::GlooRateFetcher`]) and
//! in-page toasts ([`notify::ToastNotifier`]).

use lib_core::config::Config;
use lib_core::decorators::DISABLE_CONVERSION_ACTION;
use lib_core::model::page::MARKER_ATTRIBUTE;
use lib_core::model::store::{install_defaults, InstallReason};
use lib_core::{ContentScript, SiteProfile};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

pub mod dom;
pub mod fetch;
pub mod notify;
pub mod popup;
pub mod storage;

use dom::WebPage;
use fetch::GlooRateFetcher;
use notify::ToastNotifier;
use storage::ChromeStorage;

/// Bundled stylesheet linked when dark mode is on.
const DARK_STYLESHEET: &str = "dark.css";

fn init_logging() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
}

fn js_error(err: lib_core::AppError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Run the content script on the current page until it unloads.
#[wasm_bindgen]
pub fn start_content_script() -> Result<(), JsValue> {
    init_logging();
    log::info!("PowerKeys content script starting");

    let config = Config::default();
    let page = WebPage::current()?;
    let notifier = ToastNotifier::new(page.document().clone());

    let script = ContentScript::new(
        page,
        ChromeStorage::new(),
        GlooRateFetcher::new(&config),
        notifier,
        SiteProfile::default(),
        &config,
    )
    .map_err(js_error)?
    .with_stylesheet_url(storage::extension_url(DARK_STYLESHEET));
    let script = Rc::new(script);

    listen_for_disable_link(&script)?;
    rescan_on_load(&script)?;

    spawn_local(async move {
        script.run().await;
    });
    Ok(())
}

type LiveScript = ContentScript<WebPage, ChromeStorage, GlooRateFetcher, ToastNotifier>;

/// Route clicks on the checkout banner's link to `enableConversion = false`.
///
/// The banner is re-created on every checkout visit, so the listener sits on
/// the document and matches the link by its marker attribute.
fn listen_for_disable_link(script: &Rc<LiveScript>) -> Result<(), JsValue> {
    let document = script.page().document().clone();
    let selector = format!("[{}=\"{}\"]", MARKER_ATTRIBUTE, DISABLE_CONVERSION_ACTION);
    let script = Rc::clone(script);

    let on_click = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
        let Some(target) = event
            .target()
            .and_then(|target| target.dyn_into::<web_sys::Element>().ok())
        else {
            return;
        };
        if !matches!(target.closest(&selector), Ok(Some(_))) {
            return;
        }

        event.prevent_default();
        let script = Rc::clone(&script);
        spawn_local(async move {
            if let Err(e) = script.disable_conversion().await {
                log::warn!("Failed to disable conversion: {}", e);
            }
        });
    });

    document.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    on_click.forget();
    Ok(())
}

/// Pick up prices the page rendered after the first conversion.
///
/// The script starts at `document_idle`; catalog pages can still append
/// products until `load` fires.
fn rescan_on_load(script: &Rc<LiveScript>) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window available"))?;
    let script = Rc::clone(script);

    let on_load = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
        let outcome = script.rescan();
        log::debug!("Rescan after load: {:?}", outcome);
    });

    window.add_event_listener_with_callback("load", on_load.as_ref().unchecked_ref())?;
    on_load.forget();
    Ok(())
}

/// Bind the options popup to the store.
#[wasm_bindgen]
pub fn start_popup() -> Result<(), JsValue> {
    init_logging();
    popup::mount(Config::default())
}

/// Write the install defaults when the extension is installed.
///
/// `reason` is `chrome.runtime.OnInstalledReason`.
#[wasm_bindgen]
pub async fn on_installed(reason: String) -> Result<(), JsValue> {
    init_logging();

    let reason: InstallReason = reason.parse().map_err(js_error)?;
    let written = install_defaults(&ChromeStorage::new(), reason)
        .await
        .map_err(js_error)?;
    if written {
        log::info!("Install defaults written");
    }
    Ok(())
}

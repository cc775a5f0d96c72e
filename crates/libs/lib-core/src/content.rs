//! # Content Script
//!
//! Re-applies every setting to one page: once at start and again after each
//! settings change.
//!
//! ## Apply Pass
//!
//! 1. Take a generation ticket and read the settings
//! 2. Visibility, sorting, dark theme and borders
//! 3. Conversion on: show the checkout warning, fetch rates, convert or
//!    re-render prices. Conversion off: revert prices, drop the warning
//!
//! ## Overlapping Passes
//!
//! Change notifications are not coalesced, so passes can overlap while a rate
//! fetch is in flight. Every pass takes a ticket from a shared counter and
//! only the newest ticket may touch the page after an await. A fetch that
//! completes for a superseded pass is discarded, so the page always ends up
//! reflecting the latest settings whatever order the fetches complete in.

use crate::config::{Config, SiteProfile};
use crate::decorators::{
    apply_borders, apply_dark_mode, apply_visibility, sort_products, CheckoutWarning,
};
use crate::error::Result;
use crate::model::page::Page;
use crate::model::store::SettingsStore;
use crate::notify::{Notice, Notifier};
use crate::price::{ApplyOutcome, ConversionState, PriceConverter, PriceLocator};
use crate::rates::RateFetcher;
use futures::StreamExt;
use parking_lot::{Mutex, MutexGuard};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// What happened to prices during one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// Rates arrived and the converter ran
    Applied(ApplyOutcome),
    /// Conversion is off; `restored` elements got their original text back
    Reverted { restored: usize },
    /// Rates could not be fetched; the page was left as it was
    FetchFailed,
    /// The chosen currency is not in the rate table
    RateMissing,
    /// A newer pass started while this one was waiting
    Superseded,
}

/// Summary of one apply pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyReport {
    pub hidden_items: usize,
    pub sorted_items: Option<usize>,
    pub checkout_warning: bool,
    pub conversion: ConversionOutcome,
}

impl ApplyReport {
    fn superseded() -> Self {
        Self {
            hidden_items: 0,
            sorted_items: None,
            checkout_warning: false,
            conversion: ConversionOutcome::Superseded,
        }
    }
}

/// Settings-driven page controller.
pub struct ContentScript<P, S, F, N>
where
    P: Page,
{
    page: Mutex<P>,
    store: S,
    fetcher: F,
    notifier: N,
    profile: SiteProfile,
    base_currency: String,
    stylesheet_url: String,
    converter: Mutex<PriceConverter<P::Node>>,
    checkout: Mutex<CheckoutWarning<P::Node>>,
    generation: AtomicU64,
}

impl<P, S, F, N> ContentScript<P, S, F, N>
where
    P: Page,
    S: SettingsStore,
    F: RateFetcher,
    N: Notifier,
{
    /// # Errors
    ///
    /// [`AppError::Config`](crate::AppError::Config) when the profile's
    /// currency symbol is unusable.
    pub fn new(
        page: P,
        store: S,
        fetcher: F,
        notifier: N,
        profile: SiteProfile,
        config: &Config,
    ) -> Result<Self> {
        let locator = PriceLocator::new(&profile.source_symbol)?;
        let stylesheet_url = profile.dark_stylesheet.clone();

        Ok(Self {
            page: Mutex::new(page),
            store,
            fetcher,
            notifier,
            profile,
            base_currency: config.base_currency.clone(),
            stylesheet_url,
            converter: Mutex::new(PriceConverter::new(locator)),
            checkout: Mutex::new(CheckoutWarning::default()),
            generation: AtomicU64::new(0),
        })
    }

    /// Use `url` for the dark stylesheet instead of the profile's path.
    pub fn with_stylesheet_url(mut self, url: impl Into<String>) -> Self {
        self.stylesheet_url = url.into();
        self
    }

    // region:    --- Accessors

    pub fn page(&self) -> MutexGuard<'_, P> {
        self.page.lock()
    }

    pub fn into_page(self) -> P {
        self.page.into_inner()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn conversion_state(&self) -> ConversionState {
        self.converter.lock().state()
    }

    // endregion: --- Accessors

    /// Apply once, then re-apply after every settings change until the store
    /// closes its change channel.
    ///
    /// Passes triggered by changes run concurrently.
    pub async fn run(&self) {
        let changes = self.store.subscribe();
        self.apply_logged().await;

        changes
            .for_each_concurrent(None, |change| {
                debug!(keys = ?change.keys, "Settings changed");
                self.apply_logged()
            })
            .await;
        debug!("Settings channel closed");
    }

    async fn apply_logged(&self) {
        if let Err(e) = self.apply().await {
            warn!(error = %e, "Apply pass failed");
        }
    }

    /// Run one full apply pass.
    #[tracing::instrument(skip(self))]
    pub async fn apply(&self) -> Result<ApplyReport> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let settings = self.store.settings().await?;
        if self.is_stale(ticket) {
            debug!(ticket, "Pass superseded before start");
            return Ok(ApplyReport::superseded());
        }

        let (hidden_items, sorted_items, on_checkout) = {
            let mut page = self.page.lock();
            let hidden = apply_visibility(&mut *page, &self.profile, &settings);
            let sorted = if settings.enable_sort {
                sort_products(&mut *page, &self.profile, settings.sort_by, settings.sort_order)
            } else {
                None
            };
            apply_dark_mode(&mut *page, &self.stylesheet_url, settings.dark_mode);
            apply_borders(&mut *page, &self.profile, &settings);
            (hidden, sorted, self.profile.is_checkout(&page.location_path()))
        };

        let conversion = if settings.enable_conversion {
            if on_checkout {
                let mut page = self.page.lock();
                self.checkout.lock().ensure(&mut *page, &self.profile);
            }
            self.convert(&settings.currency, ticket).await
        } else {
            let mut page = self.page.lock();
            let restored = self.converter.lock().revert(&mut *page);
            if on_checkout {
                self.checkout.lock().remove(&mut *page);
            }
            ConversionOutcome::Reverted { restored }
        };

        let report = ApplyReport {
            hidden_items,
            sorted_items,
            checkout_warning: self.checkout.lock().is_shown(),
            conversion,
        };
        debug!(?report, "Apply pass finished");
        Ok(report)
    }

    async fn convert(&self, currency: &str, ticket: u64) -> ConversionOutcome {
        let fetched = self.fetcher.fetch(&self.base_currency).await;
        if self.is_stale(ticket) {
            debug!(ticket, "Discarding rates fetched for a superseded pass");
            return ConversionOutcome::Superseded;
        }

        let table = match fetched {
            Ok(table) => table,
            Err(err) => {
                warn!(error = %err, "Exchange rates unavailable, skipping conversion");
                let notice = Notice::from_error(&err).unwrap_or_else(|| Notice::RateFetchFailed {
                    status: None,
                    detail: err.to_string(),
                });
                self.notifier.notify(notice);
                return ConversionOutcome::FetchFailed;
            }
        };

        let rate = match table.rate_for(currency) {
            Ok(rate) => rate,
            Err(err) => {
                // An unset currency means the install defaults have not landed yet
                if currency.trim().is_empty() {
                    debug!("No target currency set");
                } else if let Some(notice) = Notice::from_error(&err) {
                    self.notifier.notify(notice);
                }
                return ConversionOutcome::RateMissing;
            }
        };

        let mut page = self.page.lock();
        let mut converter = self.converter.lock();
        ConversionOutcome::Applied(converter.apply(&mut *page, currency, rate))
    }

    /// Re-scan the page for prices added since the first conversion, keeping
    /// the currency and rate currently shown.
    pub fn rescan(&self) -> ApplyOutcome {
        let mut page = self.page.lock();
        self.converter.lock().rescan(&mut *page)
    }

    /// Turn conversion off from the page itself (the checkout banner link).
    pub async fn disable_conversion(&self) -> Result<()> {
        self.store
            .set_value("enableConversion", Value::Bool(false))
            .await
    }

    fn is_stale(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != ticket
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::page::{Document, NodeId};
    use crate::model::store::MemoryStore;
    use crate::rates::RateTable;
    use crate::test_utils::{RecordingNotifier, ScriptedFetcher};
    use serde_json::json;
    use shared::dto::settings::Settings;

    type Script = ContentScript<Document, MemoryStore, ScriptedFetcher, RecordingNotifier>;

    fn build(settings: Settings, fetcher: ScriptedFetcher) -> (Script, NodeId) {
        let mut doc = Document::new("/catalog");
        let body = doc.body();
        let price = doc.create_element("span", &[("class", "price")]);
        doc.append_child(body, price);
        doc.append_text(price, "12,99 €");

        let store = MemoryStore::with_values(settings.to_map());
        let script = ContentScript::new(
            doc,
            store,
            fetcher,
            RecordingNotifier::default(),
            SiteProfile::default(),
            &Config::default(),
        )
        .unwrap();
        (script, price)
    }

    fn converting(currency: &str) -> Settings {
        Settings {
            enable_conversion: true,
            currency: currency.to_string(),
            ..Settings::install_defaults()
        }
    }

    fn rates() -> RateTable {
        RateTable::new("EUR", [("EUR", 1.0), ("USD", 1.10), ("GBP", 0.86)])
    }

    #[tokio::test]
    async fn test_apply_converts_prices() {
        let (script, price) = build(converting("USD"), ScriptedFetcher::always(rates()));

        let report = script.apply().await.unwrap();
        assert_eq!(
            report.conversion,
            ConversionOutcome::Applied(ApplyOutcome::Converted { records: 1 })
        );
        assert_eq!(script.page().text(&price), "14,29 USD");
    }

    #[tokio::test]
    async fn test_rescan_converts_late_prices() {
        let (script, price) = build(converting("USD"), ScriptedFetcher::always(rates()));
        assert_eq!(script.rescan(), ApplyOutcome::Unchanged);
        script.apply().await.unwrap();

        let late = {
            let mut page = script.page();
            let body = page.body();
            let late = page.create_element("span", &[("class", "price")]);
            page.append_child(body, late);
            page.append_text(late, "8,50 €");
            late
        };

        assert_eq!(script.rescan(), ApplyOutcome::Converted { records: 2 });
        assert_eq!(script.page().text(&price), "14,29 USD");
        assert_eq!(script.page().text(&late), "9,35 USD");
        assert_eq!(script.fetcher().requested_bases(), vec!["EUR".to_string()]);
    }

    #[tokio::test]
    async fn test_disabled_conversion_reverts() {
        let (script, price) = build(converting("USD"), ScriptedFetcher::always(rates()));
        script.apply().await.unwrap();

        script.disable_conversion().await.unwrap();
        let report = script.apply().await.unwrap();
        assert_eq!(report.conversion, ConversionOutcome::Reverted { restored: 1 });
        assert_eq!(script.page().text(&price), "12,99 €");
        assert_eq!(script.fetcher().calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_notifies_and_leaves_page() {
        let fetcher = ScriptedFetcher::new();
        fetcher.push_err(crate::AppError::RateFetch {
            status: 500,
            body: "boom".to_string(),
        });
        let (script, price) = build(converting("USD"), fetcher);

        let report = script.apply().await.unwrap();
        assert_eq!(report.conversion, ConversionOutcome::FetchFailed);
        assert_eq!(script.page().text(&price), "12,99 €");
        assert!(matches!(
            script.notifier().notices().as_slice(),
            [Notice::RateFetchFailed { status: Some(500), .. }]
        ));
    }

    #[tokio::test]
    async fn test_missing_rate_notifies_unless_unset() {
        let (script, _) = build(converting("XYZ"), ScriptedFetcher::always(rates()));
        assert_eq!(script.apply().await.unwrap().conversion, ConversionOutcome::RateMissing);
        assert_eq!(
            script.notifier().notices(),
            vec![Notice::RateNotFound {
                currency: "XYZ".to_string()
            }]
        );

        let (script, _) = build(converting(""), ScriptedFetcher::always(rates()));
        assert_eq!(script.apply().await.unwrap().conversion, ConversionOutcome::RateMissing);
        assert!(script.notifier().notices().is_empty());
    }

    #[tokio::test]
    async fn test_decorators_run_with_conversion_off() {
        let settings = Settings {
            dark_mode: true,
            enable_border: true,
            ..Settings::install_defaults()
        };
        let (script, _) = build(settings, ScriptedFetcher::new());

        script.apply().await.unwrap();
        assert_eq!(script.page().stylesheet_href(), "dark.css");
        assert!(script.page().style_rule().is_some());
        assert_eq!(script.fetcher().calls(), 0);

        script.store().set_value("darkMode", json!(false)).await.unwrap();
        script.apply().await.unwrap();
        assert_eq!(script.page().stylesheet_href(), "");
    }

    #[tokio::test]
    async fn test_custom_stylesheet_url() {
        let settings = Settings {
            dark_mode: true,
            ..Settings::install_defaults()
        };
        let (script, _) = build(settings, ScriptedFetcher::new());
        let script = script.with_stylesheet_url("chrome-extension://abc/dark.css");

        script.apply().await.unwrap();
        assert_eq!(script.page().stylesheet_href(), "chrome-extension://abc/dark.css");
    }
}

//! # Popup Controller
//!
//! Binds the options form to the settings store. The popup UI only renders a
//! [`PopupView`] and forwards form changes; every decision lives here.
//!
//! ## Currency List
//!
//! The currency picker is filled from a live rate fetch. When the fetch fails
//! the picker offers only the base currency. A stored currency that is missing
//! from the list is reset to the base currency, with a notice unless nothing
//! had been chosen yet.

use crate::config::Config;
use crate::error::Result;
use crate::model::store::SettingsStore;
use crate::notify::{Consent, Notice, Notifier, CONVERSION_DISCLOSURE};
use crate::rates::{RateFetcher, RateTable};
use parking_lot::Mutex;
use serde_json::Value;
use shared::dto::settings::Settings;
use shared::utils::format_amount;
use tracing::{debug, warn};

/// Everything the popup renders.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupView {
    pub settings: Settings,
    /// Whether the currency picker accepts input
    pub currency_enabled: bool,
    /// Picker options; empty until rates are loaded
    pub currencies: Vec<String>,
    /// `1,00 EUR ≈ 1,10 USD`, or empty
    pub exchange_rate: String,
}

/// Result of flipping the conversion switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Enabled,
    Disabled,
    /// The user declined the disclosure; nothing was written
    Declined,
}

pub struct PopupController<S, F, N, C> {
    store: S,
    fetcher: F,
    notifier: N,
    consent: C,
    base_currency: String,
    rates: Mutex<Option<RateTable>>,
}

impl<S, F, N, C> PopupController<S, F, N, C>
where
    S: SettingsStore,
    F: RateFetcher,
    N: Notifier,
    C: Consent,
{
    pub fn new(store: S, fetcher: F, notifier: N, consent: C, config: &Config) -> Self {
        Self {
            store,
            fetcher,
            notifier,
            consent,
            base_currency: config.base_currency.clone(),
            rates: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Build the initial view. Currencies are only fetched when conversion
    /// is already on.
    pub async fn load(&self) -> Result<PopupView> {
        let mut settings = self.store.settings().await?;

        let currencies = if settings.enable_conversion {
            let currencies = self.load_currencies().await?;
            settings = self.store.settings().await?;
            currencies
        } else {
            Vec::new()
        };

        Ok(PopupView {
            exchange_rate: self.exchange_rate_label(&settings),
            currency_enabled: settings.enable_conversion,
            currencies,
            settings,
        })
    }

    /// Fetch the currency list and make sure the stored currency is in it.
    ///
    /// Returns the currency codes in alphabetical order.
    pub async fn load_currencies(&self) -> Result<Vec<String>> {
        let table = match self.fetcher.fetch(&self.base_currency).await {
            Ok(table) => table,
            Err(e) => {
                warn!(error = %e, "Currency list unavailable, offering base currency only");
                RateTable::fallback(&self.base_currency)
            }
        };

        let stored = self.store.settings().await?.currency;
        let stored = stored.trim();
        if stored.is_empty() || !table.contains(stored) {
            if !stored.is_empty() {
                self.notifier.notify(Notice::CurrencyUnavailable {
                    currency: stored.to_string(),
                    fallback: self.base_currency.clone(),
                });
            }
            debug!(currency = %self.base_currency, "Resetting selected currency");
            self.store
                .set_value("currency", Value::String(self.base_currency.clone()))
                .await?;
        }

        let currencies = table.currencies().map(str::to_string).collect();
        *self.rates.lock() = Some(table);
        Ok(currencies)
    }

    /// Persist the whole form; returns the refreshed exchange-rate label.
    pub async fn update(&self, settings: &Settings) -> Result<String> {
        self.store.set(settings.to_map()).await?;
        Ok(self.exchange_rate_label(settings))
    }

    /// Flip the conversion switch.
    ///
    /// Enabling asks for consent first; a refusal leaves the store untouched.
    pub async fn toggle_conversion(&self, enabled: bool, form: &Settings) -> Result<ToggleOutcome> {
        let mut settings = form.clone();

        if !enabled {
            settings.enable_conversion = false;
            self.update(&settings).await?;
            return Ok(ToggleOutcome::Disabled);
        }

        if !self.consent.confirm(CONVERSION_DISCLOSURE).await {
            debug!("Conversion disclosure declined");
            return Ok(ToggleOutcome::Declined);
        }

        let currencies = self.load_currencies().await?;
        if !currencies.contains(&settings.currency) {
            settings.currency = self.base_currency.clone();
        }
        settings.enable_conversion = true;
        self.update(&settings).await?;
        Ok(ToggleOutcome::Enabled)
    }

    /// `1,00 <base> ≈ <rate> <code>` when rates are loaded, conversion is on
    /// and the chosen currency is not the base; empty otherwise.
    pub fn exchange_rate_label(&self, settings: &Settings) -> String {
        if !settings.enable_conversion || settings.currency == self.base_currency {
            return String::new();
        }

        let rates = self.rates.lock();
        rates
            .as_ref()
            .and_then(|table| table.rate_for(&settings.currency).ok())
            .map(|rate| {
                format!(
                    "{} {} ≈ {} {}",
                    format_amount(1.0),
                    self.base_currency,
                    format_amount(rate),
                    settings.currency
                )
            })
            .unwrap_or_default()
    }
}

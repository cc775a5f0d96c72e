//! # Engine Configuration
//!
//! Two pieces of configuration reach the engine:
//!
//! - [`Config`] - where exchange rates come from and which currency the site
//!   quotes in. Loaded from environment variables by the native tool and built
//!   from defaults in the browser.
//! - [`SiteProfile`] - every site-specific selector and path the decorators and
//!   the converter need. Defaults describe candykeys.com; a profile can also be
//!   deserialized from JSON so a markup change does not require a rebuild.
//!
//! ## Environment Variables
//!
//! | Variable                      | Default                                       |
//! |-------------------------------|-----------------------------------------------|
//! | `POWERKEYS_RATES_URL`         | `https://api.coinbase.com/v2/exchange-rates`  |
//! | `POWERKEYS_BASE_CURRENCY`     | `EUR`                                         |
//! | `POWERKEYS_HTTP_TIMEOUT_SECS` | `10`                                          |
//!
//! ```rust,no_run
//! use lib_core::config::Config;
//!
//! let config = Config::from_env()?;
//! config.validate()?;
//! # Ok::<(), lib_core::AppError>(())
//! ```

use crate::error::{AppError, Result};
use lib_utils::envs::{get_env_or, get_env_parse, Error as EnvError};
use serde::{Deserialize, Serialize};

/// Public exchange-rate endpoint.
pub const DEFAULT_RATES_URL: &str = "https://api.coinbase.com/v2/exchange-rates";

/// Currency the target site quotes its prices in.
pub const DEFAULT_BASE_CURRENCY: &str = "EUR";

/// Request timeout for the native client.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Rate source configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Exchange-rate endpoint, queried with `?currency=<base>`
    pub rates_url: String,

    /// Currency the site quotes in; also the fallback selection in the popup
    pub base_currency: String,

    /// Valid range: 1-120 seconds
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rates_url: DEFAULT_RATES_URL.to_string(),
            base_currency: DEFAULT_BASE_CURRENCY.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let rates_url = get_env_or("POWERKEYS_RATES_URL", DEFAULT_RATES_URL);
        let base_currency =
            get_env_or("POWERKEYS_BASE_CURRENCY", DEFAULT_BASE_CURRENCY).to_uppercase();

        let http_timeout_secs = match get_env_parse("POWERKEYS_HTTP_TIMEOUT_SECS") {
            Ok(secs) => secs,
            Err(EnvError::MissingEnv(_)) => DEFAULT_HTTP_TIMEOUT_SECS,
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            rates_url,
            base_currency,
            http_timeout_secs,
        })
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if !(self.rates_url.starts_with("http://") || self.rates_url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "POWERKEYS_RATES_URL must be an http(s) URL, got '{}'",
                self.rates_url
            )));
        }

        if self.base_currency.len() != 3
            || !self.base_currency.chars().all(|c| c.is_ascii_uppercase())
        {
            return Err(AppError::Config(format!(
                "POWERKEYS_BASE_CURRENCY must be a three-letter code, got '{}'",
                self.base_currency
            )));
        }

        if self.http_timeout_secs < 1 || self.http_timeout_secs > 120 {
            return Err(AppError::Config(
                "POWERKEYS_HTTP_TIMEOUT_SECS must be between 1 and 120".to_string(),
            ));
        }

        Ok(())
    }
}

// region:    --- Site Profile

/// Site-specific selectors and paths.
///
/// Every field has a candykeys.com default, so a partial JSON document only
/// needs to name what differs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteProfile {
    /// Currency symbol that follows every price on the site
    pub source_symbol: String,

    /// Path of the front page, where items stay visible unless `frontPage` is set
    pub front_page_path: String,

    /// Path of the checkout page, where the conversion warning is shown
    pub checkout_path: String,

    /// Marker element inside an out-of-stock item
    pub out_of_stock_marker: String,

    /// Marker element inside a preorder item
    pub preorder_marker: String,

    /// Item wrappers tried in order when hiding a marked item
    pub item_containers: Vec<String>,

    /// Product lists tried in order; the first one present is sorted
    pub sort_containers: Vec<String>,

    pub price_field: String,
    pub name_field: String,

    /// Element whose inline `width` holds the rating percentage
    pub rating_field: String,

    /// Product images that receive the border rule
    pub image_selectors: Vec<String>,

    /// Stylesheet linked when dark mode is on
    pub dark_stylesheet: String,

    /// Element the checkout warning is prepended to
    pub checkout_anchor: String,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            source_symbol: "€".to_string(),
            front_page_path: "/".to_string(),
            checkout_path: "/checkout".to_string(),
            out_of_stock_marker: ".danger".to_string(),
            preorder_marker: ".preorder".to_string(),
            item_containers: vec![".column".to_string(), ".catalog-item".to_string()],
            sort_containers: vec![
                ".products".to_string(),
                "#app > div.wrap > section.catalog > div.container > div.columns".to_string(),
                "#app > div.wrap > section.cart > div.container > div.columns".to_string(),
            ],
            price_field: ".price".to_string(),
            name_field: ".name".to_string(),
            rating_field: ".progresz".to_string(),
            image_selectors: vec![
                ".image > img".to_string(),
                ".tns-item > a > img".to_string(),
                "tr > .xx > .flex > img".to_string(),
            ],
            dark_stylesheet: "dark.css".to_string(),
            checkout_anchor: "#app > div.wrap > section > div > form > div > div:nth-child(2) > div"
                .to_string(),
        }
    }
}

impl SiteProfile {
    /// Parse a profile from JSON, filling unnamed fields with defaults.
    pub fn from_json(source: &str) -> Result<Self> {
        let profile: SiteProfile = serde_json::from_str(source)
            .map_err(|e| AppError::Config(format!("Invalid site profile: {}", e)))?;
        profile.validate()?;
        Ok(profile)
    }

    /// Check that every selector in the profile parses.
    pub fn validate(&self) -> Result<()> {
        if self.source_symbol.trim().is_empty() {
            return Err(AppError::Config("sourceSymbol must not be empty".to_string()));
        }

        let singles = [
            &self.out_of_stock_marker,
            &self.preorder_marker,
            &self.price_field,
            &self.name_field,
            &self.rating_field,
            &self.checkout_anchor,
        ];
        let lists = self
            .item_containers
            .iter()
            .chain(&self.sort_containers)
            .chain(&self.image_selectors);

        for selector in singles.into_iter().chain(lists) {
            crate::model::page::SelectorList::parse(selector)?;
        }
        Ok(())
    }

    /// Whether `path` is the front page.
    pub fn is_front_page(&self, path: &str) -> bool {
        path == self.front_page_path
    }

    /// Whether `path` is the checkout page.
    pub fn is_checkout(&self, path: &str) -> bool {
        path == self.checkout_path
    }
}

// endregion: --- Site Profile

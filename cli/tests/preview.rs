//! Saved page in, decorated HTML out.

use lib_core::model::page::{Document, Page};
use lib_core::model::store::{MemoryStore, SettingsStore};
use lib_core::rates::RateTable;
use lib_core::test_utils::ScriptedFetcher;
use lib_core::{AppError, Config, ConversionOutcome, SiteProfile};
use powerkeys::{preview, JsonFileStore};
use serde_json::json;
use shared::dto::settings::Settings;

const CHECKOUT: &str = r#"<!DOCTYPE html>
<html><head><title>Checkout</title></head><body>
<div id="app"><div class="wrap"><section><div><form><div>
  <div>Address</div>
  <div><div id="summary"><span class="total">Total: 12,99 €</span></div></div>
</div></form></div></section></div></div>
</body></html>"#;

fn rates() -> RateTable {
    RateTable::new("EUR", [("EUR", 1.0), ("USD", 1.10)])
}

#[tokio::test]
async fn checkout_page_is_converted_and_warned() {
    let document = Document::parse_html(CHECKOUT, "/checkout");
    let store = MemoryStore::with_values(
        Settings {
            enable_conversion: true,
            currency: "USD".to_string(),
            dark_mode: true,
            ..Settings::install_defaults()
        }
        .to_map(),
    );

    let (document, report) = preview(
        document,
        store,
        ScriptedFetcher::always(rates()),
        SiteProfile::default(),
        &Config::default(),
    )
    .await
    .unwrap();

    assert!(report.checkout_warning);
    let html = document.to_html();
    assert!(html.contains("Total: 14,29 USD"));
    assert!(html.contains("WARNING (PowerKeys)"));
    assert!(html.contains(r#"href="dark.css""#));
    assert!(!html.contains("12,99 €"));
}

#[tokio::test]
async fn settings_file_drives_the_pass() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let store = JsonFileStore::open(&path).await.unwrap();
    store.set(Settings::install_defaults().to_map()).await.unwrap();
    store.set_value("enableBorder", json!(true)).await.unwrap();
    store.set_value("borderColor", json!("blue")).await.unwrap();

    let store = JsonFileStore::open(&path).await.unwrap();
    let document = Document::parse_html(CHECKOUT, "/checkout");
    let (document, report) = preview(
        document,
        store,
        ScriptedFetcher::new(),
        SiteProfile::default(),
        &Config::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.conversion, ConversionOutcome::Reverted { restored: 0 });
    assert!(!report.checkout_warning);
    let rule = document.style_rule().unwrap();
    assert!(rule.ends_with("{ border: 5px solid blue }"));
    assert!(document.to_html().contains("Total: 12,99 €"));
}

#[tokio::test]
async fn failed_fetch_leaves_prices_alone() {
    let fetcher = ScriptedFetcher::new();
    fetcher.push_err(AppError::RateFetch {
        status: 500,
        body: "unavailable".to_string(),
    });
    let store = MemoryStore::with_values(
        Settings {
            enable_conversion: true,
            currency: "USD".to_string(),
            ..Settings::install_defaults()
        }
        .to_map(),
    );

    let (document, report) = preview(
        Document::parse_html(CHECKOUT, "/checkout"),
        store,
        fetcher,
        SiteProfile::default(),
        &Config::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.conversion, ConversionOutcome::FetchFailed);
    assert!(document.to_html().contains("Total: 12,99 €"));
}

#[tokio::test]
async fn profile_overrides_the_symbol() {
    let html = "<html><body><p class=\"price\">9,99 zł</p></body></html>";
    let profile = SiteProfile::from_json(r#"{ "sourceSymbol": "zł" }"#).unwrap();
    let store = MemoryStore::with_values(
        Settings {
            enable_conversion: true,
            currency: "USD".to_string(),
            ..Settings::install_defaults()
        }
        .to_map(),
    );

    let (document, _) = preview(
        Document::parse_html(html, "/"),
        store,
        ScriptedFetcher::always(RateTable::new("EUR", [("USD", 2.0)])),
        profile,
        &Config::default(),
    )
    .await
    .unwrap();

    let price = document.query(".price").unwrap();
    assert_eq!(document.text(&price), "19,98 USD");
}

//! # Commands
//!
//! - `settings init|show|set` - manage a settings file
//! - `rates [--currency CODE]` - show the live exchange rates
//! - `apply <page.html>` - run one content-script pass on a saved page

use crate::store::JsonFileStore;
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use lib_utils::format_time;
use lib_core::model::page::Document;
use lib_core::model::store::{install_defaults, InstallReason, MemoryStore, SettingsStore};
use lib_core::notify::{LogNotifier, Notice};
use lib_core::rates::{CoinbaseClient, RateFetcher, RateTable};
use lib_core::{ApplyReport, Config, ContentScript, SiteProfile};
use serde_json::Value;
use shared::dto::settings::{Settings, SETTINGS_KEYS};
use shared::utils::format_amount;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Settings file used when `--settings` is not given.
pub const DEFAULT_SETTINGS_FILE: &str = "powerkeys-settings.json";

#[derive(Parser)]
#[command(name = "powerkeys")]
#[command(about = "Preview PowerKeys settings against saved candykeys.com pages", long_about = None)]
pub struct Cli {
    /// Settings file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage the settings file
    Settings {
        #[command(subcommand)]
        action: SettingsCommands,
    },

    /// Print the exchange-rate table
    Rates {
        /// Print only this currency's rate
        #[arg(long, value_name = "CODE")]
        currency: Option<String>,
    },

    /// Apply settings to a saved page and write the resulting HTML
    Apply {
        /// Saved HTML page
        page: PathBuf,

        /// URL path the page was served at
        #[arg(long, default_value = "/")]
        path: String,

        /// Site profile overrides (JSON)
        #[arg(long, value_name = "FILE")]
        profile: Option<PathBuf>,

        /// Output file; stdout when omitted
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Write the install defaults
    Init,
    /// Print the effective settings
    Show,
    /// Change one setting
    Set { key: String, value: String },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_env().context("Invalid configuration")?;
    config.validate().context("Invalid configuration")?;

    match cli.command {
        Commands::Settings { action } => {
            let path = cli
                .settings
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
            let store = JsonFileStore::open(&path).await?;
            match action {
                SettingsCommands::Init => settings_init(&store).await,
                SettingsCommands::Show => settings_show(&store).await,
                SettingsCommands::Set { key, value } => settings_set(&store, &key, &value).await,
            }
        }
        Commands::Rates { currency } => {
            let client = CoinbaseClient::new(&config)?;
            rates(&client, &config, currency.as_deref()).await
        }
        Commands::Apply {
            page,
            path,
            profile,
            output,
        } => {
            apply(
                &config,
                &page,
                &path,
                cli.settings.as_deref(),
                profile.as_deref(),
                output.as_deref(),
            )
            .await
        }
    }
}

// region:    --- Settings

async fn settings_init(store: &JsonFileStore) -> anyhow::Result<()> {
    install_defaults(store, InstallReason::Install).await?;
    println!("Default settings written to {}", store.path().display());
    Ok(())
}

async fn settings_show(store: &JsonFileStore) -> anyhow::Result<()> {
    let settings = store.settings().await?;
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

async fn settings_set<S: SettingsStore>(store: &S, key: &str, raw: &str) -> anyhow::Result<()> {
    let value = parse_setting_value(key, raw)?;

    let mut candidate = store.get_all().await?;
    candidate.insert(key.to_string(), value.clone());
    Settings::from_map(&candidate).with_context(|| format!("Invalid value '{}' for {}", raw, key))?;

    store.set_value(key, value).await?;
    info!(key, value = raw, "Setting changed");
    Ok(())
}

/// Read a command-line value the way the popup's controls produce it:
/// booleans, non-negative integers, otherwise text.
pub fn parse_setting_value(key: &str, raw: &str) -> anyhow::Result<Value> {
    if !SETTINGS_KEYS.contains(&key) {
        bail!(
            "Unknown setting '{}'. Known settings: {}",
            key,
            SETTINGS_KEYS.join(", ")
        );
    }

    let value = match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => raw
            .parse::<u64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
    };
    Ok(value)
}

// endregion: --- Settings

// region:    --- Rates

/// Print the rate table, or one rate. A failed fetch prints the base-only
/// table the popup falls back to.
pub async fn rates<F: RateFetcher>(
    fetcher: &F,
    config: &Config,
    currency: Option<&str>,
) -> anyhow::Result<()> {
    let base = config.base_currency.as_str();
    let (table, fallback) = match fetcher.fetch(base).await {
        Ok(table) => (table, false),
        Err(e) => {
            warn!(error = %e, status = ?e.status(), "Exchange rates unavailable");
            if let Some(notice) = Notice::from_error(&e) {
                eprintln!("{}", notice.message());
            }
            (RateTable::fallback(base), true)
        }
    };

    match currency {
        Some(code) => {
            let rate = table.rate_for(code)?;
            println!("{} {} ≈ {} {}", format_amount(1.0), base, format_amount(rate), code);
        }
        None => print!("{}", render_table(&table)),
    }

    if fallback {
        println!("(fallback: only {} is available)", base);
    } else {
        println!("Fetched {}", format_time(table.fetched_at()));
    }
    Ok(())
}

/// One `CODE  rate` line per currency, alphabetical.
pub fn render_table(table: &RateTable) -> String {
    let mut out = format!("Rates for 1 {} ({} currencies)\n", table.base(), table.len());
    for code in table.currencies() {
        if let Ok(rate) = table.rate_for(code) {
            out.push_str(&format!("{:<6}{}\n", code, rate));
        }
    }
    out
}

// endregion: --- Rates

// region:    --- Apply

/// Run one apply pass over `document` and hand the page back with the report.
pub async fn preview<S, F>(
    document: Document,
    store: S,
    fetcher: F,
    profile: SiteProfile,
    config: &Config,
) -> lib_core::Result<(Document, ApplyReport)>
where
    S: SettingsStore,
    F: RateFetcher,
{
    let script = ContentScript::new(document, store, fetcher, LogNotifier, profile, config)?;
    let report = script.apply().await?;
    Ok((script.into_page(), report))
}

async fn apply(
    config: &Config,
    page: &Path,
    url_path: &str,
    settings: Option<&Path>,
    profile: Option<&Path>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let source = tokio::fs::read_to_string(page)
        .await
        .with_context(|| format!("Failed to read {}", page.display()))?;
    let document = Document::parse_html(&source, url_path);

    let profile = match profile {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            SiteProfile::from_json(&json)?
        }
        None => SiteProfile::default(),
    };

    let fetcher = CoinbaseClient::new(config)?;
    let (document, report) = match settings {
        Some(path) => {
            let store = JsonFileStore::open(path).await?;
            preview(document, store, fetcher, profile, config).await?
        }
        None => {
            let store = MemoryStore::with_values(Settings::install_defaults().to_map());
            preview(document, store, fetcher, profile, config).await?
        }
    };
    info!(?report, "Page processed");

    let html = document.to_html();
    match output {
        Some(path) => tokio::fs::write(path, html)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", html),
    }
    Ok(())
}

// endregion: --- Apply

#[cfg(test)]
mod tests {
    use super::*;
    use lib_core::test_utils::ScriptedFetcher;

    #[test]
    fn test_parse_setting_value() {
        assert_eq!(parse_setting_value("darkMode", "true").unwrap(), Value::Bool(true));
        assert_eq!(parse_setting_value("borderWidth", "3").unwrap(), Value::from(3));
        assert_eq!(parse_setting_value("currency", "USD").unwrap(), Value::from("USD"));
        assert!(parse_setting_value("colour", "red").is_err());
    }

    #[tokio::test]
    async fn test_set_rejects_mistyped_value() {
        let store = MemoryStore::with_values(Settings::install_defaults().to_map());
        assert!(settings_set(&store, "sortBy", "colour").await.is_err());
        assert!(settings_set(&store, "darkMode", "7").await.is_err());

        settings_set(&store, "sortBy", "rating").await.unwrap();
        assert_eq!(
            store.settings().await.unwrap().sort_by,
            shared::dto::settings::SortBy::Rating
        );
    }

    #[test]
    fn test_render_table() {
        let table = RateTable::new("EUR", [("USD", 1.1), ("EUR", 1.0)]);
        assert_eq!(
            render_table(&table),
            "Rates for 1 EUR (2 currencies)\nEUR   1\nUSD   1.1\n"
        );
    }

    #[tokio::test]
    async fn test_rates_falls_back_on_failure() {
        let fetcher = ScriptedFetcher::new();
        fetcher.push_err(lib_core::AppError::RateFetch {
            status: 503,
            body: String::new(),
        });
        rates(&fetcher, &Config::default(), Some("EUR")).await.unwrap();

        fetcher.push_err(lib_core::AppError::Transport("offline".to_string()));
        assert!(rates(&fetcher, &Config::default(), Some("USD")).await.is_err());
    }
}

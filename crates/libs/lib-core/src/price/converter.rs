//! # Price Converter
//!
//! Converts located prices in place and reverts them exactly.
//!
//! ## Lifecycle
//!
//! ```text
//!            apply (first)                 apply (new currency or rate)
//! Unconverted ───────────▶ Converted ◀──────────────────────────┐
//!      ▲                      │  └──────────────────────────────┘
//!      └──────── revert ──────┘
//! ```
//!
//! The first conversion captures one [`ConvertedPriceRecord`] per price. Every
//! later re-render works from those records alone and never rescans the page,
//! so already-converted text is never mistaken for a source price. Revert
//! writes back the text captured at first conversion, byte for byte.

use super::locator::PriceLocator;
use crate::model::page::Page;
use shared::utils::format_price;

/// Everything needed to re-render or restore one converted price.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedPriceRecord<N> {
    node: N,
    original_amount: f64,
    prefix_text: String,
    matched_text: String,
    suffix_text: String,
}

impl<N> ConvertedPriceRecord<N> {
    pub fn node(&self) -> &N {
        &self.node
    }

    /// Amount in the source currency, parsed once at capture.
    pub fn original_amount(&self) -> f64 {
        self.original_amount
    }

    pub fn prefix_text(&self) -> &str {
        &self.prefix_text
    }

    pub fn matched_text(&self) -> &str {
        &self.matched_text
    }

    pub fn suffix_text(&self) -> &str {
        &self.suffix_text
    }

    /// The element's full text before conversion.
    pub fn original_text(&self) -> String {
        format!("{}{}{}", self.prefix_text, self.matched_text, self.suffix_text)
    }
}

/// Converter state.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionState {
    Unconverted,
    Converted { currency: String, rate: f64 },
}

/// What [`PriceConverter::apply`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Prices were located and converted for the first time
    Converted { records: usize },
    /// Existing records were re-rendered with a new currency or rate
    Rerendered { records: usize },
    /// Currency and rate already match what is shown
    Unchanged,
    /// The page holds no prices
    NothingFound,
}

/// Owns the record set for one page.
#[derive(Debug)]
pub struct PriceConverter<N> {
    locator: PriceLocator,
    records: Vec<ConvertedPriceRecord<N>>,
    rendered: Option<(String, f64)>,
}

impl<N: Clone + PartialEq> PriceConverter<N> {
    pub fn new(locator: PriceLocator) -> Self {
        Self {
            locator,
            records: Vec::new(),
            rendered: None,
        }
    }

    pub fn state(&self) -> ConversionState {
        match &self.rendered {
            Some((currency, rate)) if !self.records.is_empty() => ConversionState::Converted {
                currency: currency.clone(),
                rate: *rate,
            },
            _ => ConversionState::Unconverted,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self.state(), ConversionState::Converted { .. })
    }

    pub fn records(&self) -> &[ConvertedPriceRecord<N>] {
        &self.records
    }

    /// Show prices in `currency` at `rate`, converting or re-rendering as needed.
    pub fn apply<P>(&mut self, page: &mut P, currency: &str, rate: f64) -> ApplyOutcome
    where
        P: Page<Node = N>,
    {
        match self.state() {
            ConversionState::Unconverted => self.convert_first(page, currency, rate),
            ConversionState::Converted {
                currency: shown,
                rate: shown_rate,
            } if shown == currency && shown_rate == rate => ApplyOutcome::Unchanged,
            ConversionState::Converted { .. } => self.convert_existing(page, currency, rate),
        }
    }

    /// Locate every price, capture its record, tag its element and render it.
    ///
    /// Leaves the converter unconverted when nothing is found, so a later pass
    /// scans again.
    pub fn convert_first<P>(&mut self, page: &mut P, currency: &str, rate: f64) -> ApplyOutcome
    where
        P: Page<Node = N>,
    {
        let located = self.locator.locate(page);
        if located.is_empty() {
            tracing::debug!("No prices on page");
            self.records.clear();
            self.rendered = None;
            return ApplyOutcome::NothingFound;
        }

        self.records.clear();
        for found in located {
            for price in &found.matches {
                self.records.push(ConvertedPriceRecord {
                    node: found.node.clone(),
                    original_amount: price.amount,
                    prefix_text: found.text[..price.start].to_string(),
                    matched_text: price.text.clone(),
                    suffix_text: found.text[price.end()..].to_string(),
                });
            }
            page.set_tagged(&found.node, true);
        }

        self.render(page, currency, rate);
        tracing::debug!(records = self.records.len(), %currency, rate, "Prices converted");
        ApplyOutcome::Converted {
            records: self.records.len(),
        }
    }

    /// Re-render existing records without touching the page structure.
    pub fn convert_existing<P>(&mut self, page: &mut P, currency: &str, rate: f64) -> ApplyOutcome
    where
        P: Page<Node = N>,
    {
        self.render(page, currency, rate);
        tracing::debug!(records = self.records.len(), %currency, rate, "Prices re-rendered");
        ApplyOutcome::Rerendered {
            records: self.records.len(),
        }
    }

    /// Restore every element's original text and drop the records.
    ///
    /// Returns the number of elements restored.
    pub fn revert<P>(&mut self, page: &mut P) -> usize
    where
        P: Page<Node = N>,
    {
        let mut restored = 0;
        for (node, first) in self.grouped() {
            page.set_text(&node, &self.records[first].original_text());
            page.set_tagged(&node, false);
            restored += 1;
        }

        self.records.clear();
        self.rendered = None;
        if restored > 0 {
            tracing::debug!(restored, "Prices reverted");
        }
        restored
    }

    /// Revert and convert from scratch with the currently shown currency and
    /// rate, picking up prices added since the first conversion.
    pub fn rescan<P>(&mut self, page: &mut P) -> ApplyOutcome
    where
        P: Page<Node = N>,
    {
        match self.state() {
            ConversionState::Converted { currency, rate } => {
                self.revert(page);
                self.convert_first(page, &currency, rate)
            }
            ConversionState::Unconverted => ApplyOutcome::Unchanged,
        }
    }

    fn render<P>(&mut self, page: &mut P, currency: &str, rate: f64)
    where
        P: Page<Node = N>,
    {
        for (node, first) in self.grouped() {
            let original = self.records[first].original_text();
            let mut text = String::with_capacity(original.len());
            let mut cursor = 0;

            for record in self.records.iter().filter(|record| record.node == node) {
                let start = record.prefix_text.len();
                text.push_str(&original[cursor..start]);
                text.push_str(&format_price(record.original_amount * rate, currency));
                cursor = start + record.matched_text.len();
            }
            text.push_str(&original[cursor..]);

            page.set_text(&node, &text);
        }
        self.rendered = Some((currency.to_string(), rate));
    }

    /// Distinct record nodes in first-seen order, with the index of their first record.
    fn grouped(&self) -> Vec<(N, usize)> {
        let mut nodes: Vec<(N, usize)> = Vec::new();
        for (index, record) in self.records.iter().enumerate() {
            if !nodes.iter().any(|(node, _)| *node == record.node) {
                nodes.push((record.node.clone(), index));
            }
        }
        nodes
    }
}

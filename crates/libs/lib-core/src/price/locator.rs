//! # Price Locator
//!
//! Finds prices written as `<digits>,<two digits><optional whitespace><symbol>`,
//! e.g. `12,99 €` or `1234,50€`. Matches are non-overlapping and leftmost-first.

use crate::error::{AppError, Result};
use crate::model::page::Page;
use regex::Regex;

/// One price inside a text.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceMatch {
    /// Byte offset of the match in the scanned text
    pub start: usize,
    /// Matched text, symbol included
    pub text: String,
    /// Parsed amount in the source currency
    pub amount: f64,
}

impl PriceMatch {
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

/// An element whose text holds at least one price.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedPrices<N> {
    pub node: N,
    /// Rendered text at the time of the scan
    pub text: String,
    pub matches: Vec<PriceMatch>,
}

/// Compiled price pattern for one currency symbol.
#[derive(Debug, Clone)]
pub struct PriceLocator {
    symbol: String,
    pattern: Regex,
}

impl PriceLocator {
    /// Locator for prices followed by `symbol`.
    ///
    /// # Errors
    ///
    /// [`AppError::Config`] for an empty symbol.
    pub fn new(symbol: &str) -> Result<Self> {
        if symbol.trim().is_empty() {
            return Err(AppError::Config("Currency symbol must not be empty".to_string()));
        }
        let pattern = Regex::new(&format!(r"[0-9]+,[0-9]{{2}}\s*{}", regex::escape(symbol)))
            .map_err(|e| AppError::Config(format!("Price pattern: {}", e)))?;

        Ok(Self {
            symbol: symbol.to_string(),
            pattern,
        })
    }

    /// All prices in `text`, in order.
    pub fn find_in(&self, text: &str) -> Vec<PriceMatch> {
        self.pattern
            .find_iter(text)
            .filter_map(|found| {
                let amount = shared::utils::parse_amount(found.as_str())?;
                Some(PriceMatch {
                    start: found.start(),
                    text: found.as_str().to_string(),
                    amount,
                })
            })
            .collect()
    }

    /// Untagged elements on `page` whose text holds a price.
    ///
    /// An element whose own text holds a price covers its descendants. An
    /// element whose own text only holds the symbol gives way to the
    /// descendants that hold the prices, so their markup survives.
    pub fn locate<P: Page>(&self, page: &P) -> Vec<LocatedPrices<P::Node>> {
        let candidates = page.text_elements_containing(&self.symbol);

        let mut picked: Vec<&P::Node> = Vec::new();
        for node in &candidates {
            if picked.iter().any(|outer| page.contains(outer, node)) {
                continue;
            }
            let own_price = !self.find_in(&page.own_text(node)).is_empty();
            let inner_candidate = candidates
                .iter()
                .any(|other| other != node && page.contains(node, other));
            if own_price || !inner_candidate {
                picked.push(node);
            }
        }

        picked
            .into_iter()
            .filter_map(|node| {
                let text = page.text(node);
                let matches = self.find_in(&text);
                if matches.is_empty() {
                    return None;
                }
                Some(LocatedPrices {
                    node: node.clone(),
                    text,
                    matches,
                })
            })
            .collect()
    }
}

//! Converter behaviour against a live-ish page.

use lib_core::model::page::{Banner, Document, NodeId, Page};
use lib_core::price::{ApplyOutcome, ConversionState, PriceConverter, PriceLocator};
use std::cell::Cell;

/// Page wrapper counting how often prices are located.
struct CountingPage {
    inner: Document,
    scans: Cell<usize>,
}

impl Page for CountingPage {
    type Node = NodeId;

    fn location_path(&self) -> String {
        self.inner.location_path()
    }

    fn text_elements_containing(&self, needle: &str) -> Vec<NodeId> {
        self.scans.set(self.scans.get() + 1);
        self.inner.text_elements_containing(needle)
    }

    fn text(&self, node: &NodeId) -> String {
        self.inner.text(node)
    }

    fn own_text(&self, node: &NodeId) -> String {
        self.inner.own_text(node)
    }

    fn set_text(&mut self, node: &NodeId, text: &str) {
        self.inner.set_text(node, text)
    }

    fn is_tagged(&self, node: &NodeId) -> bool {
        self.inner.is_tagged(node)
    }

    fn set_tagged(&mut self, node: &NodeId, tagged: bool) {
        self.inner.set_tagged(node, tagged)
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        self.inner.contains(ancestor, node)
    }

    fn query(&self, selector: &str) -> Option<NodeId> {
        self.inner.query(selector)
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.inner.query_all(selector)
    }

    fn query_within(&self, scope: &NodeId, selector: &str) -> Option<NodeId> {
        self.inner.query_within(scope, selector)
    }

    fn closest(&self, node: &NodeId, selector: &str) -> Option<NodeId> {
        self.inner.closest(node, selector)
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.inner.children(node)
    }

    fn replace_children(&mut self, parent: &NodeId, children: &[NodeId]) {
        self.inner.replace_children(parent, children)
    }

    fn style_property(&self, node: &NodeId, property: &str) -> Option<String> {
        self.inner.style_property(node, property)
    }

    fn set_display(&mut self, node: &NodeId, display: &str) {
        self.inner.set_display(node, display)
    }

    fn stylesheet_href(&self) -> String {
        self.inner.stylesheet_href()
    }

    fn set_stylesheet_href(&mut self, href: &str) {
        self.inner.set_stylesheet_href(href)
    }

    fn style_rule(&self) -> Option<String> {
        self.inner.style_rule()
    }

    fn set_style_rule(&mut self, rule: Option<&str>) {
        self.inner.set_style_rule(rule)
    }

    fn insert_banner(&mut self, anchor: &NodeId, banner: &Banner) -> Option<NodeId> {
        self.inner.insert_banner(anchor, banner)
    }

    fn remove(&mut self, node: &NodeId) {
        self.inner.remove(node)
    }
}

fn single_node(text: &str) -> (Document, NodeId) {
    let mut doc = Document::new("/");
    let body = doc.body();
    let node = doc.create_element("p", &[]);
    doc.append_child(body, node);
    doc.append_text(node, text);
    (doc, node)
}

fn converter() -> PriceConverter<NodeId> {
    PriceConverter::new(PriceLocator::new("€").unwrap())
}

#[test]
fn revert_restores_original_text_exactly() {
    let prefixes = ["", "Now only ", "€uro deal: ", "Preis:\u{a0}", "ÄÖÜ → "];
    let suffixes = ["", " incl. VAT", "!", " (was 30 €)", "\n\tstock: 3"];
    let rates = [0.0001, 0.86, 1.0, 1.10, 157.42];

    for prefix in prefixes {
        for suffix in suffixes {
            let original = format!("{}12,99 €{} and 1000,00€", prefix, suffix);
            for rate in rates {
                let (mut doc, node) = single_node(&original);
                let mut converter = converter();

                converter.apply(&mut doc, "USD", rate);
                assert_ne!(doc.text(&node), original);

                converter.revert(&mut doc);
                assert_eq!(doc.text(&node), original, "rate {}", rate);
            }
        }
    }
}

#[test]
fn rerender_with_same_rate_is_identical() {
    let (mut doc, node) = single_node("Total: 49,90 €");
    let mut converter = converter();
    converter.apply(&mut doc, "USD", 1.10);

    converter.convert_existing(&mut doc, "GBP", 0.86);
    let first = doc.text(&node);
    converter.convert_existing(&mut doc, "GBP", 0.86);
    assert_eq!(doc.text(&node), first);
    assert_eq!(first, "Total: 42,91 GBP");
}

#[test]
fn converted_page_is_never_located_again() {
    let (doc, node) = single_node("12,99 €");
    let mut page = CountingPage {
        inner: doc,
        scans: Cell::new(0),
    };
    let mut converter = converter();

    converter.apply(&mut page, "USD", 1.10);
    assert_eq!(page.scans.get(), 1);

    for (currency, rate) in [("GBP", 0.86), ("USD", 1.10), ("JPY", 160.0)] {
        let outcome = converter.apply(&mut page, currency, rate);
        assert_eq!(outcome, ApplyOutcome::Rerendered { records: 1 });
    }
    assert_eq!(page.scans.get(), 1);
    assert_eq!(converter.records().len(), 1);
    assert_eq!(page.text(&node), "2078,40 JPY");
}

#[test]
fn converted_text_in_source_format_is_not_reconverted() {
    // A target currency written with the source symbol still matches the pattern
    let (mut doc, node) = single_node("12,99 €");
    let mut converter = converter();
    converter.apply(&mut doc, "€", 2.0);
    assert_eq!(doc.text(&node), "25,98 €");

    assert_eq!(converter.apply(&mut doc, "€", 3.0), ApplyOutcome::Rerendered { records: 1 });
    assert_eq!(doc.text(&node), "38,97 €");
    assert!(doc.text_elements_containing("€").is_empty());
}

#[test]
fn multiple_occurrences_in_one_node() {
    let (mut doc, node) = single_node("Price: 10,00 € or 20,00 €");
    let mut converter = converter();

    converter.apply(&mut doc, "USD", 1.5);
    let records = converter.records();
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].prefix_text(), "Price: ");
    assert_eq!(records[0].matched_text(), "10,00 €");
    assert_eq!(records[0].suffix_text(), " or 20,00 €");
    assert_eq!(records[1].prefix_text(), "Price: 10,00 € or ");
    assert_eq!(records[1].matched_text(), "20,00 €");
    assert_eq!(records[1].suffix_text(), "");

    assert_eq!(doc.text(&node), "Price: 15,00 USD or 30,00 USD");
}

#[test]
fn rounding_is_half_up_with_comma() {
    // Three fractional digits never match the source pattern
    let (mut doc, _) = single_node("10,555 €");
    let mut converter = converter();
    assert_eq!(converter.apply(&mut doc, "EUR", 1.0), ApplyOutcome::NothingFound);

    let (mut doc, node) = single_node("1,00 €");
    converter.apply(&mut doc, "EUR", 10.555);
    assert_eq!(doc.text(&node), "10,56 EUR");
}

#[test]
fn revert_then_convert_scans_fresh() {
    let (mut doc, node) = single_node("5,00 €");
    let mut converter = converter();

    converter.apply(&mut doc, "USD", 2.0);
    converter.revert(&mut doc);
    assert_eq!(converter.state(), ConversionState::Unconverted);

    doc.set_text(&node, "7,00 €");
    converter.apply(&mut doc, "USD", 2.0);
    assert_eq!(doc.text(&node), "14,00 USD");
}

#[test]
fn locator_finds_prices_on_a_parsed_page() {
    let doc = Document::parse_html(
        "<html><body><p>Total: <b>3,50 €</b></p><p>No prices here</p></body></html>",
        "/",
    );
    let located = PriceLocator::new("€").unwrap().locate(&doc);

    assert_eq!(located.len(), 1);
    assert_eq!(located[0].node, doc.query("b").unwrap());
    assert_eq!(located[0].matches[0].amount, 3.5);
}

#[test]
fn bare_symbol_label_keeps_price_markup() {
    let mut doc = Document::parse_html(
        r#"<html><body><div class="item">Prices in € <span class="price">12,99 €</span></div></body></html>"#,
        "/",
    );
    let item = doc.query(".item").unwrap();
    let price = doc.query(".price").unwrap();
    let mut converter = converter();

    assert_eq!(
        converter.apply(&mut doc, "USD", 2.0),
        ApplyOutcome::Converted { records: 1 }
    );
    assert_eq!(doc.text(&item), "Prices in € 25,98 USD");
    assert_eq!(doc.query_all(".price"), vec![price]);

    converter.revert(&mut doc);
    assert_eq!(doc.text(&item), "Prices in € 12,99 €");
    assert_eq!(doc.query_all(".price"), vec![price]);
}

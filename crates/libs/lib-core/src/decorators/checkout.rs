//! Checkout warning banner.

use crate::config::SiteProfile;
use crate::model::page::{Banner, Page};

/// [`MARKER_ATTRIBUTE`](crate::model::page::MARKER_ATTRIBUTE) value of the
/// banner's link; activating it must write `enableConversion = false`.
pub const DISABLE_CONVERSION_ACTION: &str = "disable-conversion";

/// Banner shown at checkout while conversion is on.
pub const CHECKOUT_WARNING: Banner = Banner {
    class_name: "message is-danger has-text-left",
    title: "WARNING (PowerKeys)",
    body: "You still have currency conversion enabled. \
Prices shown may not be the same as will be charged. \
Please proceed with caution or ",
    link_text: "disable this feature.",
    marker: "checkout-warning",
    action: DISABLE_CONVERSION_ACTION,
};

/// Tracks the banner this script inserted.
#[derive(Debug)]
pub struct CheckoutWarning<N> {
    banner: Option<N>,
}

impl<N> Default for CheckoutWarning<N> {
    fn default() -> Self {
        Self { banner: None }
    }
}

impl<N: Clone + PartialEq> CheckoutWarning<N> {
    pub fn is_shown(&self) -> bool {
        self.banner.is_some()
    }

    /// Insert the banner once. A banner already on the page is adopted
    /// instead of duplicated. Returns whether a banner was inserted.
    pub fn ensure<P: Page<Node = N>>(&mut self, page: &mut P, profile: &SiteProfile) -> bool {
        if self.banner.is_some() {
            return false;
        }
        if let Some(existing) = page.query(&CHECKOUT_WARNING.selector()) {
            self.banner = Some(existing);
            return false;
        }

        let Some(anchor) = page.query(&profile.checkout_anchor) else {
            tracing::debug!("Checkout anchor not found");
            return false;
        };
        self.banner = page.insert_banner(&anchor, &CHECKOUT_WARNING);
        tracing::debug!(shown = self.banner.is_some(), "Checkout warning inserted");
        self.banner.is_some()
    }

    /// Remove the banner if one is shown. Returns whether one was removed.
    pub fn remove<P: Page<Node = N>>(&mut self, page: &mut P) -> bool {
        match self.banner.take() {
            Some(banner) => {
                page.remove(&banner);
                tracing::debug!("Checkout warning removed");
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::page::{Document, MatchContext, NodeId, MARKER_ATTRIBUTE};

    /// Checkout form skeleton matching the default anchor selector.
    fn checkout_page() -> (Document, NodeId) {
        let mut doc = Document::new("/checkout");
        let body = doc.body();
        let app = doc.create_element("div", &[("id", "app")]);
        let wrap = doc.create_element("div", &[("class", "wrap")]);
        let section = doc.create_element("section", &[]);
        let container = doc.create_element("div", &[]);
        let form = doc.create_element("form", &[]);
        let columns = doc.create_element("div", &[]);
        let first = doc.create_element("div", &[]);
        let second = doc.create_element("div", &[]);
        let anchor = doc.create_element("div", &[("class", "box")]);
        doc.append_text(anchor, "Order summary");

        doc.append_child(body, app);
        doc.append_child(app, wrap);
        doc.append_child(wrap, section);
        doc.append_child(section, container);
        doc.append_child(container, form);
        doc.append_child(form, columns);
        doc.append_child(columns, first);
        doc.append_child(columns, second);
        doc.append_child(second, anchor);
        (doc, anchor)
    }

    #[test]
    fn test_banner_prepended_once() {
        let (mut doc, anchor) = checkout_page();
        let profile = SiteProfile::default();
        let mut warning = CheckoutWarning::default();

        assert!(warning.ensure(&mut doc, &profile));
        assert!(!warning.ensure(&mut doc, &profile));
        assert_eq!(doc.query_all("article.message.is-danger").len(), 1);

        let banner = doc.children(&anchor)[0];
        assert_eq!(doc.tag_name(banner), Some("article"));
        let text = doc.text(&banner);
        assert!(text.starts_with("WARNING (PowerKeys)"));
        assert!(text.ends_with("disable this feature."));

        let link = doc.query_within(&banner, "a").unwrap();
        assert_eq!(doc.attribute(link, MARKER_ATTRIBUTE), Some(DISABLE_CONVERSION_ACTION));
    }

    #[test]
    fn test_existing_banner_is_adopted() {
        let (mut doc, _) = checkout_page();
        let profile = SiteProfile::default();
        CheckoutWarning::default().ensure(&mut doc, &profile);

        let mut fresh = CheckoutWarning::default();
        assert!(!fresh.ensure(&mut doc, &profile));
        assert!(fresh.is_shown());
        assert!(fresh.remove(&mut doc));
        assert!(doc.query(&CHECKOUT_WARNING.selector()).is_none());
    }

    #[test]
    fn test_missing_anchor_is_noop() {
        let mut doc = Document::new("/checkout");
        let mut warning = CheckoutWarning::default();
        assert!(!warning.ensure(&mut doc, &SiteProfile::default()));
        assert!(!warning.is_shown());
        assert!(!warning.remove(&mut doc));
    }
}

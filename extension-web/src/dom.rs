//! # Live DOM Adapter
//!
//! [`WebPage`] implements the engine's `Page` trait over the browser's
//! `web_sys::Document`. Elements are the node handles; the converted-price tag
//! is a marker attribute so it survives as long as the element does.
//!
//! DOM calls that throw (invalid selectors, detached nodes) are logged and
//! treated as "no match".

use lib_core::model::page::{Banner, Page, MARKER_ATTRIBUTE};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};

/// Attribute set on elements whose prices were converted.
const CONVERTED_ATTRIBUTE: &str = "data-powerkeys-converted";

/// Marker values of the injected stylesheet slots.
const THEME_SLOT: &str = "theme";
const BORDER_SLOT: &str = "borders";

/// Elements whose text is never shown as page content.
const SKIPPED_TAGS: [&str; 4] = ["SCRIPT", "STYLE", "NOSCRIPT", "TEXTAREA"];

pub struct WebPage {
    document: Document,
}

impl WebPage {
    /// The page this script runs in.
    pub fn current() -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("No document available"))?;
        Ok(Self { document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn logged<T>(result: Result<T, JsValue>, what: &str) -> Option<T> {
        result
            .map_err(|e| log::warn!("DOM call failed ({}): {:?}", what, e))
            .ok()
    }

    fn elements(list: web_sys::NodeList) -> Vec<Element> {
        (0..list.length())
            .filter_map(|idx| list.item(idx))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn slot(&self, tag: &str, marker: &str) -> Option<Element> {
        let selector = format!("{}[{}=\"{}\"]", tag, MARKER_ATTRIBUTE, marker);
        Self::logged(self.document.query_selector(&selector), &selector).flatten()
    }

    fn ensure_slot(&self, tag: &str, marker: &str) -> Option<Element> {
        if let Some(existing) = self.slot(tag, marker) {
            return Some(existing);
        }

        let element = Self::logged(self.document.create_element(tag), tag)?;
        Self::logged(element.set_attribute(MARKER_ATTRIBUTE, marker), marker)?;
        if tag == "link" {
            Self::logged(element.set_attribute("rel", "stylesheet"), "rel")?;
        }

        let head = self.document.head()?;
        Self::logged(head.append_child(&element), "append slot")?;
        Some(element)
    }

    fn create(&self, tag: &str, attributes: &[(&str, &str)], text: Option<&str>) -> Option<Element> {
        let element = Self::logged(self.document.create_element(tag), tag)?;
        for (name, value) in attributes {
            Self::logged(element.set_attribute(name, value), name)?;
        }
        if text.is_some() {
            element.set_text_content(text);
        }
        Some(element)
    }

    fn build_banner(&self, banner: &Banner) -> Option<Element> {
        let article = self.create(
            "article",
            &[("class", banner.class_name), (MARKER_ATTRIBUTE, banner.marker)],
            None,
        )?;

        let header = self.create("div", &[("class", "message-header")], None)?;
        let title = self.create("p", &[], Some(banner.title))?;
        Self::logged(header.append_child(&title), "banner title")?;

        let body = self.create("div", &[("class", "message-body")], Some(banner.body))?;
        let link = self.create(
            "a",
            &[("href", "#"), (MARKER_ATTRIBUTE, banner.action)],
            Some(banner.link_text),
        )?;
        Self::logged(body.append_child(&link), "banner link")?;

        Self::logged(article.append_child(&header), "banner header")?;
        Self::logged(article.append_child(&body), "banner body")?;
        Some(article)
    }
}

impl Page for WebPage {
    type Node = Element;

    fn location_path(&self) -> String {
        self.document
            .location()
            .and_then(|location| location.pathname().ok())
            .unwrap_or_default()
    }

    fn text_elements_containing(&self, needle: &str) -> Vec<Element> {
        let Some(list) = Self::logged(self.document.query_selector_all("body *"), "body *") else {
            return Vec::new();
        };

        Self::elements(list)
            .into_iter()
            .filter(|element| !SKIPPED_TAGS.contains(&element.tag_name().as_str()))
            .filter(|element| !self.is_tagged(element))
            .filter(|element| {
                let children = element.child_nodes();
                (0..children.length())
                    .filter_map(|idx| children.item(idx))
                    .filter(|child| child.node_type() == web_sys::Node::TEXT_NODE)
                    .any(|child| child.node_value().is_some_and(|text| text.contains(needle)))
            })
            .collect()
    }

    fn text(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn own_text(&self, node: &Element) -> String {
        let children = node.child_nodes();
        (0..children.length())
            .filter_map(|idx| children.item(idx))
            .filter(|child| child.node_type() == web_sys::Node::TEXT_NODE)
            .filter_map(|child| child.node_value())
            .collect()
    }

    fn set_text(&mut self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn is_tagged(&self, node: &Element) -> bool {
        node.has_attribute(CONVERTED_ATTRIBUTE)
    }

    fn set_tagged(&mut self, node: &Element, tagged: bool) {
        if tagged {
            Self::logged(node.set_attribute(CONVERTED_ATTRIBUTE, ""), CONVERTED_ATTRIBUTE);
        } else {
            Self::logged(node.remove_attribute(CONVERTED_ATTRIBUTE), CONVERTED_ATTRIBUTE);
        }
    }

    fn contains(&self, ancestor: &Element, node: &Element) -> bool {
        ancestor.contains(Some(node))
    }

    fn query(&self, selector: &str) -> Option<Element> {
        Self::logged(self.document.query_selector(selector), selector).flatten()
    }

    fn query_all(&self, selector: &str) -> Vec<Element> {
        Self::logged(self.document.query_selector_all(selector), selector)
            .map(Self::elements)
            .unwrap_or_default()
    }

    fn query_within(&self, scope: &Element, selector: &str) -> Option<Element> {
        Self::logged(scope.query_selector(selector), selector).flatten()
    }

    fn closest(&self, node: &Element, selector: &str) -> Option<Element> {
        Self::logged(node.closest(selector), selector).flatten()
    }

    fn children(&self, node: &Element) -> Vec<Element> {
        let children = node.children();
        (0..children.length())
            .filter_map(|idx| children.item(idx))
            .collect()
    }

    fn replace_children(&mut self, parent: &Element, children: &[Element]) {
        // Appending an attached node moves it, so this reorders in place
        for child in children {
            Self::logged(parent.append_child(child), "reorder");
        }
    }

    fn style_property(&self, node: &Element, property: &str) -> Option<String> {
        let element = node.dyn_ref::<HtmlElement>()?;
        Self::logged(element.style().get_property_value(property), property)
            .filter(|value| !value.is_empty())
    }

    fn set_display(&mut self, node: &Element, display: &str) {
        let Some(element) = node.dyn_ref::<HtmlElement>() else {
            return;
        };
        let style = element.style();
        if display.is_empty() {
            Self::logged(style.remove_property("display"), "display");
        } else {
            Self::logged(style.set_property("display", display), "display");
        }
    }

    fn stylesheet_href(&self) -> String {
        self.slot("link", THEME_SLOT)
            .and_then(|link| link.get_attribute("href"))
            .unwrap_or_default()
    }

    fn set_stylesheet_href(&mut self, href: &str) {
        if let Some(link) = self.ensure_slot("link", THEME_SLOT) {
            Self::logged(link.set_attribute("href", href), "href");
        }
    }

    fn style_rule(&self) -> Option<String> {
        self.slot("style", BORDER_SLOT)
            .and_then(|style| style.text_content())
            .filter(|rule| !rule.is_empty())
    }

    fn set_style_rule(&mut self, rule: Option<&str>) {
        if let Some(style) = self.ensure_slot("style", BORDER_SLOT) {
            style.set_text_content(Some(rule.unwrap_or_default()));
        }
    }

    fn insert_banner(&mut self, anchor: &Element, banner: &Banner) -> Option<Element> {
        let article = self.build_banner(banner)?;
        Self::logged(anchor.prepend_with_node_1(&article), "banner")?;
        Some(article)
    }

    fn remove(&mut self, node: &Element) {
        node.remove();
    }
}

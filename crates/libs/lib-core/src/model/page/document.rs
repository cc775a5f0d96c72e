//! # Arena Document
//!
//! An owned, mutable element tree implementing [`Page`]. Nodes live in a flat
//! arena and are addressed by [`NodeId`]; detached nodes stay in the arena and
//! simply become unreachable from the root.
//!
//! Used by the native preview tool and by every engine test.
//!
//! ```rust
//! use lib_core::model::page::{Document, Page};
//!
//! let mut doc = Document::new("/");
//! let body = doc.body();
//! let price = doc.create_element("span", &[("class", "price")]);
//! doc.append_child(body, price);
//! doc.append_text(price, "12,99 €");
//!
//! assert_eq!(doc.query(".price"), Some(price));
//! assert_eq!(doc.text(&price), "12,99 €");
//! ```

use super::selector::{MatchContext, SelectorList};
use super::{Banner, Page, MARKER_ATTRIBUTE};

/// Elements whose children are never rendered as page text.
const RAW_TEXT_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

const THEME_SLOT: &str = "theme";
const BORDER_SLOT: &str = "borders";

/// Index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    tagged: bool,
}

impl Element {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
    }

    fn remove_attribute(&mut self, name: &str) {
        self.attributes.retain(|(key, _)| key != name);
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Root,
    Element(Element),
    Text(String),
    Comment(String),
    Doctype(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// Owned element tree.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    path: String,
}

impl Document {
    /// Document with an empty `html > head + body` skeleton.
    pub fn new(path: &str) -> Self {
        let mut doc = Self::empty(path);
        let html = doc.create_element("html", &[]);
        let head = doc.create_element("head", &[]);
        let body = doc.create_element("body", &[]);
        doc.append_child(doc.root(), html);
        doc.append_child(html, head);
        doc.append_child(html, body);
        doc
    }

    /// Document holding only the root node.
    pub fn empty(path: &str) -> Self {
        Self {
            nodes: vec![NodeData {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Root,
            }],
            path: path.to_string(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn set_path(&mut self, path: &str) {
        self.path = path.to_string();
    }

    // region:    --- Construction

    pub fn create_element(&mut self, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        self.push(NodeKind::Element(Element {
            tag: tag.to_ascii_lowercase(),
            attributes: attributes
                .iter()
                .map(|(key, value)| (key.to_ascii_lowercase(), value.to_string()))
                .collect(),
            tagged: false,
        }))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Comment(text.to_string()))
    }

    pub fn create_doctype(&mut self, name: &str) -> NodeId {
        self.push(NodeKind::Doctype(name.to_string()))
    }

    /// Create a text node and append it to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let node = self.create_text(text);
        self.append_child(parent, node);
        node
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(0, child);
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(NodeData {
            parent: None,
            children: Vec::new(),
            kind,
        });
        NodeId(self.nodes.len() - 1)
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|child| *child != node);
        }
    }

    // endregion: --- Construction

    // region:    --- Accessors

    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node.0].kind
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        match &self.nodes[node.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn child_nodes(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node).and_then(|element| element.attribute(name))
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element_mut(node) {
            element.set_attribute(name, value);
        }
    }

    /// First element with the given tag, in document order.
    pub fn first_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.descendant_elements(self.root())
            .into_iter()
            .find(|node| self.tag_name(*node) == Some(tag))
    }

    /// `<head>`, created on demand.
    pub fn head(&mut self) -> NodeId {
        self.ensure_section("head", true)
    }

    /// `<body>`, created on demand.
    pub fn body(&mut self) -> NodeId {
        self.ensure_section("body", false)
    }

    fn ensure_section(&mut self, tag: &str, first: bool) -> NodeId {
        if let Some(node) = self.first_by_tag(tag) {
            return node;
        }
        let html = match self.first_by_tag("html") {
            Some(html) => html,
            None => {
                let html = self.create_element("html", &[]);
                self.append_child(self.root(), html);
                html
            }
        };
        let node = self.create_element(tag, &[]);
        if first {
            self.prepend_child(html, node);
        } else {
            self.append_child(html, node);
        }
        node
    }

    /// Element descendants of `scope` in document order, excluding `scope`.
    fn descendant_elements(&self, scope: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[scope.0].children.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if self.element(node).is_some() {
                found.push(node);
            }
            stack.extend(self.nodes[node.0].children.iter().rev().copied());
        }
        found
    }

    fn text_content(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element(element) if element.tag == "br" => out.push('\n'),
            NodeKind::Element(_) | NodeKind::Root => {
                for child in &self.nodes[node.0].children {
                    self.text_content(*child, out);
                }
            }
            NodeKind::Comment(_) | NodeKind::Doctype(_) => {}
        }
    }

    fn parse_selector(selector: &str) -> Option<SelectorList> {
        match SelectorList::parse(selector) {
            Ok(list) => Some(list),
            Err(e) => {
                tracing::warn!(selector, error = %e, "Ignoring invalid selector");
                None
            }
        }
    }

    fn find_slot(&self, tag: &str, slot: &str) -> Option<NodeId> {
        let head = self.first_by_tag("head")?;
        self.descendant_elements(head).into_iter().find(|node| {
            self.tag_name(*node) == Some(tag) && self.attribute(*node, MARKER_ATTRIBUTE) == Some(slot)
        })
    }

    fn ensure_slot(&mut self, tag: &str, slot: &str, extra: &[(&str, &str)]) -> NodeId {
        if let Some(node) = self.find_slot(tag, slot) {
            return node;
        }
        let mut attributes = vec![(MARKER_ATTRIBUTE, slot)];
        attributes.extend_from_slice(extra);
        let node = self.create_element(tag, &attributes);
        let head = self.head();
        self.append_child(head, node);
        node
    }

    // endregion: --- Accessors

    // region:    --- Serialization

    /// Serialize the reachable tree back to HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for child in &self.nodes[0].children {
            self.write_node(*child, &mut out, false);
        }
        out
    }

    fn write_node(&self, node: NodeId, out: &mut String, raw: bool) {
        match &self.nodes[node.0].kind {
            NodeKind::Root => {}
            NodeKind::Doctype(name) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(name);
                out.push('>');
            }
            NodeKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeKind::Text(text) => {
                if raw {
                    out.push_str(text);
                } else {
                    escape_into(text, false, out);
                }
            }
            NodeKind::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                for (name, value) in &element.attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(value, true, out);
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&element.tag.as_str()) {
                    return;
                }
                let raw = RAW_TEXT_ELEMENTS.contains(&element.tag.as_str());
                for child in &self.nodes[node.0].children {
                    self.write_node(*child, out, raw);
                }
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }

    // endregion: --- Serialization
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

/// Split an inline `style` attribute into `(property, value)` pairs.
fn style_declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|declaration| {
            let (property, value) = declaration.split_once(':')?;
            let property = property.trim().to_ascii_lowercase();
            if property.is_empty() {
                return None;
            }
            Some((property, value.trim().to_string()))
        })
        .collect()
}

impl MatchContext for Document {
    type Id = NodeId;

    fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|element| element.tag.as_str())
    }

    fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        Document::attribute(self, id, name)
    }

    fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|parent| self.element(*parent).is_some())
    }

    fn element_index(&self, id: NodeId) -> usize {
        let Some(parent) = self.parent(id) else {
            return 1;
        };
        self.nodes[parent.0]
            .children
            .iter()
            .filter(|child| self.element(**child).is_some())
            .position(|child| *child == id)
            .map(|index| index + 1)
            .unwrap_or(1)
    }
}

impl Page for Document {
    type Node = NodeId;

    fn location_path(&self) -> String {
        self.path.clone()
    }

    fn text_elements_containing(&self, needle: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(node) = stack.pop() {
            let Some(element) = self.element(node) else {
                stack.extend(self.nodes[node.0].children.iter().rev().copied());
                continue;
            };
            if RAW_TEXT_ELEMENTS.contains(&element.tag.as_str()) {
                continue;
            }
            let own_text_matches = self.nodes[node.0].children.iter().any(|child| {
                matches!(&self.nodes[child.0].kind, NodeKind::Text(text) if text.contains(needle))
            });
            if own_text_matches && !element.tagged {
                found.push(node);
            }
            stack.extend(self.nodes[node.0].children.iter().rev().copied());
        }
        found
    }

    fn text(&self, node: &NodeId) -> String {
        let mut out = String::new();
        self.text_content(*node, &mut out);
        out
    }

    fn own_text(&self, node: &NodeId) -> String {
        self.nodes[node.0]
            .children
            .iter()
            .filter_map(|child| match &self.nodes[child.0].kind {
                NodeKind::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn set_text(&mut self, node: &NodeId, text: &str) {
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
        if !text.is_empty() {
            self.append_text(*node, text);
        }
    }

    fn is_tagged(&self, node: &NodeId) -> bool {
        self.element(*node).map(|element| element.tagged).unwrap_or(false)
    }

    fn set_tagged(&mut self, node: &NodeId, tagged: bool) {
        if let Some(element) = self.element_mut(*node) {
            element.tagged = tagged;
        }
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        let mut current = Some(*node);
        while let Some(id) = current {
            if id == *ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let Some(list) = Self::parse_selector(selector) else {
            return Vec::new();
        };
        self.descendant_elements(self.root())
            .into_iter()
            .filter(|node| list.matches(self, *node))
            .collect()
    }

    fn query_within(&self, scope: &NodeId, selector: &str) -> Option<NodeId> {
        let list = Self::parse_selector(selector)?;
        self.descendant_elements(*scope)
            .into_iter()
            .find(|node| list.matches(self, *node))
    }

    fn closest(&self, node: &NodeId, selector: &str) -> Option<NodeId> {
        let list = Self::parse_selector(selector)?;
        let mut current = Some(*node);
        while let Some(id) = current {
            if self.element(id).is_some() && list.matches(self, id) {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.nodes[node.0]
            .children
            .iter()
            .copied()
            .filter(|child| self.element(*child).is_some())
            .collect()
    }

    fn replace_children(&mut self, parent: &NodeId, children: &[NodeId]) {
        let previous = std::mem::take(&mut self.nodes[parent.0].children);
        for child in previous {
            self.nodes[child.0].parent = None;
        }
        for child in children {
            self.append_child(*parent, *child);
        }
    }

    fn style_property(&self, node: &NodeId, property: &str) -> Option<String> {
        let style = self.attribute(*node, "style")?;
        style_declarations(style)
            .into_iter()
            .rev()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value)
    }

    fn set_display(&mut self, node: &NodeId, display: &str) {
        let mut declarations: Vec<(String, String)> = self
            .attribute(*node, "style")
            .map(style_declarations)
            .unwrap_or_default()
            .into_iter()
            .filter(|(name, _)| name != "display")
            .collect();
        if !display.is_empty() {
            declarations.push(("display".to_string(), display.to_string()));
        }

        let Some(element) = self.element_mut(*node) else {
            return;
        };
        if declarations.is_empty() {
            element.remove_attribute("style");
        } else {
            let style = declarations
                .iter()
                .map(|(name, value)| format!("{}: {};", name, value))
                .collect::<Vec<_>>()
                .join(" ");
            element.set_attribute("style", &style);
        }
    }

    fn stylesheet_href(&self) -> String {
        self.find_slot("link", THEME_SLOT)
            .and_then(|node| self.attribute(node, "href"))
            .unwrap_or_default()
            .to_string()
    }

    fn set_stylesheet_href(&mut self, href: &str) {
        let node = self.ensure_slot("link", THEME_SLOT, &[("rel", "stylesheet")]);
        self.set_attribute(node, "href", href);
    }

    fn style_rule(&self) -> Option<String> {
        let node = self.find_slot("style", BORDER_SLOT)?;
        let text = self.text(&node);
        (!text.is_empty()).then_some(text)
    }

    fn set_style_rule(&mut self, rule: Option<&str>) {
        let node = self.ensure_slot("style", BORDER_SLOT, &[]);
        self.set_text(&node, rule.unwrap_or_default());
    }

    fn insert_banner(&mut self, anchor: &NodeId, banner: &Banner) -> Option<NodeId> {
        let article = self.create_element(
            "article",
            &[("class", banner.class_name), (MARKER_ATTRIBUTE, banner.marker)],
        );

        let header = self.create_element("div", &[("class", "message-header")]);
        let title = self.create_element("p", &[]);
        self.append_text(title, banner.title);
        self.append_child(header, title);

        let body = self.create_element("div", &[("class", "message-body")]);
        self.append_text(body, banner.body);
        let link = self.create_element(
            "a",
            &[("href", "#"), (MARKER_ATTRIBUTE, banner.action)],
        );
        self.append_text(link, banner.link_text);
        self.append_child(body, link);

        self.append_child(article, header);
        self.append_child(article, body);
        self.prepend_child(*anchor, article);
        Some(article)
    }

    fn remove(&mut self, node: &NodeId) {
        self.detach(*node);
    }
}

//! # Page Model
//!
//! The engine never touches a browser DOM directly. Everything it needs from a
//! page goes through the [`Page`] trait:
//!
//! - **Text**: find elements whose own text contains the currency symbol, read
//!   and replace their rendered text, and tag them once converted
//! - **Queries**: selector lookups, scoped lookups and `closest`
//! - **Mutation**: inline `display`, child reordering, the injected stylesheet
//!   link and rule, and the checkout banner
//!
//! ## Implementations
//!
//! - [`Document`] - arena tree used by the preview tool and the tests
//! - `WebPage` in `extension-web` - the live `web_sys::Document`
//!
//! Invalid selectors never abort a pass; implementations log them and report
//! no match.

pub mod document;
#[cfg(feature = "html")]
pub mod html;
pub mod selector;

pub use document::{Document, NodeId};
pub use selector::{MatchContext, SelectorList};

/// Attribute marking every element the extension injects.
pub const MARKER_ATTRIBUTE: &str = "data-powerkeys";

/// Content of an injected warning banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Banner {
    /// Class list of the outer `<article>`
    pub class_name: &'static str,
    pub title: &'static str,
    /// Text preceding the action link
    pub body: &'static str,
    pub link_text: &'static str,
    /// Value of [`MARKER_ATTRIBUTE`] on the banner itself
    pub marker: &'static str,
    /// Value of [`MARKER_ATTRIBUTE`] on the action link; frontends route clicks by it
    pub action: &'static str,
}

impl Banner {
    /// Selector matching an already inserted copy of this banner.
    pub fn selector(&self) -> String {
        format!("[{}=\"{}\"]", MARKER_ATTRIBUTE, self.marker)
    }
}

/// Everything the engine reads from or writes to a page.
pub trait Page {
    /// Element handle; cheap to clone and compare.
    type Node: Clone + PartialEq + std::fmt::Debug;

    /// Path component of the page URL, e.g. `/checkout`.
    fn location_path(&self) -> String;

    // region:    --- Text

    /// Elements with a direct text child containing `needle`, in document
    /// order. Tagged elements are skipped.
    fn text_elements_containing(&self, needle: &str) -> Vec<Self::Node>;

    /// Rendered text of an element.
    fn text(&self, node: &Self::Node) -> String;

    /// Direct text children of an element, concatenated. Descendant
    /// elements contribute nothing.
    fn own_text(&self, node: &Self::Node) -> String;

    /// Replace all children of an element with a single text node.
    fn set_text(&mut self, node: &Self::Node, text: &str);

    fn is_tagged(&self, node: &Self::Node) -> bool;
    fn set_tagged(&mut self, node: &Self::Node, tagged: bool);

    /// Whether `node` is `ancestor` or lies inside it.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;

    // endregion: --- Text

    // region:    --- Queries

    fn query(&self, selector: &str) -> Option<Self::Node>;
    fn query_all(&self, selector: &str) -> Vec<Self::Node>;

    /// First descendant of `scope` matching `selector`.
    fn query_within(&self, scope: &Self::Node, selector: &str) -> Option<Self::Node>;

    /// `node` itself or its nearest ancestor matching `selector`.
    fn closest(&self, node: &Self::Node, selector: &str) -> Option<Self::Node>;

    /// Element children in order.
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Replace the children of `parent` with `children`, in that order.
    fn replace_children(&mut self, parent: &Self::Node, children: &[Self::Node]);

    // endregion: --- Queries

    // region:    --- Styling

    /// Inline style property value, if set.
    fn style_property(&self, node: &Self::Node, property: &str) -> Option<String>;

    /// Set inline `display`; an empty value clears it.
    fn set_display(&mut self, node: &Self::Node, display: &str);

    /// `href` of the injected theme stylesheet link; empty when unset.
    fn stylesheet_href(&self) -> String;
    fn set_stylesheet_href(&mut self, href: &str);

    /// Rule held by the injected style element.
    fn style_rule(&self) -> Option<String>;
    fn set_style_rule(&mut self, rule: Option<&str>);

    // endregion: --- Styling

    // region:    --- Banner

    /// Prepend a banner as the first child of `anchor`; `None` when the page
    /// refused the insertion.
    fn insert_banner(&mut self, anchor: &Self::Node, banner: &Banner) -> Option<Self::Node>;

    fn remove(&mut self, node: &Self::Node);

    // endregion: --- Banner
}

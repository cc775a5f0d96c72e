//! HTML source to [`Document`] via `scraper`.

use super::document::Document;
use scraper::{Html, Node};

impl Document {
    /// Parse an HTML document served at `path`.
    ///
    /// Parsing is lenient; malformed markup is repaired the way browsers do.
    pub fn parse_html(source: &str, path: &str) -> Self {
        let html = Html::parse_document(source);
        let mut doc = Document::empty(path);

        let mut stack: Vec<_> = html
            .tree
            .root()
            .children()
            .map(|child| (child, doc.root()))
            .collect();
        stack.reverse();

        while let Some((node, parent)) = stack.pop() {
            let created = match node.value() {
                Node::Element(element) => {
                    let attributes: Vec<(&str, &str)> = element.attrs().collect();
                    doc.create_element(element.name(), &attributes)
                }
                Node::Text(text) => doc.create_text(text),
                Node::Comment(comment) => doc.create_comment(comment),
                Node::Doctype(doctype) => doc.create_doctype(doctype.name()),
                _ => continue,
            };
            doc.append_child(parent, created);

            let children: Vec<_> = node.children().map(|child| (child, created)).collect();
            stack.extend(children.into_iter().rev());
        }

        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::page::Page;

    #[test]
    fn test_parse_html_builds_tree() {
        let doc = Document::parse_html(
            r#"<!DOCTYPE html><html><head><title>Shop</title></head>
            <body><div class="products"><div class="column"><span class="price">12,99&nbsp;€</span></div></div></body></html>"#,
            "/catalog",
        );

        assert_eq!(doc.location_path(), "/catalog");
        let price = doc.query(".products > .column > .price").unwrap();
        assert_eq!(doc.text(&price), "12,99\u{a0}€");
        assert_eq!(doc.text_elements_containing("€"), vec![price]);
    }

    #[test]
    fn test_parse_html_round_trips_markup() {
        let doc = Document::parse_html(
            "<html><head></head><body><p class=\"a\">x &amp; y</p></body></html>",
            "/",
        );
        assert_eq!(
            doc.to_html(),
            "<html><head></head><body><p class=\"a\">x &amp; y</p></body></html>"
        );
    }
}

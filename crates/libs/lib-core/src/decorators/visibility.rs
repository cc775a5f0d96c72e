//! Out-of-stock and preorder visibility.

use crate::config::SiteProfile;
use crate::model::page::Page;
use shared::dto::settings::Settings;

/// Hide or show the items carrying an out-of-stock or preorder marker.
///
/// On the front page every item stays visible unless `frontPage` is set.
/// Returns the number of item containers set to `display: none`.
pub fn apply_visibility<P: Page>(page: &mut P, profile: &SiteProfile, settings: &Settings) -> usize {
    let on_front_page = profile.is_front_page(&page.location_path());
    let forced_visible = on_front_page && !settings.front_page;

    let hide_out_of_stock = settings.out_of_stock && !forced_visible;
    let hide_preorder = settings.preorder && !forced_visible;

    set_marked_display(page, profile, &profile.out_of_stock_marker, hide_out_of_stock)
        + set_marked_display(page, profile, &profile.preorder_marker, hide_preorder)
}

fn set_marked_display<P: Page>(page: &mut P, profile: &SiteProfile, marker: &str, hide: bool) -> usize {
    let display = if hide { "none" } else { "" };
    let mut hidden = 0;

    for tag in page.query_all(marker) {
        let container = profile
            .item_containers
            .iter()
            .find_map(|selector| page.closest(&tag, selector));

        if let Some(container) = container {
            page.set_display(&container, display);
            if hide {
                hidden += 1;
            }
        }
    }
    hidden
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::page::{Document, NodeId};

    /// One `.column` out of stock, one `.catalog-item` on preorder, one plain.
    fn listing(path: &str) -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new(path);
        let body = doc.body();

        let column = doc.create_element("div", &[("class", "column")]);
        let danger = doc.create_element("span", &[("class", "tag danger")]);
        doc.append_child(column, danger);
        doc.append_child(body, column);

        let item = doc.create_element("div", &[("class", "catalog-item")]);
        let preorder = doc.create_element("span", &[("class", "preorder")]);
        doc.append_child(item, preorder);
        doc.append_child(body, item);

        let plain = doc.create_element("div", &[("class", "column")]);
        doc.append_child(body, plain);

        (doc, column, item, plain)
    }

    fn display(doc: &Document, node: &NodeId) -> Option<String> {
        doc.style_property(node, "display")
    }

    #[test]
    fn test_hides_marked_items() {
        let (mut doc, column, item, plain) = listing("/catalog");
        let settings = Settings {
            out_of_stock: true,
            preorder: true,
            ..Settings::default()
        };

        assert_eq!(apply_visibility(&mut doc, &SiteProfile::default(), &settings), 2);
        assert_eq!(display(&doc, &column).as_deref(), Some("none"));
        assert_eq!(display(&doc, &item).as_deref(), Some("none"));
        assert_eq!(display(&doc, &plain), None);
    }

    #[test]
    fn test_toggling_off_restores_items() {
        let (mut doc, column, _, _) = listing("/catalog");
        let profile = SiteProfile::default();
        let mut settings = Settings {
            out_of_stock: true,
            ..Settings::default()
        };
        apply_visibility(&mut doc, &profile, &settings);

        settings.out_of_stock = false;
        assert_eq!(apply_visibility(&mut doc, &profile, &settings), 0);
        assert_eq!(display(&doc, &column), None);
    }

    #[test]
    fn test_front_page_forced_visible() {
        let (mut doc, column, _, _) = listing("/");
        let profile = SiteProfile::default();
        let mut settings = Settings {
            out_of_stock: true,
            ..Settings::default()
        };

        assert_eq!(apply_visibility(&mut doc, &profile, &settings), 0);
        assert_eq!(display(&doc, &column), None);

        settings.front_page = true;
        assert_eq!(apply_visibility(&mut doc, &profile, &settings), 1);
        assert_eq!(display(&doc, &column).as_deref(), Some("none"));
    }
}

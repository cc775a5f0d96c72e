//! Product list sorting.

use crate::config::SiteProfile;
use crate::model::page::Page;
use shared::dto::settings::{SortBy, SortOrder};
use shared::utils::parse_leading_float;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Number(f64),
    Text(String),
    Missing,
}

impl SortKey {
    /// Present keys in `order`, missing keys last in either direction.
    fn compare(&self, other: &SortKey, order: SortOrder) -> Ordering {
        let ordering = match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Missing, SortKey::Missing) => return Ordering::Equal,
            (SortKey::Missing, _) => return Ordering::Greater,
            (_, SortKey::Missing) => return Ordering::Less,
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
        };
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

/// Sort the first product list found on the page.
///
/// Only children holding a price field take part; they are stably sorted and
/// placed first, followed by the remaining children in their original order.
/// Returns the number of sorted items, or `None` when there is no list or no
/// priced item.
pub fn sort_products<P: Page>(
    page: &mut P,
    profile: &SiteProfile,
    by: SortBy,
    order: SortOrder,
) -> Option<usize> {
    let list = profile
        .sort_containers
        .iter()
        .find_map(|selector| page.query(selector))?;

    let (priced, others): (Vec<P::Node>, Vec<P::Node>) = page
        .children(&list)
        .into_iter()
        .partition(|child| page.query_within(child, &profile.price_field).is_some());

    if priced.is_empty() {
        return None;
    }

    let mut keyed: Vec<(SortKey, P::Node)> = priced
        .into_iter()
        .map(|item| (sort_key(page, profile, &item, by), item))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| a.compare(b, order));

    let sorted = keyed.len();
    let children: Vec<P::Node> = keyed
        .into_iter()
        .map(|(_, item)| item)
        .chain(others)
        .collect();
    page.replace_children(&list, &children);

    tracing::debug!(sorted, ?by, ?order, "Products sorted");
    Some(sorted)
}

fn sort_key<P: Page>(page: &P, profile: &SiteProfile, item: &P::Node, by: SortBy) -> SortKey {
    let key = match by {
        SortBy::Price => page
            .query_within(item, &profile.price_field)
            .and_then(|field| parse_leading_float(&page.text(&field).replacen(',', ".", 1)))
            .map(SortKey::Number),
        SortBy::Name => page
            .query_within(item, &profile.name_field)
            .map(|field| SortKey::Text(page.text(&field))),
        SortBy::Rating => page
            .query_within(item, &profile.rating_field)
            .and_then(|field| page.style_property(&field, "width"))
            .and_then(|width| parse_leading_float(&width))
            .map(SortKey::Number),
    };
    key.unwrap_or(SortKey::Missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::page::{Document, NodeId};

    /// `.products` list with (name, price, rating) items plus an unpriced banner.
    fn products(items: &[(&str, &str, &str)]) -> (Document, NodeId) {
        let mut doc = Document::new("/catalog");
        let body = doc.body();
        let list = doc.create_element("div", &[("class", "products")]);
        doc.append_child(body, list);

        let banner = doc.create_element("div", &[("class", "promo")]);
        doc.append_child(list, banner);

        for (name, price, rating) in items {
            let item = doc.create_element("div", &[("class", "column")]);
            let name_el = doc.create_element("p", &[("class", "name")]);
            doc.append_text(name_el, name);
            let price_el = doc.create_element("span", &[("class", "price")]);
            doc.append_text(price_el, price);
            let style = format!("width: {}", rating);
            let rating_el = doc.create_element("div", &[("class", "progresz"), ("style", style.as_str())]);
            doc.append_child(item, name_el);
            doc.append_child(item, price_el);
            doc.append_child(item, rating_el);
            doc.append_child(list, item);
        }
        (doc, list)
    }

    fn names(doc: &Document, list: &NodeId) -> Vec<String> {
        doc.children(list)
            .iter()
            .map(|item| {
                doc.query_within(item, ".name")
                    .map(|name| doc.text(&name))
                    .unwrap_or_else(|| "-".to_string())
            })
            .collect()
    }

    fn sample() -> (Document, NodeId) {
        products(&[
            ("Beta", "20,00 €", "40%"),
            ("Alpha", "5,50 €", "90%"),
            ("Gamma", "12,99 €", "60%"),
        ])
    }

    #[test]
    fn test_sort_by_price() {
        let (mut doc, list) = sample();
        let profile = SiteProfile::default();

        let sorted = sort_products(&mut doc, &profile, SortBy::Price, SortOrder::Ascending);
        assert_eq!(sorted, Some(3));
        assert_eq!(names(&doc, &list), vec!["Alpha", "Gamma", "Beta", "-"]);

        sort_products(&mut doc, &profile, SortBy::Price, SortOrder::Descending);
        assert_eq!(names(&doc, &list), vec!["Beta", "Gamma", "Alpha", "-"]);
    }

    #[test]
    fn test_sort_by_name_and_rating() {
        let (mut doc, list) = sample();
        let profile = SiteProfile::default();

        sort_products(&mut doc, &profile, SortBy::Name, SortOrder::Descending);
        assert_eq!(names(&doc, &list), vec!["Gamma", "Beta", "Alpha", "-"]);

        sort_products(&mut doc, &profile, SortBy::Rating, SortOrder::Descending);
        assert_eq!(names(&doc, &list), vec!["Alpha", "Gamma", "Beta", "-"]);
    }

    #[test]
    fn test_converted_prices_still_sort() {
        let (mut doc, list) = products(&[("A", "22,00 USD", "1%"), ("B", "3,30 USD", "1%")]);
        sort_products(&mut doc, &SiteProfile::default(), SortBy::Price, SortOrder::Ascending);
        assert_eq!(names(&doc, &list), vec!["B", "A", "-"]);
    }

    #[test]
    fn test_unparseable_keys_sort_last() {
        let (mut doc, list) = products(&[("A", "call us", "1%"), ("B", "3,30 €", "1%")]);
        let profile = SiteProfile::default();

        sort_products(&mut doc, &profile, SortBy::Price, SortOrder::Descending);
        assert_eq!(names(&doc, &list), vec!["B", "A", "-"]);
    }

    #[test]
    fn test_missing_container_is_noop() {
        let mut doc = Document::new("/");
        assert_eq!(
            sort_products(&mut doc, &SiteProfile::default(), SortBy::Price, SortOrder::Ascending),
            None
        );
    }
}

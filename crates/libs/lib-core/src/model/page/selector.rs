//! # CSS Selectors
//!
//! The subset of CSS selectors the site profile uses:
//!
//! - type (`div`), universal (`*`), `#id`, `.class`
//! - attribute presence and equality (`[data-x]`, `[data-x="y"]`)
//! - `:nth-child(n)` with a plain index, and `:first-child`
//! - descendant (whitespace) and child (`>`) combinators
//! - comma-separated lists
//!
//! Matching runs right to left against any tree implementing [`MatchContext`].

use crate::error::{AppError, Result};
use std::iter::Peekable;
use std::str::Chars;

/// Read-only element access needed for matching.
pub trait MatchContext {
    type Id: Copy;

    fn tag_name(&self, id: Self::Id) -> Option<&str>;
    fn attribute(&self, id: Self::Id, name: &str) -> Option<&str>;
    fn parent_element(&self, id: Self::Id) -> Option<Self::Id>;

    /// 1-based position among element siblings.
    fn element_index(&self, id: Self::Id) -> usize;

    fn has_class(&self, id: Self::Id, class: &str) -> bool {
        self.attribute(id, "class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeSelector {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CompoundSelector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeSelector>,
    nth_child: Option<usize>,
}

/// Compounds joined by combinators; `combinators[i]` sits between
/// `compounds[i]` and `compounds[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ComplexSelector {
    compounds: Vec<CompoundSelector>,
    combinators: Vec<Combinator>,
}

/// A parsed, comma-separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// Parse a selector list.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Selector`] for empty input, dangling combinators,
    /// unsupported pseudo-classes and unterminated brackets.
    pub fn parse(input: &str) -> Result<Self> {
        let mut parser = Parser {
            input,
            chars: input.chars().peekable(),
        };
        parser.parse_list()
    }

    /// Whether `id` matches any selector in the list.
    pub fn matches<C: MatchContext>(&self, ctx: &C, id: C::Id) -> bool {
        self.selectors
            .iter()
            .any(|selector| matches_from(ctx, selector, selector.compounds.len() - 1, id))
    }
}

fn matches_from<C: MatchContext>(
    ctx: &C,
    selector: &ComplexSelector,
    index: usize,
    id: C::Id,
) -> bool {
    if !matches_compound(ctx, &selector.compounds[index], id) {
        return false;
    }
    if index == 0 {
        return true;
    }

    match selector.combinators[index - 1] {
        Combinator::Child => ctx
            .parent_element(id)
            .map(|parent| matches_from(ctx, selector, index - 1, parent))
            .unwrap_or(false),
        Combinator::Descendant => {
            let mut ancestor = ctx.parent_element(id);
            while let Some(current) = ancestor {
                if matches_from(ctx, selector, index - 1, current) {
                    return true;
                }
                ancestor = ctx.parent_element(current);
            }
            false
        }
    }
}

fn matches_compound<C: MatchContext>(ctx: &C, compound: &CompoundSelector, id: C::Id) -> bool {
    let Some(tag) = ctx.tag_name(id) else {
        return false;
    };

    if let Some(expected) = &compound.tag {
        if !tag.eq_ignore_ascii_case(expected) {
            return false;
        }
    }
    if let Some(expected) = &compound.id {
        if ctx.attribute(id, "id") != Some(expected.as_str()) {
            return false;
        }
    }
    if !compound.classes.iter().all(|class| ctx.has_class(id, class)) {
        return false;
    }
    for attribute in &compound.attributes {
        match (ctx.attribute(id, &attribute.name), &attribute.value) {
            (None, _) => return false,
            (Some(actual), Some(expected)) if actual != expected => return false,
            _ => {}
        }
    }
    if let Some(n) = compound.nth_child {
        if ctx.element_index(id) != n {
            return false;
        }
    }
    true
}

// region:    --- Parser

struct Parser<'a> {
    input: &'a str,
    chars: Peekable<Chars<'a>>,
}

impl Parser<'_> {
    fn error(&self, reason: &str) -> AppError {
        AppError::Selector(format!("'{}': {}", self.input, reason))
    }

    fn parse_list(&mut self) -> Result<SelectorList> {
        let mut selectors = vec![self.parse_complex()?];
        while self.chars.peek() == Some(&',') {
            self.chars.next();
            selectors.push(self.parse_complex()?);
        }
        Ok(SelectorList { selectors })
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector> {
        let mut compounds = Vec::new();
        let mut combinators = Vec::new();
        let mut pending: Option<Combinator> = None;

        loop {
            let had_space = self.skip_whitespace();
            match self.chars.peek() {
                None | Some(',') => break,
                Some('>') => {
                    if compounds.is_empty() || pending == Some(Combinator::Child) {
                        return Err(self.error("unexpected '>'"));
                    }
                    self.chars.next();
                    pending = Some(Combinator::Child);
                }
                Some(_) => {
                    if !compounds.is_empty() {
                        let combinator = match pending.take() {
                            Some(combinator) => combinator,
                            None if had_space => Combinator::Descendant,
                            None => return Err(self.error("unexpected character")),
                        };
                        combinators.push(combinator);
                    }
                    compounds.push(self.parse_compound()?);
                }
            }
        }

        if compounds.is_empty() {
            return Err(self.error("empty selector"));
        }
        if pending.is_some() {
            return Err(self.error("dangling combinator"));
        }
        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector> {
        let mut compound = CompoundSelector::default();
        let mut parsed_any = false;

        match self.chars.peek() {
            Some('*') => {
                self.chars.next();
                parsed_any = true;
            }
            Some(c) if is_ident_char(*c) => {
                compound.tag = Some(self.ident()?.to_ascii_lowercase());
                parsed_any = true;
            }
            _ => {}
        }

        while let Some(&c) = self.chars.peek() {
            match c {
                '#' => {
                    self.chars.next();
                    compound.id = Some(self.ident()?);
                }
                '.' => {
                    self.chars.next();
                    compound.classes.push(self.ident()?);
                }
                '[' => {
                    self.chars.next();
                    compound.attributes.push(self.attribute()?);
                }
                ':' => {
                    self.chars.next();
                    compound.nth_child = Some(self.pseudo_class()?);
                }
                _ => break,
            }
            parsed_any = true;
        }

        if !parsed_any {
            return Err(self.error("expected a selector"));
        }
        Ok(compound)
    }

    fn pseudo_class(&mut self) -> Result<usize> {
        let name = self.ident()?;
        match name.as_str() {
            "first-child" => Ok(1),
            "nth-child" => {
                if self.chars.next() != Some('(') {
                    return Err(self.error("expected '(' after :nth-child"));
                }
                let argument = self.take_until(')')?;
                argument
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| self.error("unsupported :nth-child argument"))
            }
            other => Err(self.error(&format!("unsupported pseudo-class :{}", other))),
        }
    }

    fn attribute(&mut self) -> Result<AttributeSelector> {
        let body = self.take_until(']')?;
        let (name, value) = match body.split_once('=') {
            Some((name, value)) => {
                let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
                (name.trim(), Some(value.to_string()))
            }
            None => (body.trim(), None),
        };
        if name.is_empty() || !name.chars().all(is_ident_char) {
            return Err(self.error("invalid attribute selector"));
        }
        Ok(AttributeSelector {
            name: name.to_ascii_lowercase(),
            value,
        })
    }

    fn ident(&mut self) -> Result<String> {
        let mut ident = String::new();
        while let Some(&c) = self.chars.peek() {
            if !is_ident_char(c) {
                break;
            }
            ident.push(c);
            self.chars.next();
        }
        if ident.is_empty() {
            return Err(self.error("expected an identifier"));
        }
        Ok(ident)
    }

    fn take_until(&mut self, close: char) -> Result<String> {
        let mut body = String::new();
        for c in self.chars.by_ref() {
            if c == close {
                return Ok(body);
            }
            body.push(c);
        }
        Err(self.error(&format!("missing '{}'", close)))
    }

    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while matches!(self.chars.peek(), Some(c) if c.is_whitespace()) {
            self.chars.next();
            skipped = true;
        }
        skipped
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

// endregion: --- Parser

#[cfg(test)]
mod tests {
    use super::*;

    /// Flat test tree: (tag, attributes, parent)
    struct Tree(Vec<(&'static str, Vec<(&'static str, &'static str)>, Option<usize>)>);

    impl MatchContext for Tree {
        type Id = usize;

        fn tag_name(&self, id: usize) -> Option<&str> {
            Some(self.0[id].0)
        }

        fn attribute(&self, id: usize, name: &str) -> Option<&str> {
            self.0[id]
                .1
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value)
        }

        fn parent_element(&self, id: usize) -> Option<usize> {
            self.0[id].2
        }

        fn element_index(&self, id: usize) -> usize {
            let parent = self.0[id].2;
            self.0[..=id].iter().filter(|node| node.2 == parent).count()
        }
    }

    fn tree() -> Tree {
        Tree(vec![
            ("div", vec![("id", "app")], None),                      // 0
            ("div", vec![("class", "wrap")], Some(0)),               // 1
            ("section", vec![("class", "catalog")], Some(1)),        // 2
            ("div", vec![("class", "columns")], Some(2)),            // 3
            ("div", vec![("class", "column is-3")], Some(3)),        // 4
            ("div", vec![("class", "column is-3")], Some(3)),        // 5
            ("span", vec![("class", "price"), ("data-x", "1")], Some(5)), // 6
        ])
    }

    fn matches(selector: &str, id: usize) -> bool {
        SelectorList::parse(selector).unwrap().matches(&tree(), id)
    }

    #[test]
    fn test_simple_selectors() {
        assert!(matches("div", 0));
        assert!(matches("#app", 0));
        assert!(matches(".column", 4));
        assert!(matches("div.column.is-3", 4));
        assert!(matches("*", 6));
        assert!(!matches("span", 0));
        assert!(!matches(".col", 4));
    }

    #[test]
    fn test_combinators() {
        assert!(matches("#app > div.wrap > section.catalog > div.columns", 3));
        assert!(matches("#app .price", 6));
        assert!(!matches("#app > .price", 6));
        assert!(matches("section>div>div>span", 6));
    }

    #[test]
    fn test_nth_child_and_attributes() {
        assert!(matches("div.column:nth-child(2)", 5));
        assert!(!matches("div.column:nth-child(2)", 4));
        assert!(matches(".column:first-child", 4));
        assert!(matches("[data-x]", 6));
        assert!(matches("span[data-x=\"1\"]", 6));
        assert!(!matches("span[data-x=2]", 6));
    }

    #[test]
    fn test_selector_list() {
        assert!(matches(".products, .columns", 3));
        assert!(matches(".image > img, span.price", 6));
    }

    #[test]
    fn test_invalid_selectors() {
        for input in ["", "  ", "div >", "> div", "a > > b", ":hover", "div:nth-child(x)", "[x", ".", "div,"] {
            assert!(
                matches!(SelectorList::parse(input), Err(AppError::Selector(_))),
                "expected '{}' to be rejected",
                input
            );
        }
    }
}

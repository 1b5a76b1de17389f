//! Compound selectors.
//!
//! Only simple compound selectors are supported: an optional tag name (or
//! `*`) followed by any number of `#id`, `.class`, `[attr]` and
//! `[attr="value"]` parts. Combinators and pseudo-classes are rejected.

use smallvec::SmallVec;

use super::node::Node;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Id(String),
    Class(String),
    Attribute { name: String, value: Option<String> },
}

/// A parsed compound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    parts: SmallVec<[Part; 2]>,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

impl Selector {
    /// Parse a selector string.
    pub fn parse(source: &str) -> Result<Self> {
        let invalid = || Error::InvalidSelector {
            selector: source.to_string(),
        };

        let input = source.trim();
        if input.is_empty() {
            return Err(invalid());
        }

        let mut chars = input.chars().peekable();
        let mut tag = None;
        let mut parts = SmallVec::new();

        let ident = |chars: &mut std::iter::Peekable<std::str::Chars<'_>>| -> String {
            let mut out = String::new();
            while let Some(c) = chars.peek().copied().filter(|c| is_ident_char(*c)) {
                out.push(c);
                chars.next();
            }
            out
        };

        if chars.peek() == Some(&'*') {
            chars.next();
        } else if chars.peek().is_some_and(|c| is_ident_char(*c)) {
            tag = Some(ident(&mut chars).to_ascii_lowercase());
        }

        while let Some(c) = chars.next() {
            match c {
                '#' | '.' => {
                    let name = ident(&mut chars);
                    if name.is_empty() {
                        return Err(invalid());
                    }
                    parts.push(if c == '#' {
                        Part::Id(name)
                    } else {
                        Part::Class(name)
                    });
                }
                '[' => {
                    let name = ident(&mut chars).to_ascii_lowercase();
                    if name.is_empty() {
                        return Err(invalid());
                    }
                    let value = match chars.next() {
                        Some(']') => None,
                        Some('=') => {
                            let quote = chars.peek().copied().filter(|q| *q == '"' || *q == '\'');
                            let mut value = String::new();
                            if let Some(quote) = quote {
                                chars.next();
                                loop {
                                    match chars.next() {
                                        Some(c) if c == quote => break,
                                        Some(c) => value.push(c),
                                        None => return Err(invalid()),
                                    }
                                }
                            } else {
                                value = ident(&mut chars);
                            }
                            if chars.next() != Some(']') {
                                return Err(invalid());
                            }
                            Some(value)
                        }
                        _ => return Err(invalid()),
                    };
                    parts.push(Part::Attribute { name, value });
                }
                _ => return Err(invalid()),
            }
        }

        Ok(Self { tag, parts })
    }

    /// Whether `node` is an element matching this selector.
    pub fn matches(&self, node: &Node) -> bool {
        let Some(tag) = node.tag() else {
            return false;
        };
        if self.tag.as_ref().is_some_and(|wanted| *wanted != tag) {
            return false;
        }

        self.parts.iter().all(|part| match part {
            Part::Id(id) => node.attribute("id").as_deref() == Some(id.as_str()),
            Part::Class(class) => node
                .attribute("class")
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == class)),
            Part::Attribute { name, value } => match (node.attribute(name), value) {
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == *expected,
                (None, _) => false,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    fn first(doc: &Document, selector: &str) -> Option<String> {
        doc.query_selector(selector)
            .unwrap()
            .map(|node| node.outer_html())
    }

    #[test]
    fn matches_by_tag_id_and_class() {
        let doc = Document::parse(r#"<p class="x y">1</p><p id="two">2</p>"#).unwrap();

        assert_eq!(first(&doc, "p").as_deref(), Some(r#"<p class="x y">1</p>"#));
        assert_eq!(first(&doc, "#two").as_deref(), Some(r#"<p id="two">2</p>"#));
        assert_eq!(first(&doc, "p.y").as_deref(), Some(r#"<p class="x y">1</p>"#));
        assert_eq!(first(&doc, "span"), None);
    }

    #[test]
    fn matches_attributes() {
        let doc = Document::parse(r#"<a ref="t-1">x</a><a data-on>y</a>"#).unwrap();

        assert_eq!(first(&doc, r#"[ref="t-1"]"#).as_deref(), Some(r#"<a ref="t-1">x</a>"#));
        assert_eq!(first(&doc, "a[data-on]").as_deref(), Some("<a data-on>y</a>"));
        assert_eq!(first(&doc, "[ref=t-2]"), None);
    }

    #[test]
    fn query_all_returns_document_order() {
        let doc = Document::parse("<ul><li>1</li><li>2</li></ul><li>3</li>").unwrap();
        let items = doc.query_selector_all("li").unwrap();
        let texts: Vec<_> = items.iter().map(|n| n.text_content()).collect();
        assert_eq!(texts, vec!["1", "2", "3"]);
    }

    #[test]
    fn rejects_combinators() {
        for bad in ["", "div p", "a > b", "p:hover", "[x", ".", "#"] {
            assert!(
                matches!(Selector::parse(bad), Err(Error::InvalidSelector { .. })),
                "{bad:?} should be rejected"
            );
        }
    }
}

//! HTML fragment parsing.
//!
//! Markup is parsed with `tl` and copied into the document arena as a
//! detached [`NodeKind::Fragment`]. Whitespace text is kept so that
//! serializing a parsed fragment round-trips the source markup.

use tracing::trace;

use super::document::Document;
use super::node::{Node, NodeId, NodeKind};
use crate::error::{Error, Result};

impl Document {
    /// Parse `html` into a detached fragment owned by this document.
    pub fn parse_fragment(&self, html: &str) -> Result<Node> {
        let dom = tl::parse(html, tl::ParserOptions::default()).map_err(|err| Error::HtmlParse {
            reason: format!("{err:?}"),
        })?;
        let parser = dom.parser();

        let fragment = self.create_fragment();
        for handle in dom.children() {
            self.copy_node(*handle, parser, fragment.id);
        }

        trace!(nodes = fragment.children().len(), "parsed fragment");
        Ok(fragment)
    }

    fn copy_node(&self, handle: tl::NodeHandle, parser: &tl::Parser, parent: NodeId) {
        let Some(node) = handle.get(parser) else {
            return;
        };

        let kind = match node {
            tl::Node::Tag(tag) => {
                let mut kind = NodeKind::element(&tag.name().as_utf8_str());
                if let NodeKind::Element { attributes, .. } = &mut kind {
                    for (name, value) in tag.attributes().iter() {
                        let value = value.map(|v| v.to_string()).unwrap_or_default();
                        attributes.insert(name.to_ascii_lowercase(), value);
                    }
                }
                kind
            }
            tl::Node::Raw(bytes) => NodeKind::Text(bytes.as_utf8_str().to_string()),
            tl::Node::Comment(bytes) => NodeKind::Comment(comment_body(&bytes.as_utf8_str())),
        };

        let id = {
            let mut tree = self.tree_mut();
            let id = tree.insert(kind);
            tree.insert_before(parent, id, None);
            id
        };

        if let tl::Node::Tag(tag) = node {
            for child in tag.children().top().iter() {
                self.copy_node(*child, parser, id);
            }
        }
    }
}

/// Strip the `<!--` / `-->` delimiters `tl` keeps on comment nodes.
fn comment_body(raw: &str) -> String {
    let body = raw.strip_prefix("<!--").unwrap_or(raw);
    let body = body.strip_suffix("-->").unwrap_or(body);
    body.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_markup() {
        let doc = Document::new();
        let fragment = doc.parse_fragment(r#"<div class="a"><p>hi</p></div>"#).unwrap();

        let children = fragment.children();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].tag().as_deref(), Some("div"));
        assert_eq!(children[0].attribute("class").as_deref(), Some("a"));
        assert_eq!(children[0].text_content(), "hi");
    }

    #[test]
    fn parses_comments_without_delimiters() {
        let doc = Document::new();
        let fragment = doc.parse_fragment("a<!-- marker -->b").unwrap();

        let children = fragment.children();
        assert_eq!(children.len(), 3);
        assert_eq!(children[1].comment_text().as_deref(), Some(" marker "));
    }

    #[test]
    fn fragment_is_detached() {
        let doc = Document::new();
        let fragment = doc.parse_fragment("<span></span>").unwrap();

        assert!(fragment.parent().is_none());
        assert_eq!(fragment.kind(), Some(NodeKind::Fragment));
        assert_eq!(doc.html(), "");
    }

    #[test]
    fn comment_body_strips_delimiters() {
        assert_eq!(comment_body("<!--x-->"), "x");
        assert_eq!(comment_body("x"), "x");
    }
}

//! Document Nodes
//!
//! This module defines the node types that live in a [`Document`] arena and
//! the [`Node`] handle used to address them.

use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use slotmap::new_key_type;
use smallvec::SmallVec;

use super::document::Document;
use super::event::Listener;

new_key_type! {
    /// Arena address of a node inside its document.
    pub struct NodeId;
}

/// Elements whose serialized form has no closing tag.
pub(crate) const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The root of a document.
    Document,

    /// A detached container whose children move out when it is inserted.
    Fragment,

    /// An element with a lowercase tag name and ordered attributes.
    Element {
        tag: String,
        attributes: IndexMap<String, String>,
    },

    /// Raw text.
    Text(String),

    /// A comment. Components use comments as anchors and placeholders.
    Comment(String),
}

impl NodeKind {
    pub(crate) fn element(tag: &str) -> Self {
        NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: IndexMap::new(),
        }
    }

    /// Whether this kind can hold children.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            NodeKind::Document | NodeKind::Fragment | NodeKind::Element { .. }
        )
    }
}

/// A node stored in the arena.
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: SmallVec<[NodeId; 4]>,
    pub(crate) listeners: Vec<Listener>,
}

impl NodeData {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: SmallVec::new(),
            listeners: Vec::new(),
        }
    }
}

/// Handle to a node: the owning document plus the node's arena address.
///
/// Handles are cheap to clone. A handle to a node that has been released
/// behaves like a detached, empty node.
#[derive(Clone)]
pub struct Node {
    pub(crate) document: Document,
    pub(crate) id: NodeId,
}

impl Node {
    pub(crate) fn new(document: Document, id: NodeId) -> Self {
        Self { document, id }
    }

    /// The node's arena address.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The document owning this node.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Whether the node still exists in its document.
    pub fn is_alive(&self) -> bool {
        self.document.contains(self.id)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.document == other.document
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .finish()
    }
}

//! Serializable tree snapshots.
//!
//! A [`NodeSnapshot`] is an owned copy of a subtree, detached from the
//! arena, used for inspection and assertions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::node::{Node, NodeKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeSnapshot {
    Document { children: Vec<NodeSnapshot> },
    Fragment { children: Vec<NodeSnapshot> },
    Element {
        tag: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        attributes: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<NodeSnapshot>,
    },
    Text { text: String },
    Comment { text: String },
}

impl NodeSnapshot {
    /// Serialize to a JSON string.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Node {
    /// Copy this subtree into a [`NodeSnapshot`]. Released nodes snapshot
    /// as an empty fragment.
    pub fn snapshot(&self) -> NodeSnapshot {
        let children = || -> Vec<NodeSnapshot> { self.children().iter().map(Node::snapshot).collect() };
        match self.kind() {
            Some(NodeKind::Document) => NodeSnapshot::Document {
                children: children(),
            },
            Some(NodeKind::Fragment) | None => NodeSnapshot::Fragment {
                children: children(),
            },
            Some(NodeKind::Element { tag, attributes }) => NodeSnapshot::Element {
                tag,
                attributes: attributes.into_iter().collect(),
                children: children(),
            },
            Some(NodeKind::Text(text)) => NodeSnapshot::Text { text },
            Some(NodeKind::Comment(text)) => NodeSnapshot::Comment { text },
        }
    }
}

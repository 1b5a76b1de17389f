//! Fragment construction.
//!
//! Turns filled template [`Content`] into a detached fragment: parses the
//! markup, binds every ref to its element and mounts every child component
//! onto its placeholder comment.
//!
//! Child placeholders are resolved to node handles right after parsing and
//! paired with the recorded children by document order. Nothing is rolled
//! back on failure: refs and children bound before the failing step stay
//! bound.
//!
//! The fragment's top level is recorded as [`Slot`]s before children are
//! mounted. A child mounted at the top level owns its own nodes, which change
//! whenever it re-renders, so the owner tracks the child rather than them.

use tracing::trace;

use super::template::Content;
use super::{Component, MountTarget, CHILD_MARKER};
use crate::dom::{Document, Node};
use crate::error::{Error, Result};

/// Placeholder comments in `root`, in document order.
fn child_markers(root: &Node) -> Vec<Node> {
    let wanted = CHILD_MARKER.trim();
    root.descendants()
        .into_iter()
        .filter(|node| node.comment_text().is_some_and(|text| text.trim() == wanted))
        .collect()
}

/// One top-level entry of a rendered component.
#[derive(Debug, Clone)]
pub(crate) enum Slot {
    /// A node parsed from the component's own markup.
    Node(Node),
    /// A child component mounted directly at the top level.
    Child(Component),
}

#[derive(Debug)]
pub(crate) struct Built {
    pub(crate) fragment: Node,
    pub(crate) slots: Vec<Slot>,
}

pub(crate) fn build(document: &Document, content: &Content) -> Result<Built> {
    let fragment = document.parse_fragment(&content.html)?;

    for (token, reference) in &content.refs {
        let selector = format!("[ref=\"{token}\"]");
        let element = fragment
            .query_selector(&selector)?
            .ok_or_else(|| Error::MissingRefTarget {
                token: token.clone(),
            })?;
        element.remove_attribute("ref");
        reference.bind(Some(element));
    }

    let markers = child_markers(&fragment);
    if markers.len() != content.components.len() {
        return Err(Error::MarkerCountMismatch {
            markers: markers.len(),
            components: content.components.len(),
        });
    }

    let pairs: Vec<(Node, Component)> = markers
        .into_iter()
        .zip(content.components.iter().cloned())
        .collect();

    let slots = fragment
        .children()
        .into_iter()
        .map(|node| match pairs.iter().find(|(marker, _)| *marker == node) {
            Some((_, child)) => Slot::Child(child.clone()),
            None => Slot::Node(node),
        })
        .collect();

    for (marker, child) in pairs {
        child.mount(MountTarget::Node(marker.clone()))?;
        // Replaced by the child's anchor; nothing refers to it any more.
        marker.release();
    }

    trace!(
        refs = content.refs.len(),
        children = content.components.len(),
        "built fragment"
    );
    Ok(Built { fragment, slots })
}

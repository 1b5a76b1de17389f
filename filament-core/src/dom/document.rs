//! Document Arena
//!
//! A [`Document`] owns every node created in it. Nodes are addressed by
//! [`NodeId`] and linked through parent / children edges, maintained in both
//! directions.
//!
//! Tree mutation follows DOM semantics where it matters to components:
//!
//! - inserting a node that already has a parent moves it;
//! - inserting a fragment moves the fragment's children and leaves it empty;
//! - inserting a node into one of its own descendants is refused.

use std::cell::{Ref as BorrowRef, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use slotmap::SlotMap;
use smallvec::SmallVec;
use tracing::warn;

use super::event::{Event, EventHandler, Listener};
use super::node::{Node, NodeData, NodeId, NodeKind, VOID_ELEMENTS};
use super::selector::Selector;
use crate::error::Result;

pub(crate) struct Tree {
    nodes: SlotMap<NodeId, NodeData>,
    root: NodeId,
}

impl Tree {
    fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(NodeData::new(NodeKind::Document));
        Self { nodes, root }
    }

    pub(crate) fn insert(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.insert(NodeData::new(kind))
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id)
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    fn children(&self, id: NodeId) -> SmallVec<[NodeId; 4]> {
        self.nodes
            .get(id)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    /// Unlink `id` from its parent, if it has one.
    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.retain(|child| *child != id);
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = None;
        }
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.parent(node) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    /// Insert `child` into `parent` before `reference`, or at the end when
    /// `reference` is `None` or not a child of `parent`.
    pub(crate) fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        let (Some(parent_node), Some(child_node)) = (self.nodes.get(parent), self.nodes.get(child))
        else {
            return;
        };
        if !parent_node.kind.is_container() || child_node.kind == NodeKind::Document {
            warn!(?parent, ?child, "refusing to insert into a non-container");
            return;
        }
        if self.is_inclusive_ancestor(child, parent) {
            warn!(?parent, ?child, "refusing to insert a node into its own subtree");
            return;
        }
        if reference == Some(child) {
            return;
        }

        let moving: SmallVec<[NodeId; 4]> = if child_node.kind == NodeKind::Fragment {
            child_node.children.clone()
        } else {
            SmallVec::from_elem(child, 1)
        };

        for id in &moving {
            self.detach(*id);
        }

        let Some(parent_node) = self.nodes.get_mut(parent) else {
            return;
        };
        let mut index = reference
            .and_then(|r| parent_node.children.iter().position(|c| *c == r))
            .unwrap_or(parent_node.children.len());
        for id in &moving {
            parent_node.children.insert(index, *id);
            index += 1;
        }
        for id in moving {
            if let Some(node) = self.nodes.get_mut(id) {
                node.parent = Some(parent);
            }
        }
    }

    /// Replace `old` (a child of `parent`) with `new`.
    fn replace_child(&mut self, parent: NodeId, new: NodeId, old: NodeId) {
        if new == old || self.parent(old) != Some(parent) {
            return;
        }
        self.insert_before(parent, new, Some(old));
        self.detach(old);
    }

    /// Pre-order list of the strict descendants of `id`.
    fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).into_iter().rev());
        }
        out
    }

    /// Remove a subtree from the arena.
    fn release(&mut self, id: NodeId) {
        if id == self.root {
            return;
        }
        self.detach(id);
        for descendant in self.descendants(id) {
            self.nodes.remove(descendant);
        }
        self.nodes.remove(id);
    }

    fn text_content(&self, id: NodeId, out: &mut String) {
        match self.nodes.get(id).map(|node| &node.kind) {
            Some(NodeKind::Text(text)) => out.push_str(text),
            Some(NodeKind::Comment(_)) | None => {}
            Some(_) => {
                for child in self.children(id) {
                    self.text_content(child, out);
                }
            }
        }
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Document | NodeKind::Fragment => self.write_children(id, out),
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeKind::Element { tag, attributes } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push(' ');
                    out.push_str(name);
                    if !value.is_empty() {
                        out.push_str("=\"");
                        out.push_str(&value.replace('"', "&quot;"));
                        out.push('"');
                    }
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) && node.children.is_empty() {
                    return;
                }
                self.write_children(id, out);
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    fn write_children(&self, id: NodeId, out: &mut String) {
        for child in self.children(id) {
            self.write_html(child, out);
        }
    }
}

/// A live document tree.
///
/// `Document` is a cheap, cloneable handle; all clones see the same tree.
#[derive(Clone)]
pub struct Document {
    tree: Rc<RefCell<Tree>>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self {
            tree: Rc::new(RefCell::new(Tree::new())),
        }
    }

    /// Create a document whose root holds the parsed `html`.
    pub fn parse(html: &str) -> Result<Self> {
        let document = Self::new();
        let fragment = document.parse_fragment(html)?;
        document.root().append_child(&fragment);
        Ok(document)
    }

    pub(crate) fn tree(&self) -> BorrowRef<'_, Tree> {
        self.tree.borrow()
    }

    pub(crate) fn tree_mut(&self) -> RefMut<'_, Tree> {
        self.tree.borrow_mut()
    }

    pub(crate) fn node(&self, id: NodeId) -> Node {
        Node::new(self.clone(), id)
    }

    fn create(&self, kind: NodeKind) -> Node {
        let id = self.tree_mut().insert(kind);
        self.node(id)
    }

    /// The document root.
    pub fn root(&self) -> Node {
        let root = self.tree().root;
        self.node(root)
    }

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> Node {
        self.create(NodeKind::element(tag))
    }

    /// Create a detached text node.
    pub fn create_text(&self, text: &str) -> Node {
        self.create(NodeKind::Text(text.to_string()))
    }

    /// Create a detached comment node.
    pub fn create_comment(&self, text: &str) -> Node {
        self.create(NodeKind::Comment(text.to_string()))
    }

    /// Create an empty fragment.
    pub fn create_fragment(&self) -> Node {
        self.create(NodeKind::Fragment)
    }

    /// First element in the document matching `selector`.
    pub fn query_selector(&self, selector: &str) -> Result<Option<Node>> {
        self.root().query_selector(selector)
    }

    /// Every element in the document matching `selector`.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Node>> {
        self.root().query_selector_all(selector)
    }

    /// Serialized content of the whole document.
    pub fn html(&self) -> String {
        self.root().inner_html()
    }

    /// Whether `id` still exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.tree().get(id).is_some()
    }

    /// Number of live nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.tree().nodes.len()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.tree, &other.tree)
    }
}

impl Eq for Document {}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("node_count", &self.node_count())
            .finish()
    }
}

impl Node {
    fn same_document(&self, other: &Node) -> bool {
        if self.document == other.document {
            return true;
        }
        warn!("ignoring tree operation across documents");
        false
    }

    /// The node kind, or `None` if the node was released.
    pub fn kind(&self) -> Option<NodeKind> {
        self.document.tree().get(self.id).map(|node| node.kind.clone())
    }

    /// Lowercase tag name for elements.
    pub fn tag(&self) -> Option<String> {
        match self.document.tree().get(self.id).map(|node| &node.kind) {
            Some(NodeKind::Element { tag, .. }) => Some(tag.clone()),
            _ => None,
        }
    }

    /// Whether this is an element.
    pub fn is_element(&self) -> bool {
        self.tag().is_some()
    }

    /// Comment body for comment nodes.
    pub fn comment_text(&self) -> Option<String> {
        match self.document.tree().get(self.id).map(|node| &node.kind) {
            Some(NodeKind::Comment(text)) => Some(text.clone()),
            _ => None,
        }
    }

    /// Parent node, if attached.
    pub fn parent(&self) -> Option<Node> {
        let parent = self.document.tree().parent(self.id)?;
        Some(self.document.node(parent))
    }

    /// Child nodes in order.
    pub fn children(&self) -> Vec<Node> {
        let ids = self.document.tree().children(self.id);
        ids.into_iter().map(|id| self.document.node(id)).collect()
    }

    /// Strict descendants in document order.
    pub fn descendants(&self) -> Vec<Node> {
        let ids = self.document.tree().descendants(self.id);
        ids.into_iter().map(|id| self.document.node(id)).collect()
    }

    /// Append `child`, moving it if it already has a parent.
    pub fn append_child(&self, child: &Node) {
        self.insert_before(child, None);
    }

    /// Insert `child` before `reference`, or append when `reference` is
    /// `None` or not a child of this node.
    pub fn insert_before(&self, child: &Node, reference: Option<&Node>) {
        if !self.same_document(child) {
            return;
        }
        self.document
            .tree_mut()
            .insert_before(self.id, child.id, reference.map(|r| r.id));
    }

    /// Remove `child` if it is a child of this node.
    pub fn remove_child(&self, child: &Node) {
        if child.parent().as_ref() == Some(self) {
            child.remove();
        }
    }

    /// Replace `old` (a child of this node) with `new`.
    pub fn replace_child(&self, new: &Node, old: &Node) {
        if !self.same_document(new) || !self.same_document(old) {
            return;
        }
        self.document.tree_mut().replace_child(self.id, new.id, old.id);
    }

    /// Detach this node from its parent.
    pub fn remove(&self) {
        self.document.tree_mut().detach(self.id);
    }

    /// Detach and free this node and its subtree.
    pub fn release(&self) {
        self.document.tree_mut().release(self.id);
    }

    /// Attribute value on an element.
    pub fn attribute(&self, name: &str) -> Option<String> {
        match self.document.tree().get(self.id).map(|node| &node.kind) {
            Some(NodeKind::Element { attributes, .. }) => attributes.get(name).cloned(),
            _ => None,
        }
    }

    /// All attributes of an element in source order.
    pub fn attributes(&self) -> Vec<(String, String)> {
        match self.document.tree().get(self.id).map(|node| &node.kind) {
            Some(NodeKind::Element { attributes, .. }) => attributes
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Set an attribute on an element.
    pub fn set_attribute(&self, name: &str, value: &str) {
        if let Some(NodeData {
            kind: NodeKind::Element { attributes, .. },
            ..
        }) = self.document.tree_mut().get_mut(self.id)
        {
            attributes.insert(name.to_string(), value.to_string());
        }
    }

    /// Remove an attribute from an element.
    pub fn remove_attribute(&self, name: &str) {
        if let Some(NodeData {
            kind: NodeKind::Element { attributes, .. },
            ..
        }) = self.document.tree_mut().get_mut(self.id)
        {
            attributes.shift_remove(name);
        }
    }

    /// Replace the data of a text or comment node.
    pub fn set_data(&self, data: &str) {
        if let Some(node) = self.document.tree_mut().get_mut(self.id) {
            match &mut node.kind {
                NodeKind::Text(text) | NodeKind::Comment(text) => *text = data.to_string(),
                _ => {}
            }
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.document.tree().text_content(self.id, &mut out);
        out
    }

    /// Serialized children.
    pub fn inner_html(&self) -> String {
        let tree = self.document.tree();
        let mut out = String::new();
        for child in tree.children(self.id) {
            tree.write_html(child, &mut out);
        }
        out
    }

    /// Serialized node, including itself.
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.document.tree().write_html(self.id, &mut out);
        out
    }

    /// First descendant element matching `selector`.
    pub fn query_selector(&self, selector: &str) -> Result<Option<Node>> {
        let selector = Selector::parse(selector)?;
        Ok(self.descendants().into_iter().find(|node| selector.matches(node)))
    }

    /// Every descendant element matching `selector`.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Node>> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants()
            .into_iter()
            .filter(|node| selector.matches(node))
            .collect())
    }

    /// Register an event listener. Registering the same listener twice is a
    /// no-op.
    pub fn add_event_listener(&self, kind: &str, handler: EventHandler, capture: bool) {
        let listener = Listener::new(kind, handler, capture);
        if let Some(node) = self.document.tree_mut().get_mut(self.id) {
            if !node.listeners.iter().any(|l| l.same_as(&listener)) {
                node.listeners.push(listener);
            }
        }
    }

    /// Remove a previously registered listener.
    pub fn remove_event_listener(&self, kind: &str, handler: &EventHandler, capture: bool) {
        let probe = Listener::new(kind, handler.clone(), capture);
        if let Some(node) = self.document.tree_mut().get_mut(self.id) {
            node.listeners.retain(|l| !l.same_as(&probe));
        }
    }

    /// Number of listeners registered on this node.
    pub fn listener_count(&self) -> usize {
        self.document
            .tree()
            .get(self.id)
            .map_or(0, |node| node.listeners.len())
    }

    /// Dispatch an event of type `kind` at this node.
    ///
    /// Capture listeners on ancestors run first (outermost first), then
    /// every listener on the target, then non-capture listeners on
    /// ancestors (innermost first). Returns how many handlers ran.
    pub fn dispatch_event(&self, kind: &str) -> usize {
        let mut ancestors = Vec::new();
        let mut cursor = self.parent();
        while let Some(node) = cursor {
            cursor = node.parent();
            ancestors.push(node);
        }

        let collect = |node: &Node, phase: Option<bool>| -> Vec<EventHandler> {
            node.document
                .tree()
                .get(node.id)
                .map(|data| {
                    data.listeners
                        .iter()
                        .filter(|l| l.kind == kind && phase.map_or(true, |c| l.capture == c))
                        .map(|l| l.handler.clone())
                        .collect()
                })
                .unwrap_or_default()
        };

        let mut handlers = Vec::new();
        for ancestor in ancestors.iter().rev() {
            handlers.extend(collect(ancestor, Some(true)));
        }
        handlers.extend(collect(self, None));
        for ancestor in &ancestors {
            handlers.extend(collect(ancestor, Some(false)));
        }

        let event = Event {
            kind: kind.to_string(),
            target: self.clone(),
        };
        for handler in &handlers {
            handler(&event);
        }
        handlers.len()
    }
}

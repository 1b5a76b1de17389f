//! Components
//!
//! A component is a mountable, renderable unit of live document content.
//! Every component implements [`Lifecycle`]; [`Component`] is the shared,
//! cloneable handle used everywhere else.
//!
//! # Lifecycle
//!
//! ```text
//!   html!(..) ──► mount(target) ──► render() ◄── cell writes
//!                     │    ▲
//!                     ▼    │
//!                  unmount()
//!                     │
//!                     ▼
//!                 destroy()   (terminal)
//! ```
//!
//! Mounting replaces the target node with a persistent anchor comment.
//! Rendered nodes always sit directly before that anchor.

mod deferred;
mod fragment;
mod html;
mod list;
mod props;
mod swap;
mod template;
mod value;

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::dom::{Document, Node};
use crate::error::{Error, Result};

pub use deferred::{Async, Awaitable, Deferred};
pub use html::html;
pub use list::{AnonymousList, Dynamic, Key, Keyed, List};
pub use props::{static_prop, Prop, StaticProp};
pub use swap::Swap;
pub use template::Template;
pub use value::{AnyReactive, ReactiveHandle, Value};

/// Comment text of the anchor a mounted component leaves in the tree.
pub const COMPONENT_MARKER: &str = " filament.component ";

/// Comment text of the placeholder a child component is mounted onto.
pub const CHILD_MARKER: &str = " filament.child-component ";

/// Unique identifier for a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

impl ComponentId {
    /// Generate a new unique component ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ComponentId {
    fn default() -> Self {
        Self::new()
    }
}

/// Where to mount a component.
#[derive(Debug, Clone)]
pub enum MountTarget {
    /// Replace this node.
    Node(Node),
    /// Replace the first element in `document` matching `selector`.
    Selector { document: Document, selector: String },
}

impl MountTarget {
    /// Target the first element matching `selector`.
    pub fn selector(document: &Document, selector: impl Into<String>) -> Self {
        MountTarget::Selector {
            document: document.clone(),
            selector: selector.into(),
        }
    }

    /// Resolve to a concrete node.
    pub fn resolve(self) -> Result<Node> {
        match self {
            MountTarget::Node(node) => Ok(node),
            MountTarget::Selector { document, selector } => document
                .query_selector(&selector)?
                .ok_or(Error::MissingMountNode { selector }),
        }
    }
}

impl From<Node> for MountTarget {
    fn from(node: Node) -> Self {
        MountTarget::Node(node)
    }
}

impl From<&Node> for MountTarget {
    fn from(node: &Node) -> Self {
        MountTarget::Node(node.clone())
    }
}

type Hook = Rc<dyn Fn()>;

/// Callbacks run after mount and unmount.
#[derive(Default)]
pub struct Hooks {
    mounted: RefCell<Vec<Hook>>,
    unmounted: RefCell<Vec<Hook>>,
}

impl Hooks {
    /// Run `f` after every completed mount.
    pub fn mounted<F: Fn() + 'static>(&self, f: F) {
        self.mounted.borrow_mut().push(Rc::new(f));
    }

    /// Run `f` after every completed unmount.
    pub fn unmounted<F: Fn() + 'static>(&self, f: F) {
        self.unmounted.borrow_mut().push(Rc::new(f));
    }

    pub(crate) fn run_mounted(&self) {
        let hooks = self.mounted.borrow().clone();
        hooks.iter().for_each(|hook| hook());
    }

    pub(crate) fn run_unmounted(&self) {
        let hooks = self.unmounted.borrow().clone();
        hooks.iter().for_each(|hook| hook());
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("mounted", &self.mounted.borrow().len())
            .field("unmounted", &self.unmounted.borrow().len())
            .finish()
    }
}

/// The contract every component kind implements.
pub trait Lifecycle {
    /// Replace `target` with this component and render it.
    fn mount(&self, target: MountTarget) -> Result<()>;

    /// Detach from the tree. Subscriptions stay live and a later mount
    /// restores the component.
    fn unmount(&self);

    /// Bring the rendered nodes up to date. A no-op while detached.
    fn render(&self) -> Result<()>;

    /// Release every subscription and child, then unmount. Terminal.
    fn destroy(&self);

    /// Mount / unmount callbacks.
    fn hooks(&self) -> &Hooks;

    /// Whether the component's anchor is attached.
    fn is_mounted(&self) -> bool;

    /// Whether [`destroy`](Self::destroy) has run.
    fn is_destroyed(&self) -> bool;
}

/// Shared handle to a component.
///
/// Clones refer to the same component and compare equal.
#[derive(Clone)]
pub struct Component {
    id: ComponentId,
    inner: Rc<dyn Lifecycle>,
}

impl Component {
    /// Wrap a lifecycle implementation.
    pub fn new<L: Lifecycle + 'static>(lifecycle: L) -> Self {
        Self::from_rc(Rc::new(lifecycle))
    }

    /// Wrap an already shared lifecycle implementation.
    pub fn from_rc(inner: Rc<dyn Lifecycle>) -> Self {
        Self {
            id: ComponentId::new(),
            inner,
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn mount(&self, target: impl Into<MountTarget>) -> Result<()> {
        self.inner.mount(target.into())
    }

    pub fn unmount(&self) {
        self.inner.unmount();
    }

    pub fn render(&self) -> Result<()> {
        self.inner.render()
    }

    pub fn destroy(&self) {
        self.inner.destroy();
    }

    pub fn hooks(&self) -> &Hooks {
        self.inner.hooks()
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.is_mounted()
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.is_destroyed()
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Component {}

impl Hash for Component {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.id)
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

/// The persistent comment a component leaves where it was mounted.
///
/// The node is created lazily in the document of the first mount target
/// and reused for every later mount.
#[derive(Default)]
pub(crate) struct Anchor {
    node: RefCell<Option<Node>>,
}

impl Anchor {
    /// Replace `target` with the anchor. Returns the anchor node.
    pub(crate) fn attach(&self, target: &Node) -> Result<Node> {
        let parent = target.parent().ok_or(Error::OrphanMountNode)?;

        let existing = self.node.borrow().clone();
        let anchor = match existing {
            Some(anchor) if anchor.document() == target.document() => anchor,
            Some(_) => return Err(Error::ForeignDocument),
            None => {
                let anchor = target.document().create_comment(COMPONENT_MARKER);
                *self.node.borrow_mut() = Some(anchor.clone());
                anchor
            }
        };

        parent.replace_child(&anchor, target);
        Ok(anchor)
    }

    pub(crate) fn node(&self) -> Option<Node> {
        self.node.borrow().clone()
    }

    /// The anchor's parent while attached.
    pub(crate) fn parent(&self) -> Option<Node> {
        self.node().and_then(|node| node.parent())
    }

    /// Insert `node` directly before the anchor.
    pub(crate) fn insert_before(&self, node: &Node) {
        if let (Some(anchor), Some(parent)) = (self.node(), self.parent()) {
            parent.insert_before(node, Some(&anchor));
        }
    }

    pub(crate) fn detach(&self) {
        if let Some(anchor) = self.node() {
            anchor.remove();
        }
    }

    pub(crate) fn release(&self) {
        if let Some(anchor) = self.node.borrow_mut().take() {
            anchor.release();
        }
    }
}

/// Insert a fresh child marker before `anchor` and mount `member` onto it.
pub(crate) fn mount_behind(anchor: &Anchor, member: &Component) -> Result<()> {
    let Some(node) = anchor.node() else {
        return Ok(());
    };
    if anchor.parent().is_none() {
        return Ok(());
    }
    let marker = node.document().create_comment(CHILD_MARKER);
    anchor.insert_before(&marker);
    member.mount(marker.clone())?;
    marker.release();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn component_ids_are_unique() {
        let a = ComponentId::new();
        let b = ComponentId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn hooks_run_in_registration_order() {
        let hooks = Hooks::default();
        let order = Rc::new(RefCell::new(Vec::new()));

        for label in ["first", "second"] {
            let order = order.clone();
            hooks.mounted(move || order.borrow_mut().push(label));
        }
        hooks.run_mounted();
        hooks.run_unmounted();

        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn hook_may_register_another_hook() {
        let hooks = Rc::new(Hooks::default());
        let calls = Rc::new(Cell::new(0));

        let hooks_clone = hooks.clone();
        let calls_clone = calls.clone();
        hooks.mounted(move || {
            calls_clone.set(calls_clone.get() + 1);
            hooks_clone.mounted(|| {});
        });
        hooks.run_mounted();

        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn selector_target_reports_missing_node() {
        let doc = Document::parse("<div></div>").unwrap();
        let err = MountTarget::selector(&doc, "#missing").resolve().unwrap_err();
        assert!(matches!(err, Error::MissingMountNode { selector } if selector == "#missing"));
    }

    #[test]
    fn anchor_replaces_target_and_is_reused() {
        let doc = Document::parse("<main><div id=\"a\"></div><div id=\"b\"></div></main>").unwrap();
        let anchor = Anchor::default();

        let a = doc.query_selector("#a").unwrap().unwrap();
        let first = anchor.attach(&a).unwrap();
        assert!(a.parent().is_none());

        let b = doc.query_selector("#b").unwrap().unwrap();
        let second = anchor.attach(&b).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            doc.query_selector("main").unwrap().unwrap().inner_html(),
            "<!-- filament.component -->"
        );
    }

    #[test]
    fn anchor_rejects_orphans_and_foreign_documents() {
        let doc = Document::new();
        let anchor = Anchor::default();
        let orphan = doc.create_element("div");
        assert!(matches!(anchor.attach(&orphan), Err(Error::OrphanMountNode)));

        let target = doc.create_element("div");
        doc.root().append_child(&target);
        anchor.attach(&target).unwrap();

        let other = Document::parse("<p></p>").unwrap();
        let foreign = other.query_selector("p").unwrap().unwrap();
        assert!(matches!(anchor.attach(&foreign), Err(Error::ForeignDocument)));
    }
}

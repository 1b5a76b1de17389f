//! Keyed Lists
//!
//! [`List`] keeps a set of child components in sync with a reactive
//! sequence of [`Keyed`] entries. Each member is mounted behind its own
//! child marker, inserted just before the list's anchor.
//!
//! # Reconciliation
//!
//! On every write of the source:
//!
//! 1. A key that persists keeps the instance mounted for it, even if the
//!    entry now carries a different component.
//! 2. Members whose key disappeared are destroyed ([`Dynamic`] unmounts them
//!    instead), in previous member order.
//! 3. New keys are mounted in source order.
//!
//! Persisting members are never moved, so reordering keys does not reorder
//! the rendered members.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use tracing::{debug, error, warn};

use super::{mount_behind, Anchor, Component, ComponentId, Hooks, Lifecycle, MountTarget};
use crate::error::{Error, Result};
use crate::reactive::{derived, watch, Readable, WatchOptions, Watcher};

/// Identity of a list member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Int(i64),
    Str(Rc<str>),
    /// A unique key from [`Key::symbol`].
    Symbol(u64),
    /// The identity of the member component itself.
    Component(ComponentId),
}

impl Key {
    /// A fresh key equal only to itself.
    pub fn symbol() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Key::Symbol(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl From<i64> for Key {
    fn from(key: i64) -> Self {
        Key::Int(key)
    }
}

impl From<i32> for Key {
    fn from(key: i32) -> Self {
        Key::Int(key.into())
    }
}

impl From<&str> for Key {
    fn from(key: &str) -> Self {
        Key::Str(key.into())
    }
}

impl From<String> for Key {
    fn from(key: String) -> Self {
        Key::Str(key.into())
    }
}

impl From<ComponentId> for Key {
    fn from(id: ComponentId) -> Self {
        Key::Component(id)
    }
}

/// A component paired with its list key.
#[derive(Debug, Clone)]
pub struct Keyed {
    pub key: Key,
    pub component: Component,
}

impl Keyed {
    pub fn new(key: impl Into<Key>, component: Component) -> Self {
        Self {
            key: key.into(),
            component,
        }
    }
}

/// What happens to members whose key disappears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dropped {
    Destroy,
    Unmount,
}

struct ListComponent {
    anchor: Anchor,
    members: RefCell<IndexMap<Key, Component>>,
    dropped: Dropped,
    watcher: RefCell<Option<Watcher>>,
    /// Teardown for derived values created on behalf of this list.
    owned: Vec<Box<dyn Fn()>>,
    destroyed: Cell<bool>,
    hooks: Hooks,
}

impl ListComponent {
    fn create<S>(source: S, dropped: Dropped, owned: Vec<Box<dyn Fn()>>) -> Component
    where
        S: Readable<Vec<Keyed>> + Clone + 'static,
    {
        let list = Rc::new(Self {
            anchor: Anchor::default(),
            members: RefCell::new(IndexMap::new()),
            dropped,
            watcher: RefCell::new(None),
            owned,
            destroyed: Cell::new(false),
            hooks: Hooks::default(),
        });

        let this: Weak<Self> = Rc::downgrade(&list);
        let watcher = watch(
            &source,
            move |next: &Vec<Keyed>, _prev: &Vec<Keyed>| {
                if let Some(list) = this.upgrade() {
                    list.reconcile(next);
                }
            },
            WatchOptions::immediate(),
        );
        *list.watcher.borrow_mut() = Some(watcher);

        let inner: Rc<dyn Lifecycle> = list;
        Component::from_rc(inner)
    }

    fn reconcile(&self, next: &[Keyed]) {
        if self.destroyed.get() {
            return;
        }

        let previous = self.members.borrow().clone();
        let mut members = IndexMap::with_capacity(next.len());
        for item in next {
            if members.contains_key(&item.key) {
                warn!(key = ?item.key, "duplicate list key; keeping the first entry");
                continue;
            }
            let member = previous
                .get(&item.key)
                .cloned()
                .unwrap_or_else(|| item.component.clone());
            members.insert(item.key.clone(), member);
        }
        *self.members.borrow_mut() = members.clone();

        for (key, member) in &previous {
            if members.contains_key(key) {
                continue;
            }
            match self.dropped {
                Dropped::Destroy => member.destroy(),
                Dropped::Unmount => member.unmount(),
            }
        }

        for (key, member) in &members {
            if previous.contains_key(key) {
                continue;
            }
            if let Err(err) = mount_behind(&self.anchor, member) {
                error!(%err, ?key, "failed to mount list member");
            }
        }

        debug!(
            members = members.len(),
            previous = previous.len(),
            "reconciled list"
        );
    }

    fn members(&self) -> Vec<Component> {
        self.members.borrow().values().cloned().collect()
    }
}

impl Lifecycle for ListComponent {
    fn mount(&self, target: MountTarget) -> Result<()> {
        if self.destroyed.get() {
            return Err(Error::Destroyed);
        }
        let target = target.resolve()?;
        self.anchor.attach(&target)?;
        for member in self.members() {
            mount_behind(&self.anchor, &member)?;
        }
        debug!(members = self.members.borrow().len(), "mounted list");
        self.hooks.run_mounted();
        Ok(())
    }

    fn unmount(&self) {
        if self.destroyed.get() {
            return;
        }
        for member in self.members() {
            member.unmount();
        }
        self.anchor.detach();
        debug!("unmounted list");
        self.hooks.run_unmounted();
    }

    fn render(&self) -> Result<()> {
        for member in self.members() {
            member.render()?;
        }
        Ok(())
    }

    fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        if let Some(watcher) = self.watcher.borrow_mut().take() {
            watcher.stop();
        }
        self.owned.iter().for_each(|dispose| dispose());

        let members = self.members.replace(IndexMap::new());
        for member in members.values() {
            member.destroy();
        }
        self.anchor.detach();
        self.hooks.run_unmounted();
        self.anchor.release();
        debug!(members = members.len(), "destroyed list");
    }

    fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    fn is_mounted(&self) -> bool {
        self.anchor.parent().is_some()
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }
}

impl fmt::Debug for ListComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListComponent")
            .field("members", &self.members.borrow().len())
            .field("dropped", &self.dropped)
            .finish()
    }
}

/// A keyed list of components.
///
/// # Example
///
/// ```rust
/// use filament_core::component::{Keyed, List};
/// use filament_core::dom::Document;
/// use filament_core::reactive::Reactive;
/// use filament_core::{html, MountTarget};
///
/// let doc = Document::parse(r#"<ul><li id="items"></li></ul>"#).unwrap();
/// let items = Reactive::new(vec![
///     Keyed::new("a", html!("<li>a</li>")),
///     Keyed::new("b", html!("<li>b</li>")),
/// ]);
///
/// let list = List::new(items.clone());
/// list.mount(MountTarget::selector(&doc, "#items")).unwrap();
/// assert_eq!(doc.query_selector_all("li").unwrap().len(), 2);
/// ```
pub struct List;

impl List {
    /// A list driven by a reactive or derived sequence.
    #[allow(clippy::new_ret_no_self)]
    pub fn new<S>(source: S) -> Component
    where
        S: Readable<Vec<Keyed>> + Clone + 'static,
    {
        ListComponent::create(source, Dropped::Destroy, Vec::new())
    }

    /// A list driven by a function, recomputed whenever a cell it reads
    /// changes.
    pub fn from_fn<F>(items: F) -> Component
    where
        F: Fn() -> Vec<Keyed> + 'static,
    {
        let source = derived(move |_| items());
        let owned = source.clone();
        let dispose: Box<dyn Fn()> = Box::new(move || owned.dispose());
        ListComponent::create(source, Dropped::Destroy, vec![dispose])
    }
}

/// A keyed list whose dropped members are unmounted rather than destroyed,
/// so they can be mounted again elsewhere.
pub struct Dynamic;

impl Dynamic {
    #[allow(clippy::new_ret_no_self)]
    pub fn new<S>(source: S) -> Component
    where
        S: Readable<Vec<Keyed>> + Clone + 'static,
    {
        ListComponent::create(source, Dropped::Unmount, Vec::new())
    }
}

/// A list keyed by component identity.
pub struct AnonymousList;

impl AnonymousList {
    #[allow(clippy::new_ret_no_self)]
    pub fn new<S>(source: S) -> Component
    where
        S: Readable<Vec<Component>> + Clone + 'static,
    {
        Self::from_fn(move || source.get())
    }

    pub fn from_fn<F>(items: F) -> Component
    where
        F: Fn() -> Vec<Component> + 'static,
    {
        let keyed = derived(move |_| {
            items()
                .into_iter()
                .map(|component| Keyed::new(component.id(), component))
                .collect::<Vec<_>>()
        });
        let owned = keyed.clone();
        let dispose: Box<dyn Fn()> = Box::new(move || owned.dispose());
        ListComponent::create(keyed, Dropped::Destroy, vec![dispose])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::html;
    use crate::dom::{Document, Node};
    use crate::reactive::Reactive;

    fn slot() -> (Document, Node) {
        let doc = Document::parse(r#"<ul><li id="slot"></li></ul>"#).unwrap();
        let ul = doc.query_selector("ul").unwrap().unwrap();
        (doc, ul)
    }

    fn item(text: &str) -> Component {
        html(&format!("<li>{text}</li>"), vec![])
    }

    #[test]
    fn mounts_members_in_source_order() {
        let (doc, ul) = slot();
        let items = Reactive::new(vec![Keyed::new(1, item("one")), Keyed::new(2, item("two"))]);
        let list = List::new(items);

        list.mount(MountTarget::selector(&doc, "#slot")).unwrap();

        assert_eq!(ul.text_content(), "onetwo");
    }

    #[test]
    fn persisting_keys_keep_their_instance() {
        let (doc, ul) = slot();
        let (a, b, c) = (item("a"), item("b"), item("c"));
        let items = Reactive::new(vec![Keyed::new("a", a.clone()), Keyed::new("b", b.clone())]);
        let list = List::new(items.clone());
        list.mount(MountTarget::selector(&doc, "#slot")).unwrap();

        items.set(vec![Keyed::new("b", item("b2")), Keyed::new("c", c.clone())]);

        assert!(a.is_destroyed());
        assert!(b.is_mounted());
        assert!(c.is_mounted());
        assert_eq!(ul.text_content(), "bc");
    }

    #[test]
    fn reordering_does_not_move_members() {
        let (doc, ul) = slot();
        let items = Reactive::new(vec![Keyed::new(1, item("1")), Keyed::new(2, item("2"))]);
        let list = List::new(items.clone());
        list.mount(MountTarget::selector(&doc, "#slot")).unwrap();

        items.set(vec![Keyed::new(2, item("x")), Keyed::new(1, item("y"))]);

        assert_eq!(ul.text_content(), "12");
    }

    #[test]
    fn duplicate_keys_keep_the_first_entry() {
        let (doc, ul) = slot();
        let items = Reactive::new(vec![Keyed::new(1, item("first")), Keyed::new(1, item("second"))]);
        let list = List::new(items);
        list.mount(MountTarget::selector(&doc, "#slot")).unwrap();

        assert_eq!(ul.text_content(), "first");
    }

    #[test]
    fn dynamic_unmounts_dropped_members() {
        let (doc, _) = slot();
        let a = item("a");
        let items = Reactive::new(vec![Keyed::new("a", a.clone())]);
        let dynamic = Dynamic::new(items.clone());
        dynamic.mount(MountTarget::selector(&doc, "#slot")).unwrap();

        items.set(Vec::new());

        assert!(!a.is_mounted());
        assert!(!a.is_destroyed());
    }

    #[test]
    fn from_fn_tracks_cells_and_destroy_disposes() {
        let (doc, ul) = slot();
        let count = Reactive::new(1);
        let count_clone = count.clone();
        let list = List::from_fn(move || {
            (0..count_clone.get())
                .map(|i| Keyed::new(i, item(&i.to_string())))
                .collect()
        });
        list.mount(MountTarget::selector(&doc, "#slot")).unwrap();
        assert_eq!(ul.text_content(), "0");

        count.set(3);
        assert_eq!(ul.text_content(), "012");

        list.destroy();
        assert_eq!(count.subscriber_count(), 0);
        assert_eq!(ul.inner_html(), "");
    }

    #[test]
    fn anonymous_list_keys_by_identity() {
        let (doc, ul) = slot();
        let (a, b) = (item("a"), item("b"));
        let items = Reactive::new(vec![a.clone()]);
        let list = AnonymousList::new(items.clone());
        list.mount(MountTarget::selector(&doc, "#slot")).unwrap();

        items.set(vec![a.clone(), b.clone()]);

        assert!(a.is_mounted());
        assert!(b.is_mounted());
        assert_eq!(ul.text_content(), "ab");
    }

    #[test]
    fn member_mount_errors_propagate() {
        let (doc, _) = slot();
        let items = Reactive::new(vec![Keyed::new(1, html("<li>{}</li>", vec![]))]);
        let list = List::new(items);
        let err = list.mount(MountTarget::selector(&doc, "#slot")).unwrap_err();
        assert!(matches!(err, Error::TemplateArity { holes: 1, values: 0 }));
    }

    #[test]
    fn replacing_members_keeps_node_count_stable() {
        let (doc, ul) = slot();
        let items = Reactive::new(vec![Keyed::new(0, item("0"))]);
        let list = List::new(items.clone());
        list.mount(MountTarget::selector(&doc, "#slot")).unwrap();
        let before = doc.node_count();

        for i in 1..=20 {
            items.set(vec![Keyed::new(i, item(&i.to_string()))]);
        }

        assert_eq!(doc.node_count(), before);
        assert_eq!(ul.text_content(), "20");
    }

    #[test]
    fn symbols_are_unique() {
        assert_ne!(Key::symbol(), Key::symbol());
    }
}

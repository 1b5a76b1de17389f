//! Element References
//!
//! A [`Ref`] is interpolated into a template inside an element's `ref`
//! attribute. When the template renders, the element carrying the ref is
//! bound to [`Ref::el`]. Listeners registered through [`Ref::on`] follow the
//! bound element: they are removed from the old element and attached to the
//! new one whenever the binding changes.
//!
//! # Example
//!
//! ```rust
//! use filament_core::dom::{handler, Document};
//! use filament_core::{element_ref, html};
//!
//! let doc = Document::parse(r#"<div id="app"></div>"#).unwrap();
//! let button = element_ref();
//! button.on("click", handler(|_| println!("clicked")), false);
//!
//! let view = html!(r#"<button ref="{}">go</button>"#, &button);
//! view.mount(filament_core::MountTarget::selector(&doc, "#app")).unwrap();
//!
//! assert!(button.el().get().is_some());
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;
use uuid::Uuid;

use crate::dom::{EventHandler, Listener, ListenerOptions, Node};
use crate::reactive::{watch, Reactive, WatchOptions};

fn attach(listener: &Listener, node: &Node) {
    node.add_event_listener(&listener.kind, listener.handler.clone(), listener.capture);
}

fn detach(listener: &Listener, node: &Node) {
    node.remove_event_listener(&listener.kind, &listener.handler, listener.capture);
}

struct RefInner {
    token: String,
    el: Reactive<Option<Node>>,
    listeners: Rc<RefCell<Vec<Listener>>>,
}

/// A reactive reference to a rendered element.
#[derive(Clone)]
pub struct Ref {
    inner: Rc<RefInner>,
}

impl Ref {
    pub fn new() -> Self {
        let el: Reactive<Option<Node>> = Reactive::new(None);
        let listeners: Rc<RefCell<Vec<Listener>>> = Rc::new(RefCell::new(Vec::new()));

        let follow = listeners.clone();
        watch(
            &el,
            move |next: &Option<Node>, prev: &Option<Node>| {
                let registered = follow.borrow().clone();
                if let Some(prev) = prev {
                    registered.iter().for_each(|l| detach(l, prev));
                }
                if let Some(next) = next {
                    registered.iter().for_each(|l| attach(l, next));
                }
            },
            WatchOptions::immediate(),
        );

        Self {
            inner: Rc::new(RefInner {
                token: Uuid::new_v4().to_string(),
                el,
                listeners,
            }),
        }
    }

    /// The placeholder written into the template.
    pub fn token(&self) -> &str {
        &self.inner.token
    }

    /// The bound element, or `None` while unbound.
    pub fn el(&self) -> &Reactive<Option<Node>> {
        &self.inner.el
    }

    pub(crate) fn bind(&self, node: Option<Node>) {
        trace!(token = %self.inner.token, bound = node.is_some(), "binding ref");
        self.inner.el.set(node);
    }

    /// Add an event listener to the bound element, now and after every
    /// rebinding. Adding the same listener twice is a no-op.
    pub fn on(&self, kind: &str, handler: EventHandler, options: impl Into<ListenerOptions>) {
        let registration = Listener::new(kind, handler, options.into().capture);
        if self.is_registered(&registration) {
            return;
        }
        if let Some(node) = self.inner.el.get_untracked() {
            attach(&registration, &node);
        }
        self.inner.listeners.borrow_mut().push(registration);
    }

    /// Remove a listener added with [`on`](Self::on).
    pub fn off(&self, kind: &str, handler: &EventHandler, options: impl Into<ListenerOptions>) {
        let registration = Listener::new(kind, handler.clone(), options.into().capture);
        if !self.is_registered(&registration) {
            return;
        }
        if let Some(node) = self.inner.el.get_untracked() {
            detach(&registration, &node);
        }
        self.inner
            .listeners
            .borrow_mut()
            .retain(|r| !r.same_as(&registration));
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn is_registered(&self, registration: &Listener) -> bool {
        self.inner
            .listeners
            .borrow()
            .iter()
            .any(|r| r.same_as(registration))
    }
}

impl Default for Ref {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Ref {
    fn eq(&self, other: &Self) -> bool {
        self.inner.token == other.inner.token
    }
}

impl Eq for Ref {}

impl fmt::Debug for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ref")
            .field("token", &self.inner.token)
            .field("bound", &self.inner.el.with_untracked(Option::is_some))
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Create an unbound element reference.
pub fn element_ref() -> Ref {
    Ref::new()
}

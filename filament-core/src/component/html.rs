//! Template Components
//!
//! [`html`] creates the basic component: a template plus the values that
//! fill it. Rendering fills the template, reconciles subscriptions, child
//! components and refs against the previous render, and replaces the
//! rendered nodes wholesale when anything changed.
//!
//! # Re-rendering
//!
//! The component subscribes its render subscriber to every reactive cell
//! interpolated into the template. A write to any of them re-renders the
//! component synchronously. Errors from such a render have no caller to
//! return to, so they are logged and the previous nodes stay in place.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, error};

use super::fragment::{self, Slot};
use super::template::{Content, Template};
use super::value::Value;
use super::{mount_behind, Anchor, Component, Hooks, Lifecycle, MountTarget};
use crate::error::{Error, Result};
use crate::reactive::{self, Subscriber};

/// Create a component from a template and the values filling its holes.
///
/// Prefer the [`html!`](crate::html!) macro, which converts each value.
///
/// # Example
///
/// ```rust
/// use filament_core::dom::Document;
/// use filament_core::reactive::Reactive;
/// use filament_core::{html, MountTarget};
///
/// let doc = Document::parse(r#"<div id="app"></div>"#).unwrap();
/// let name = Reactive::new("world");
/// let greeting = html!("<p>hello {}</p>", &name);
///
/// greeting.mount(MountTarget::selector(&doc, "#app")).unwrap();
/// name.set("filament");
/// assert!(doc.html().contains("<p>hello filament</p>"));
/// ```
pub fn html(template: &str, values: Vec<Value>) -> Component {
    let inner: Rc<dyn Lifecycle> = TemplateComponent::new(Template::parse(template), values);
    Component::from_rc(inner)
}

struct TemplateComponent {
    template: Template,
    values: Vec<Value>,
    anchor: Anchor,
    /// Top level of the current render.
    slots: RefCell<Vec<Slot>>,
    content: RefCell<Option<Content>>,
    /// Set when the last render failed after its content was recorded, so
    /// the next render must rebuild even if the content is unchanged.
    stale: Cell<bool>,
    destroyed: Cell<bool>,
    subscriber: Subscriber,
    hooks: Hooks,
}

impl TemplateComponent {
    fn new(template: Template, values: Vec<Value>) -> Rc<Self> {
        Rc::new_cyclic(|this: &Weak<Self>| {
            let this = this.clone();
            let subscriber = Subscriber::new(move || {
                let Some(component) = this.upgrade() else {
                    return;
                };
                if let Err(err) = component.render() {
                    error!(%err, "re-render failed; keeping previous nodes");
                }
            });

            Self {
                template,
                values,
                anchor: Anchor::default(),
                slots: RefCell::new(Vec::new()),
                content: RefCell::new(None),
                stale: Cell::new(false),
                destroyed: Cell::new(false),
                subscriber,
                hooks: Hooks::default(),
            }
        })
    }

    /// Bring subscriptions, children and refs in line with `next`.
    fn reconcile(&self, previous: Option<&Content>, next: &Content) {
        if let Some(previous) = previous {
            for cell in previous.reactives.difference(&next.reactives) {
                reactive::unsubscribe(cell, &self.subscriber);
            }
            for child in previous.components.difference(&next.components) {
                child.destroy();
            }
            for (token, reference) in &previous.refs {
                if !next.refs.contains_key(token) {
                    reference.bind(None);
                }
            }
        }
        for cell in &next.reactives {
            reactive::subscribe(cell, &self.subscriber);
        }
    }

    /// Free the nodes of the current render. Children release their own.
    fn release_slots(&self) {
        let slots = self.slots.replace(Vec::new());
        for slot in slots {
            if let Slot::Node(node) = slot {
                node.release();
            }
        }
    }

    /// Take the rendered content and the anchor out of the tree.
    fn detach(&self) {
        let slots = self.slots.borrow().clone();
        for slot in &slots {
            match slot {
                Slot::Node(node) => node.remove(),
                Slot::Child(child) if !child.is_destroyed() => child.unmount(),
                Slot::Child(_) => {}
            }
        }
        self.anchor.detach();
    }
}

impl Lifecycle for TemplateComponent {
    fn mount(&self, target: MountTarget) -> Result<()> {
        if self.destroyed.get() {
            return Err(Error::Destroyed);
        }
        let target = target.resolve()?;
        self.anchor.attach(&target)?;

        let slots = self.slots.borrow().clone();
        for slot in &slots {
            match slot {
                Slot::Node(node) => self.anchor.insert_before(node),
                Slot::Child(child) => mount_behind(&self.anchor, child)?,
            }
        }

        self.render()?;
        debug!(slots = self.slots.borrow().len(), "mounted template component");
        self.hooks.run_mounted();
        Ok(())
    }

    fn unmount(&self) {
        if self.destroyed.get() {
            return;
        }
        self.detach();
        debug!("unmounted template component");
        self.hooks.run_unmounted();
    }

    fn render(&self) -> Result<()> {
        if self.destroyed.get() {
            return Ok(());
        }
        let (Some(anchor), Some(parent)) = (self.anchor.node(), self.anchor.parent()) else {
            return Ok(());
        };

        let next = self.template.fill(&self.values)?;
        let previous = self.content.replace(Some(next.clone()));
        self.reconcile(previous.as_ref(), &next);

        let unchanged = previous.as_ref().is_some_and(|p| p.same_as(&next));
        if unchanged && !self.stale.get() {
            return Ok(());
        }

        self.stale.set(true);
        let built = fragment::build(anchor.document(), &next)?;
        self.stale.set(false);

        self.release_slots();
        parent.insert_before(&built.fragment, Some(&anchor));
        built.fragment.release();
        debug!(slots = built.slots.len(), "replaced rendered nodes");
        *self.slots.borrow_mut() = built.slots;
        Ok(())
    }

    fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        reactive::unsubscribe_all(&self.subscriber);
        if let Some(content) = self.content.take() {
            for child in &content.components {
                child.destroy();
            }
            for reference in content.refs.values() {
                reference.bind(None);
            }
        }
        self.detach();
        self.hooks.run_unmounted();
        self.release_slots();
        self.anchor.release();
        debug!("destroyed template component");
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

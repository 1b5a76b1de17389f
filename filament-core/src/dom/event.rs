//! Event listeners.
//!
//! Listeners are stored on the node they are registered on. Identity of a
//! registration is the event type, the handler's `Rc` pointer and the
//! capture flag, so the same handler can be added for both phases.

use std::fmt;
use std::rc::Rc;

use serde::Deserialize;

use super::node::Node;

/// An event being dispatched.
#[derive(Debug, Clone)]
pub struct Event {
    /// Event type, e.g. `"click"`.
    pub kind: String,
    /// The node the event was dispatched at.
    pub target: Node,
}

/// Shared event callback.
pub type EventHandler = Rc<dyn Fn(&Event)>;

/// Wrap a closure as an [`EventHandler`].
pub fn handler<F>(f: F) -> EventHandler
where
    F: Fn(&Event) + 'static,
{
    Rc::new(f)
}

/// Options for listener registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListenerOptions {
    /// Run during the capture phase.
    pub capture: bool,
}

impl From<bool> for ListenerOptions {
    fn from(capture: bool) -> Self {
        Self { capture }
    }
}

#[derive(Clone)]
pub(crate) struct Listener {
    pub(crate) kind: String,
    pub(crate) handler: EventHandler,
    pub(crate) capture: bool,
}

impl Listener {
    pub(crate) fn new(kind: &str, handler: EventHandler, capture: bool) -> Self {
        Self {
            kind: kind.to_string(),
            handler,
            capture,
        }
    }

    pub(crate) fn same_as(&self, other: &Listener) -> bool {
        self.kind == other.kind
            && self.capture == other.capture
            && std::ptr::addr_eq(Rc::as_ptr(&self.handler), Rc::as_ptr(&other.handler))
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("kind", &self.kind)
            .field("capture", &self.capture)
            .finish()
    }
}

//! Subscriber types for the reactive system.
//!
//! A Subscriber represents any computation that depends on reactive values.
//! This includes derived recomputations, watcher callbacks, and component
//! render functions.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use super::context::ReactiveContext;

/// Unique identifier for a subscriber.
///
/// Each subscriber gets a unique ID when created. The registry keys its
/// subscriber sets by this ID, which is what makes subscribing the same
/// subscriber twice a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// Notification behaviour behind a [`Subscriber`].
trait Notify {
    fn notify(&self);
}

struct Plain<F>(F);

impl<F: Fn()> Notify for Plain<F> {
    fn notify(&self) {
        (self.0)();
    }
}

/// Re-enters a reactive context as itself on every run.
struct Tracked<F> {
    id: SubscriberId,
    this: Weak<Tracked<F>>,
    body: F,
}

impl<F: Fn() + 'static> Notify for Tracked<F> {
    fn notify(&self) {
        let Some(this) = self.this.upgrade() else {
            return;
        };
        let me = Subscriber {
            id: self.id,
            notify: this,
        };
        let _ctx = ReactiveContext::enter(me);
        (self.body)();
    }
}

/// A subscriber to reactive values.
///
/// Cloning a subscriber yields a handle to the same callback with the same
/// identity. Two subscribers compare equal only if one is a clone of the
/// other.
#[derive(Clone)]
pub struct Subscriber {
    id: SubscriberId,
    notify: Rc<dyn Notify>,
}

impl Subscriber {
    /// Create a new subscriber with the given notification callback.
    ///
    /// The callback runs untracked when notified: cells it reads do not
    /// become dependencies.
    pub fn new<F>(notify: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self {
            id: SubscriberId::new(),
            notify: Rc::new(Plain(notify)),
        }
    }

    /// Create a subscriber that makes itself the active subscriber every
    /// time it runs, so every cell it reads on any run becomes a dependency.
    pub fn tracked<F>(body: F) -> Self
    where
        F: Fn() + 'static,
    {
        let id = SubscriberId::new();
        let notify = Rc::new_cyclic(|this| Tracked {
            id,
            this: this.clone(),
            body,
        });
        Self { id, notify }
    }

    /// Get the subscriber's unique ID.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Notify the subscriber that one of its dependencies changed.
    pub fn notify(&self) {
        self.notify.notify();
    }
}

impl PartialEq for Subscriber {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Subscriber {}

impl Hash for Subscriber {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Subscriber").field(&self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn subscriber_ids_are_unique() {
        let id1 = SubscriberId::new();
        let id2 = SubscriberId::new();
        let id3 = SubscriberId::new();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn subscriber_notify_calls_callback() {
        let called = Rc::new(Cell::new(false));
        let called_clone = called.clone();

        let subscriber = Subscriber::new(move || called_clone.set(true));

        assert!(!called.get());
        subscriber.notify();
        assert!(called.get());
    }

    #[test]
    fn tracked_subscriber_is_active_while_running() {
        let seen = Rc::new(Cell::new(None));
        let seen_clone = seen.clone();

        let subscriber = Subscriber::tracked(move || {
            seen_clone.set(ReactiveContext::current_subscriber().map(|s| s.id()));
        });
        subscriber.notify();

        assert_eq!(seen.get(), Some(subscriber.id()));
        assert!(!ReactiveContext::is_active());
    }

    #[test]
    fn clones_share_identity() {
        let a = Subscriber::new(|| {});
        let b = a.clone();
        let c = Subscriber::new(|| {});

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}

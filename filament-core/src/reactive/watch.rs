//! Watchers
//!
//! A watcher invokes a callback with `(next, prev)` every time a cell is
//! written. Unlike a derived value it produces nothing; it exists to bridge
//! reactive state to the outside world.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde::Deserialize;

use super::cell::Readable;
use super::registry::{self, CellId};
use super::Subscriber;

/// Options for [`watch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WatchOptions {
    /// Invoke the callback once, synchronously, at creation. Both arguments
    /// are the current value.
    pub immediate: bool,
}

impl WatchOptions {
    /// Options with `immediate` set.
    pub fn immediate() -> Self {
        Self { immediate: true }
    }
}

/// Handle to a running watcher.
///
/// Dropping the handle does not stop the watcher.
pub struct Watcher {
    cell: CellId,
    subscriber: Subscriber,
    stopped: Rc<Cell<bool>>,
}

impl Watcher {
    /// Stop the watcher. Calling this more than once is harmless.
    pub fn stop(&self) {
        if self.stopped.replace(true) {
            return;
        }
        registry::unsubscribe(&self.cell, &self.subscriber);
    }

    /// Whether [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.stopped.get()
    }
}

impl fmt::Debug for Watcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher")
            .field("cell", &self.cell)
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// Watch `source`, calling `f(next, prev)` after each write.
pub fn watch<T, S, F>(source: &S, f: F, options: WatchOptions) -> Watcher
where
    T: Clone + 'static,
    S: Readable<T> + Clone + 'static,
    F: Fn(&T, &T) + 'static,
{
    let previous = Rc::new(RefCell::new(source.get()));

    if options.immediate {
        let current = previous.borrow().clone();
        f(&current, &current);
    }

    let reader = source.weak_reader();
    let subscriber = Subscriber::new(move || {
        let Some(next) = reader() else {
            return;
        };
        let prev = previous.replace(next.clone());
        f(&next, &prev);
    });

    registry::subscribe(source, &subscriber);

    Watcher {
        cell: source.cell_id(),
        subscriber,
        stopped: Rc::new(Cell::new(false)),
    }
}

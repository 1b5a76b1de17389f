//! Reactive Cell Implementation
//!
//! A reactive cell is the fundamental reactive primitive. It holds a value
//! and is the key under which dependent computations are registered.
//!
//! # How Cells Work
//!
//! 1. When a cell is read while a subscriber is active, that subscriber is
//!    registered as a dependent of the cell.
//!
//! 2. When a cell is written, every dependent is notified synchronously,
//!    even if the new value equals the old one.
//!
//! 3. Notifications re-run dependent computations, which may write other
//!    cells and recurse.
//!
//! # Identity
//!
//! Cloning a [`Reactive`] produces another handle to the same cell. The
//! cell, not its value, is the subscription key.

use std::cell::RefCell;
use std::fmt::{self, Debug};
use std::rc::{Rc, Weak};

use super::registry::{self, CellId, Trackable};

/// Read access shared by cells and derived values.
pub trait Readable<T>: Trackable {
    /// Read the current value, tracking the read.
    fn get(&self) -> T;

    /// Read the current value without tracking.
    fn get_untracked(&self) -> T;

    /// A reader that does not keep the cell alive. It returns `None` once
    /// the cell is gone.
    fn weak_reader(&self) -> Box<dyn Fn() -> Option<T>>;
}

struct CellInner<T> {
    id: CellId,
    value: RefCell<T>,
}

impl<T> Drop for CellInner<T> {
    fn drop(&mut self) {
        registry::forget(self.id);
    }
}

/// A reactive cell holding a value of type `T`.
///
/// # Example
///
/// ```rust
/// use filament_core::reactive::Reactive;
///
/// let count = Reactive::new(0);
/// count.set(5);
/// assert_eq!(count.get(), 5);
/// ```
pub struct Reactive<T> {
    inner: Rc<CellInner<T>>,
}

impl<T: 'static> Reactive<T> {
    /// Create a new cell with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(CellInner {
                id: CellId::new(),
                value: RefCell::new(value),
            }),
        }
    }

    /// Get the cell's identity.
    pub fn id(&self) -> CellId {
        self.inner.id
    }

    /// Borrow the current value, tracking the read.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        registry::track(self);
        self.with_untracked(f)
    }

    /// Borrow the current value without tracking the read.
    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Replace the value and notify all subscribers.
    pub fn set(&self, value: T) {
        *self.inner.value.borrow_mut() = value;
        registry::trigger(self);
    }

    /// Replace the value with one computed from the current value.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let next = self.with_untracked(f);
        self.set(next);
    }

    /// Get the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        registry::subscriber_count(self)
    }

    /// A handle that does not keep the cell alive.
    pub fn downgrade(&self) -> WeakReactive<T> {
        WeakReactive {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl<T: Clone + 'static> Reactive<T> {
    /// Get the current value, tracking the read.
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Get the current value without tracking the read.
    pub fn get_untracked(&self) -> T {
        self.with_untracked(T::clone)
    }
}

impl<T> Trackable for Reactive<T> {
    fn cell_id(&self) -> CellId {
        self.inner.id
    }
}

impl<T: Clone + 'static> Readable<T> for Reactive<T> {
    fn get(&self) -> T {
        Reactive::get(self)
    }

    fn get_untracked(&self) -> T {
        Reactive::get_untracked(self)
    }

    fn weak_reader(&self) -> Box<dyn Fn() -> Option<T>> {
        let weak = self.downgrade();
        Box::new(move || weak.upgrade().map(|cell| cell.get()))
    }
}

/// A non-owning handle to a [`Reactive`] cell.
pub struct WeakReactive<T> {
    inner: Weak<CellInner<T>>,
}

impl<T> WeakReactive<T> {
    /// The cell, if any strong handle to it still exists.
    pub fn upgrade(&self) -> Option<Reactive<T>> {
        self.inner.upgrade().map(|inner| Reactive { inner })
    }
}

impl<T> Clone for WeakReactive<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> Clone for Reactive<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> PartialEq for Reactive<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl<T> Eq for Reactive<T> {}

impl<T: Debug> Debug for Reactive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reactive")
            .field("id", &self.inner.id)
            .field("value", &*self.inner.value.borrow())
            .field("subscriber_count", &registry::subscriber_count(self))
            .finish()
    }
}

/// Create a reactive cell.
pub fn reactive<T: 'static>(value: T) -> Reactive<T> {
    Reactive::new(value)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::{ctx, subscribe, unsubscribe, Subscriber};
    use std::cell::Cell;

    fn counting_subscriber() -> (Rc<Cell<i32>>, Subscriber) {
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        let subscriber = Subscriber::new(move || count_clone.set(count_clone.get() + 1));
        (count, subscriber)
    }

    #[test]
    fn cell_get_and_set() {
        let cell = Reactive::new(0);
        assert_eq!(cell.get(), 0);

        cell.set(42);
        assert_eq!(cell.get(), 42);
    }

    #[test]
    fn cell_update() {
        let cell = Reactive::new(10);
        cell.update(|v| v + 5);
        assert_eq!(cell.get(), 15);
    }

    #[test]
    fn cell_notifies_subscribers() {
        let cell = Reactive::new(0);
        let (count, subscriber) = counting_subscriber();
        subscribe(&cell, &subscriber);

        cell.set(1);
        assert_eq!(count.get(), 1);

        cell.set(2);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn writing_same_value_still_notifies() {
        let cell = Reactive::new(7);
        let (count, subscriber) = counting_subscriber();
        subscribe(&cell, &subscriber);

        cell.set(7);
        cell.set(7);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn cell_unsubscribe() {
        let cell = Reactive::new(0);
        let (count, subscriber) = counting_subscriber();
        subscribe(&cell, &subscriber);

        cell.set(1);
        unsubscribe(&cell, &subscriber);
        cell.set(2);

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn reading_outside_context_does_not_subscribe() {
        let cell = Reactive::new(0);
        let _ = cell.get();
        assert_eq!(cell.subscriber_count(), 0);
    }

    #[test]
    fn repeated_reads_subscribe_once() {
        let cell = Reactive::new(1);
        let runs = Rc::new(Cell::new(0));

        let cell_clone = cell.clone();
        let runs_clone = runs.clone();
        ctx(Subscriber::new(move || {
            runs_clone.set(runs_clone.get() + 1);
            let _ = cell_clone.get() + cell_clone.get();
        }));

        assert_eq!(cell.subscriber_count(), 1);
        cell.set(2);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn untracked_read_inside_context() {
        let cell = Reactive::new(1);
        let cell_clone = cell.clone();
        ctx(Subscriber::new(move || {
            let _ = cell_clone.get_untracked();
        }));

        assert_eq!(cell.subscriber_count(), 0);
    }

    #[test]
    fn cell_clone_shares_state() {
        let cell1 = Reactive::new(0);
        let cell2 = cell1.clone();

        cell1.set(42);
        assert_eq!(cell2.get(), 42);
        assert_eq!(cell1, cell2);
    }

    #[test]
    fn dropping_last_handle_forgets_entry() {
        let cell = Reactive::new(0);
        let id = cell.id();
        let (_, subscriber) = counting_subscriber();
        subscribe(&cell, &subscriber);

        drop(cell);
        assert!(!registry::has_entry(id));
    }

    #[test]
    fn weak_handle_does_not_keep_cell_alive() {
        let cell = Reactive::new(3);
        let weak = cell.downgrade();
        assert_eq!(weak.upgrade().map(|c| c.get()), Some(3));

        let reader = cell.weak_reader();
        assert_eq!(reader(), Some(3));

        drop(cell);
        assert!(weak.upgrade().is_none());
        assert_eq!(reader(), None);
    }
}

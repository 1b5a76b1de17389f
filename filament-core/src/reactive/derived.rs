//! Derived Value Implementation
//!
//! A derived value is a read-only reactive cell whose value is recomputed
//! by a tracked subscriber whenever any of its dependencies change.
//!
//! # How Derived Values Work
//!
//! 1. On creation the compute function runs once with no previous value to
//!    produce the initial value.
//!
//! 2. A tracking context then runs the compute function again, this time
//!    with the previous value, writes the result into the cell and
//!    registers every cell read as a dependency.
//!
//! 3. When a dependency changes, the recompute runs synchronously, writes
//!    the cell, and that write notifies the derived value's own
//!    subscribers.
//!
//! Recomputation is eager and there is no equality check: every dependency
//! write produces a write of the derived cell.
//!
//! The previous value is passed to the compute function so derivations can
//! merge incrementally (e.g. reuse map entries by key).

use std::cell::RefCell;
use std::fmt::{self, Debug};
use std::rc::Rc;

use super::cell::{Readable, Reactive};
use super::effect::ctx;
use super::registry::{self, CellId, Trackable};
use super::Subscriber;

/// A read-only reactive value computed from other reactive values.
///
/// # Example
///
/// ```rust
/// use filament_core::reactive::{derived, Reactive};
///
/// let count = Reactive::new(2);
/// let count_clone = count.clone();
/// let doubled = derived(move |_| count_clone.get() * 2);
///
/// count.set(5);
/// assert_eq!(doubled.get(), 10);
/// ```
pub struct Derived<T> {
    cell: Reactive<T>,
    recompute: Subscriber,
}

impl<T: Clone + 'static> Derived<T> {
    /// Create a derived value from a compute function receiving the
    /// previous value.
    pub fn new<F>(compute: F) -> Self
    where
        F: Fn(Option<&T>) -> T + 'static,
    {
        let initial = compute(None);
        let cell = Reactive::new(initial.clone());
        let last = Rc::new(RefCell::new(initial));

        let target = cell.clone();
        let recompute = Subscriber::tracked(move || {
            let prev = last.borrow().clone();
            let next = compute(Some(&prev));
            target.set(next.clone());
            *last.borrow_mut() = next;
        });

        ctx(recompute.clone());

        Self { cell, recompute }
    }

    /// Get the current value, tracking the read.
    pub fn get(&self) -> T {
        self.cell.get()
    }

    /// Get the current value without tracking the read.
    pub fn get_untracked(&self) -> T {
        self.cell.get_untracked()
    }
}

impl<T: 'static> Derived<T> {
    /// Get the underlying cell's identity.
    pub fn id(&self) -> CellId {
        self.cell.id()
    }

    /// Borrow the current value, tracking the read.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.cell.with(f)
    }

    /// Stop recomputing. The last value stays readable.
    pub fn dispose(&self) {
        registry::unsubscribe_all(&self.recompute);
    }

    /// Get the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.cell.subscriber_count()
    }
}

impl<T> Trackable for Derived<T> {
    fn cell_id(&self) -> CellId {
        self.cell.cell_id()
    }
}

impl<T: Clone + 'static> Readable<T> for Derived<T> {
    fn get(&self) -> T {
        Derived::get(self)
    }

    fn get_untracked(&self) -> T {
        Derived::get_untracked(self)
    }

    fn weak_reader(&self) -> Box<dyn Fn() -> Option<T>> {
        self.cell.weak_reader()
    }
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            recompute: self.recompute.clone(),
        }
    }
}

impl<T: Debug> Debug for Derived<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Derived")
            .field("cell", &self.cell)
            .field("recompute", &self.recompute.id())
            .finish()
    }
}

/// Create a derived value.
pub fn derived<T, F>(compute: F) -> Derived<T>
where
    T: Clone + 'static,
    F: Fn(Option<&T>) -> T + 'static,
{
    Derived::new(compute)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

//! Effect Implementation
//!
//! [`ctx`] is the low-level tracking primitive: it makes a subscriber the
//! active subscriber, runs it once so that the cells it reads register it,
//! and clears the active slot.
//!
//! [`Effect`] builds on it: a side-effecting computation that runs once on
//! creation and again whenever any cell it has read changes.
//!
//! # Nesting
//!
//! Tracking contexts do not nest. When `ctx` is called while another
//! subscriber is active, the slot is cleared (not restored) once the inner
//! subscriber returns, so the rest of the outer run is untracked.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use super::context::ReactiveContext;
use super::registry;
use super::Subscriber;

/// Run `effect` once as the active subscriber, then clear the slot.
pub fn ctx(effect: Subscriber) {
    let _ctx = ReactiveContext::enter(effect.clone());
    effect.notify();
}

/// A side-effecting computation that re-runs when its dependencies change.
///
/// # Example
///
/// ```rust
/// use filament_core::reactive::{Effect, Reactive};
///
/// let count = Reactive::new(0);
/// let count_clone = count.clone();
/// let effect = Effect::new(move || {
///     let _ = count_clone.get();
/// });
///
/// count.set(5); // runs the effect again
/// assert_eq!(effect.run_count(), 2);
/// ```
pub struct Effect {
    subscriber: Subscriber,
    disposed: Rc<Cell<bool>>,
    run_count: Rc<Cell<usize>>,
}

impl Effect {
    /// Create a new effect; the function runs immediately to establish
    /// initial dependencies.
    pub fn new<F>(run: F) -> Self
    where
        F: Fn() + 'static,
    {
        let disposed = Rc::new(Cell::new(false));
        let run_count = Rc::new(Cell::new(0));

        let disposed_clone = disposed.clone();
        let run_count_clone = run_count.clone();
        let subscriber = Subscriber::tracked(move || {
            if disposed_clone.get() {
                return;
            }
            run();
            run_count_clone.set(run_count_clone.get() + 1);
        });

        ctx(subscriber.clone());

        Self {
            subscriber,
            disposed,
            run_count,
        }
    }

    /// The subscriber registered on the effect's dependencies.
    pub fn subscriber(&self) -> &Subscriber {
        &self.subscriber
    }

    /// Stop the effect and release every subscription it holds.
    pub fn dispose(&self) {
        self.disposed.set(true);
        registry::unsubscribe_all(&self.subscriber);
    }

    /// Check if the effect has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Get the number of times the effect has run.
    pub fn run_count(&self) -> usize {
        self.run_count.get()
    }
}

impl Clone for Effect {
    fn clone(&self) -> Self {
        Self {
            subscriber: self.subscriber.clone(),
            disposed: Rc::clone(&self.disposed),
            run_count: Rc::clone(&self.run_count),
        }
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("subscriber", &self.subscriber.id())
            .field("run_count", &self.run_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

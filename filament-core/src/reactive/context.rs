//! Reactive Context
//!
//! The reactive context records which subscriber is currently running so
//! that reading a cell can register that subscriber as a dependent.
//!
//! # Implementation
//!
//! Each thread has a single "active subscriber" slot. Entering a context
//! overwrites the slot; leaving it clears the slot to empty. Contexts do
//! **not** nest: leaving an inner context does not restore the outer one, so
//! anything read after a nested context has exited is untracked.
//!
//! Triggering subscribers uses [`ReactiveContext::suspend`], which empties
//! the slot for the duration of the notification pass and puts the previous
//! occupant back afterwards.

use std::cell::RefCell;

use super::Subscriber;

thread_local! {
    static ACTIVE: RefCell<Option<Subscriber>> = const { RefCell::new(None) };
}

/// Guard that clears the active slot when dropped.
///
/// Dropping resets the slot to empty even if the computation panicked.
pub struct ReactiveContext {
    _private: (),
}

impl ReactiveContext {
    /// Make `subscriber` the active subscriber.
    ///
    /// While the guard is alive, any cell that is read registers the
    /// subscriber as a dependent.
    pub fn enter(subscriber: Subscriber) -> Self {
        ACTIVE.with(|slot| *slot.borrow_mut() = Some(subscriber));
        Self { _private: () }
    }

    /// Empty the slot until the returned guard is dropped, then restore
    /// whatever was there before.
    pub fn suspend() -> SuspendGuard {
        let previous = ACTIVE.with(|slot| slot.borrow_mut().take());
        SuspendGuard { previous }
    }

    /// Check if there is an active subscriber.
    pub fn is_active() -> bool {
        ACTIVE.with(|slot| slot.borrow().is_some())
    }

    /// Get the current subscriber, if any.
    pub fn current_subscriber() -> Option<Subscriber> {
        ACTIVE.with(|slot| slot.borrow().clone())
    }
}

impl Drop for ReactiveContext {
    fn drop(&mut self) {
        ACTIVE.with(|slot| *slot.borrow_mut() = None);
    }
}

/// Restores the slot emptied by [`ReactiveContext::suspend`].
pub struct SuspendGuard {
    previous: Option<Subscriber>,
}

impl Drop for SuspendGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        ACTIVE.with(|slot| *slot.borrow_mut() = previous);
    }
}

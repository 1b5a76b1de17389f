//! Reactive Primitives
//!
//! This module implements the core reactive system: cells, derived values,
//! effects and watchers. These primitives form the foundation of Filament's
//! fine-grained reactivity.
//!
//! # Concepts
//!
//! ## Cells
//!
//! A [`Reactive`] cell is a container for mutable state. When a cell is read
//! while a subscriber is active, the subscriber registers itself as a
//! dependent. When the cell is written, every dependent is notified
//! synchronously, once per write.
//!
//! ## Derived values
//!
//! A [`Derived`] value is a read-only cell recomputed by a tracked
//! subscriber whenever one of its dependencies is written.
//!
//! ## Watchers
//!
//! A [`Watcher`] calls a function with `(next, prev)` whenever a cell is
//! written.
//!
//! # Implementation Notes
//!
//! The "currently running subscriber" lives in a thread-local slot. Reading a
//! cell checks the slot and, if it is occupied, adds that subscriber to the
//! cell's entry in the subscription registry. There is no batching and no
//! scheduler: N writes mean N propagation passes.

mod cell;
mod context;
mod derived;
mod effect;
mod flatten;
mod registry;
mod subscriber;
mod watch;

pub use cell::{reactive, Readable, Reactive, WeakReactive};
pub use context::{ReactiveContext, SuspendGuard};
pub use derived::{derived, Derived};
pub use effect::{ctx, Effect};
pub use flatten::{flatten, Flatten};
pub use registry::{
    is_subscribed, subscribe, subscriber_count, subscriptions, track, trigger, unsubscribe,
    unsubscribe_all, CellId, Trackable,
};
#[cfg(test)]
pub(crate) use registry::has_entry;
pub use subscriber::{Subscriber, SubscriberId};
pub use watch::{watch, WatchOptions, Watcher};

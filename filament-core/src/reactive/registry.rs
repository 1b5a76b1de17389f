//! Subscription Registry
//!
//! The registry is the central association between reactive cells and the
//! subscribers that depend on them. It is keyed by [`CellId`] and never
//! holds the cells themselves, so a cell that is no longer referenced
//! anywhere else can be dropped; its entry is removed when that happens.
//!
//! # How It Works
//!
//! 1. When a cell is read inside a reactive context, [`track`] adds the
//!    active subscriber to the cell's set.
//!
//! 2. When a cell is written, [`trigger`] walks a snapshot of the set and
//!    notifies each subscriber that is still registered when reached.
//!
//! 3. Subscriber sets are lazily created and are never deleted while the
//!    cell lives, even if they become empty.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexSet;
use tracing::trace;

use super::context::ReactiveContext;
use super::Subscriber;

/// Identity of a reactive cell. Cloned handles of one cell share the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(u64);

impl CellId {
    pub(crate) fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Anything that has a cell identity and can therefore be subscribed to.
pub trait Trackable {
    /// The identity of the underlying cell.
    fn cell_id(&self) -> CellId;
}

impl Trackable for CellId {
    fn cell_id(&self) -> CellId {
        *self
    }
}

thread_local! {
    static SUBSCRIPTIONS: RefCell<HashMap<CellId, IndexSet<Subscriber>>> =
        RefCell::new(HashMap::new());
}

/// Subscribe `subscriber` to `cell`. Subscribing twice is a no-op.
pub fn subscribe<C>(cell: &C, subscriber: &Subscriber)
where
    C: Trackable + ?Sized,
{
    let id = cell.cell_id();
    SUBSCRIPTIONS.with(|subs| {
        let inserted = subs
            .borrow_mut()
            .entry(id)
            .or_default()
            .insert(subscriber.clone());
        if inserted {
            trace!(cell = ?id, subscriber = ?subscriber.id(), "subscribe");
        }
    });
}

/// Unsubscribe `subscriber` from `cell`. Unknown pairs are ignored.
pub fn unsubscribe<C>(cell: &C, subscriber: &Subscriber)
where
    C: Trackable + ?Sized,
{
    let id = cell.cell_id();
    SUBSCRIPTIONS.with(|subs| {
        if let Some(set) = subs.borrow_mut().get_mut(&id) {
            if set.shift_remove(subscriber) {
                trace!(cell = ?id, subscriber = ?subscriber.id(), "unsubscribe");
            }
        }
    });
}

/// Remove `subscriber` from every cell it is subscribed to.
pub fn unsubscribe_all(subscriber: &Subscriber) {
    SUBSCRIPTIONS.with(|subs| {
        for set in subs.borrow_mut().values_mut() {
            set.shift_remove(subscriber);
        }
    });
}

/// Snapshot of the subscribers currently registered on `cell`.
pub fn subscriptions<C>(cell: &C) -> Vec<Subscriber>
where
    C: Trackable + ?Sized,
{
    let id = cell.cell_id();
    SUBSCRIPTIONS.with(|subs| {
        subs.borrow()
            .get(&id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    })
}

/// Number of subscribers currently registered on `cell`.
pub fn subscriber_count<C>(cell: &C) -> usize
where
    C: Trackable + ?Sized,
{
    let id = cell.cell_id();
    SUBSCRIPTIONS.with(|subs| subs.borrow().get(&id).map_or(0, IndexSet::len))
}

/// Whether `subscriber` is currently registered on `cell`.
pub fn is_subscribed<C>(cell: &C, subscriber: &Subscriber) -> bool
where
    C: Trackable + ?Sized,
{
    let id = cell.cell_id();
    SUBSCRIPTIONS.with(|subs| {
        subs.borrow()
            .get(&id)
            .is_some_and(|set| set.contains(subscriber))
    })
}

/// Subscribe the active subscriber, if any, to `cell`.
pub fn track<C>(cell: &C)
where
    C: Trackable + ?Sized,
{
    if let Some(subscriber) = ReactiveContext::current_subscriber() {
        subscribe(cell, &subscriber);
    }
}

/// Notify every subscriber of `cell`.
///
/// The active slot is emptied while subscribers run, so reads they perform
/// are not attributed to whatever effect happened to be running when the
/// write occurred.
pub fn trigger<C>(cell: &C)
where
    C: Trackable + ?Sized,
{
    let id = cell.cell_id();
    let snapshot = subscriptions(&id);
    if snapshot.is_empty() {
        return;
    }

    trace!(cell = ?id, subscribers = snapshot.len(), "trigger");

    let _suspended = ReactiveContext::suspend();
    for subscriber in snapshot {
        // Skip subscribers removed earlier in this same pass.
        if is_subscribed(&id, &subscriber) {
            subscriber.notify();
        }
    }
}

/// Drop the entry of a cell that no longer exists.
pub(crate) fn forget(id: CellId) {
    // Ignore the access error raised while the thread-local is being torn down.
    let _ = SUBSCRIPTIONS.try_with(|subs| {
        if let Ok(mut subs) = subs.try_borrow_mut() {
            subs.remove(&id);
        }
    });
}

/// Whether the registry still has an entry (possibly empty) for `cell`.
#[cfg(test)]
pub(crate) fn has_entry(id: CellId) -> bool {
    SUBSCRIPTIONS.with(|subs| subs.borrow().contains_key(&id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counter() -> (Rc<Cell<i32>>, Subscriber) {
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        let subscriber = Subscriber::new(move || count_clone.set(count_clone.get() + 1));
        (count, subscriber)
    }

    #[test]
    fn subscribe_is_idempotent() {
        let cell = CellId::new();
        let (count, subscriber) = counter();

        subscribe(&cell, &subscriber);
        subscribe(&cell, &subscriber);
        assert_eq!(subscriber_count(&cell), 1);

        trigger(&cell);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn unsubscribe_unknown_is_noop() {
        let cell = CellId::new();
        let (_, subscriber) = counter();

        unsubscribe(&cell, &subscriber);
        assert_eq!(subscriber_count(&cell), 0);
    }

    #[test]
    fn entry_stays_after_last_unsubscribe() {
        let cell = CellId::new();
        let (_, subscriber) = counter();

        subscribe(&cell, &subscriber);
        unsubscribe(&cell, &subscriber);

        assert!(has_entry(cell));
        assert_eq!(subscriber_count(&cell), 0);

        forget(cell);
        assert!(!has_entry(cell));
    }

    #[test]
    fn unsubscribe_all_clears_every_cell() {
        let a = CellId::new();
        let b = CellId::new();
        let (count, subscriber) = counter();

        subscribe(&a, &subscriber);
        subscribe(&b, &subscriber);
        unsubscribe_all(&subscriber);

        trigger(&a);
        trigger(&b);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn subscriber_removed_mid_trigger_is_skipped() {
        let cell = CellId::new();
        let (count, victim) = counter();

        let victim_clone = victim.clone();
        let remover = Subscriber::new(move || unsubscribe(&cell, &victim_clone));

        subscribe(&cell, &remover);
        subscribe(&cell, &victim);

        trigger(&cell);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn track_without_context_does_nothing() {
        let cell = CellId::new();
        track(&cell);
        assert_eq!(subscriber_count(&cell), 0);
    }

    #[test]
    fn trigger_suspends_active_subscriber() {
        let cell = CellId::new();
        let other = CellId::new();

        // Reads performed by a triggered subscriber must not be attributed
        // to the effect that was active when the write happened.
        let reader = Subscriber::new(move || track(&other));
        subscribe(&cell, &reader);

        let outer = Subscriber::new(|| {});
        let _ctx = ReactiveContext::enter(outer.clone());
        trigger(&cell);

        assert!(!is_subscribed(&other, &outer));
        assert_eq!(ReactiveContext::current_subscriber(), Some(outer));
    }
}

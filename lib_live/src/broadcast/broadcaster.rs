//! # Snapshot Broadcaster
//!
//! Fan-out of state snapshots to registered callbacks. This is the shared
//! backbone of the market, notification and analytics services.
//!
//! ## Contract
//!
//! - `subscribe` registers the callback and synchronously invokes it once
//!   with the current snapshot before returning, so a newly mounted consumer
//!   can never miss its initial state.
//! - `unsubscribe` removes by [`SubscriptionId`] and is idempotent.
//! - `notify` hands every registered callback its own clone of the snapshot.
//!   Subscribers only ever see copies; nothing they do to a received value
//!   can reach back into service-internal state.
//! - A panicking callback is isolated and logged. It never prevents the
//!   remaining subscribers from being notified and never kills a tick loop.
//!
//! Invocation order across subscribers is unspecified.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

/// Opaque handle returned by [`Broadcaster::subscribe`], consumed by
/// [`Broadcaster::unsubscribe`]. Ids are assigned monotonically and never
/// reused within a broadcaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<T> = Arc<dyn Fn(T) + Send + Sync + 'static>;

struct Inner<T> {
    next_id: u64,
    subscribers: HashMap<u64, Callback<T>>,
}

/// Snapshot fan-out to registered callbacks, keyed by [`SubscriptionId`].
pub struct Broadcaster<T> {
    inner: Mutex<Inner<T>>,
}

impl<T: Clone> Broadcaster<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 0,
                subscribers: HashMap::new(),
            }),
        }
    }

    /// Registers `callback` and synchronously delivers `initial` to it before
    /// returning. The callback runs outside the internal lock, so it may
    /// immediately re-enter `subscribe` or `unsubscribe`.
    pub fn subscribe<F>(&self, initial: T, callback: F) -> SubscriptionId
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let callback: Callback<T> = Arc::new(callback);
        let id = {
            let mut inner = self.inner.lock().expect("Broadcaster lock poisoned");
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.insert(id, Arc::clone(&callback));
            id
        };
        log::debug!("Subscriber {} registered", id);
        Self::invoke(id, &callback, initial);
        SubscriptionId(id)
    }

    /// Removes the subscription. Unknown or already-removed ids are a no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut inner = self.inner.lock().expect("Broadcaster lock poisoned");
        if inner.subscribers.remove(&id.0).is_some() {
            log::debug!("Subscriber {} removed", id.0);
        }
    }

    /// Delivers a clone of `snapshot` to every currently registered callback.
    ///
    /// The subscriber table is copied out under the lock and callbacks are
    /// invoked after releasing it; a callback that subscribes or unsubscribes
    /// mid-notification affects the *next* notification, not this one.
    pub fn notify(&self, snapshot: T) {
        let targets: Vec<(u64, Callback<T>)> = {
            let inner = self.inner.lock().expect("Broadcaster lock poisoned");
            inner
                .subscribers
                .iter()
                .map(|(id, cb)| (*id, Arc::clone(cb)))
                .collect()
        };

        for (id, callback) in targets {
            Self::invoke(id, &callback, snapshot.clone());
        }
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .lock()
            .expect("Broadcaster lock poisoned")
            .subscribers
            .len()
    }

    fn invoke(id: u64, callback: &Callback<T>, snapshot: T) {
        if catch_unwind(AssertUnwindSafe(|| callback(snapshot))).is_err() {
            log::warn!(
                "Subscriber {} panicked during notification; continuing with remaining subscribers",
                id
            );
        }
    }
}

impl<T: Clone> Default for Broadcaster<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter_callback(hits: &Arc<AtomicUsize>) -> impl Fn(u32) + Send + Sync + 'static {
        let hits = Arc::clone(hits);
        move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn subscribe_delivers_one_synchronous_snapshot() {
        let bus: Broadcaster<u32> = Broadcaster::new();
        let hits = Arc::new(AtomicUsize::new(0));
        bus.subscribe(7, counter_callback(&hits));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn notifications_reach_exactly_the_registered() {
        let bus: Broadcaster<u32> = Broadcaster::new();
        let a = Arc::new(AtomicUsize::new(0));
        let b = Arc::new(AtomicUsize::new(0));

        let id_a = bus.subscribe(0, counter_callback(&a));
        let _id_b = bus.subscribe(0, counter_callback(&b));

        bus.notify(1);
        bus.unsubscribe(id_a);
        bus.notify(2);
        // Removing again is a no-op, not an error
        bus.unsubscribe(id_a);
        bus.notify(3);

        // a: initial + 1 notify; b: initial + 3 notifies
        assert_eq!(a.load(Ordering::SeqCst), 2);
        assert_eq!(b.load(Ordering::SeqCst), 4);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn panicking_subscriber_does_not_starve_the_rest() {
        let bus: Broadcaster<u32> = Broadcaster::new();
        let survivor = Arc::new(AtomicUsize::new(0));

        bus.subscribe(0, |_| panic!("subscriber bug"));
        bus.subscribe(0, counter_callback(&survivor));

        bus.notify(1);
        bus.notify(2);

        assert_eq!(survivor.load(Ordering::SeqCst), 3);
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[test]
    fn callback_may_unsubscribe_itself() {
        let bus: Arc<Broadcaster<u32>> = Arc::new(Broadcaster::new());
        let hits = Arc::new(AtomicUsize::new(0));

        let slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));
        let bus_in_cb = Arc::clone(&bus);
        let slot_in_cb = Arc::clone(&slot);
        let hits_in_cb = Arc::clone(&hits);
        let id = bus.subscribe(0, move |_| {
            hits_in_cb.fetch_add(1, Ordering::SeqCst);
            if let Some(id) = *slot_in_cb.lock().unwrap() {
                bus_in_cb.unsubscribe(id);
            }
        });
        *slot.lock().unwrap() = Some(id);

        bus.notify(1);
        bus.notify(2);

        // initial + first notify; the self-removal keeps the second away
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(bus.subscriber_count(), 0);
    }
}

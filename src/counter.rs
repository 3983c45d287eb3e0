//! # Counter entity with change notifications.
//!
//! [`Counter`] holds an integer and a [`NotificationHub`]; every change
//! publishes the new value under [`INCREMENTED`] or [`DECREMENTED`]. The value
//! update and its notification happen in one call: listeners have all run
//! before `increment`/`decrement` returns.
//!
//! The value never wraps: a change that would overflow `i64` is dropped
//! and not published.
//!
//! A counter is meant to be driven from one flow of control. Two threads
//! mutating the same counter each publish their own result, but not
//! necessarily in value order.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use eventpipe::Counter;
//!
//! let counter = Counter::new(10);
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! let s = seen.clone();
//! counter.on_increment(move |n| s.lock().unwrap().push(*n));
//!
//! counter.increment();
//! assert_eq!(*seen.lock().unwrap(), vec![11]);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use tracing::debug;

use crate::hub::{EventKind, NotificationHub, SubscriptionHandle};

/// Kind published after an increment.
pub const INCREMENTED: &str = "incremented";
/// Kind published after a decrement.
pub const DECREMENTED: &str = "decremented";

/// Integer counter that notifies listeners on every change.
pub struct Counter {
    value: AtomicI64,
    hub: Arc<NotificationHub<i64>>,
}

impl Counter {
    /// Creates a counter with its own hub.
    pub fn new(initial: i64) -> Self {
        Self::with_hub(initial, Arc::new(NotificationHub::new()))
    }

    /// Creates a counter publishing into a shared hub.
    pub fn with_hub(initial: i64, hub: Arc<NotificationHub<i64>>) -> Self {
        Self {
            value: AtomicI64::new(initial),
            hub,
        }
    }

    /// Adds one and notifies [`INCREMENTED`] listeners; returns the new value.
    ///
    /// At `i64::MAX` nothing changes, nothing is published, and `i64::MAX` is returned.
    pub fn increment(&self) -> i64 {
        self.apply(INCREMENTED, |v| v.checked_add(1))
    }

    /// Subtracts one and notifies [`DECREMENTED`] listeners; returns the new value.
    ///
    /// At `i64::MIN` nothing changes, nothing is published, and `i64::MIN` is returned.
    pub fn decrement(&self) -> i64 {
        self.apply(DECREMENTED, |v| v.checked_sub(1))
    }

    fn apply(&self, kind: &'static str, step: impl Fn(i64) -> Option<i64>) -> i64 {
        let mut next = 0;
        let updated = self.value.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| {
            next = step(v)?;
            Some(next)
        });
        match updated {
            Ok(_) => {
                self.hub.publish(kind, next);
                next
            }
            Err(current) => {
                debug!(kind, value = current, "counter at limit; change dropped");
                current
            }
        }
    }

    /// Current value.
    pub fn value(&self) -> i64 {
        self.value.load(Ordering::SeqCst)
    }

    /// Listens for increments.
    pub fn on_increment<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&i64) + Send + Sync + 'static,
    {
        self.hub.subscribe(INCREMENTED, callback)
    }

    /// Listens for decrements.
    pub fn on_decrement<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&i64) + Send + Sync + 'static,
    {
        self.hub.subscribe(DECREMENTED, callback)
    }

    /// Listens for any kind published on this counter's hub.
    pub fn on<F>(&self, kind: impl Into<EventKind>, callback: F) -> SubscriptionHandle
    where
        F: Fn(&i64) + Send + Sync + 'static,
    {
        self.hub.subscribe(kind, callback)
    }

    /// Removes a listener; `false` if already removed.
    pub fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool {
        self.hub.unsubscribe(handle)
    }

    /// The hub this counter publishes into.
    pub fn hub(&self) -> &Arc<NotificationHub<i64>> {
        &self.hub
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_one_listener_on_both_kinds_sees_every_change() {
        let counter = Counter::new(10);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let callback = {
            let seen = seen.clone();
            move |n: &i64| seen.lock().unwrap().push(*n)
        };
        counter.on_increment(callback.clone());
        counter.on_decrement(callback);

        counter.increment();
        counter.increment();
        counter.decrement();
        counter.decrement();
        counter.decrement();

        assert_eq!(*seen.lock().unwrap(), vec![11, 12, 11, 10, 9]);
        assert_eq!(counter.value(), 9);
    }

    #[test]
    fn test_unsubscribed_listener_goes_quiet() {
        let counter = Counter::new(0);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        let handle = counter.on_increment(move |n| s.lock().unwrap().push(*n));

        counter.increment();
        assert!(counter.unsubscribe(&handle));
        counter.increment();

        assert_eq!(*seen.lock().unwrap(), vec![1]);
        assert_eq!(counter.value(), 2);
    }

    #[test]
    fn test_shared_hub_reaches_external_listener() {
        let hub = Arc::new(NotificationHub::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        hub.subscribe(DECREMENTED, move |n: &i64| s.lock().unwrap().push(*n));

        let counter = Counter::with_hub(1, hub);
        assert_eq!(counter.decrement(), 0);
        assert_eq!(*seen.lock().unwrap(), vec![0]);
    }

    #[test]
    fn test_increment_at_max_is_dropped_silently() {
        let counter = Counter::new(i64::MAX - 1);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        counter.on_increment(move |n| s.lock().unwrap().push(*n));

        assert_eq!(counter.increment(), i64::MAX);
        assert_eq!(counter.increment(), i64::MAX);
        assert_eq!(counter.value(), i64::MAX);
        assert_eq!(*seen.lock().unwrap(), vec![i64::MAX]);
    }

    #[test]
    fn test_decrement_at_min_is_dropped_silently() {
        let counter = Counter::new(i64::MIN);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        counter.on_decrement(move |n| s.lock().unwrap().push(*n));

        assert_eq!(counter.decrement(), i64::MIN);
        assert_eq!(counter.value(), i64::MIN);
        assert!(seen.lock().unwrap().is_empty());

        assert_eq!(counter.increment(), i64::MIN + 1);
    }

    #[test]
    fn test_value_visible_inside_listener() {
        let counter = Arc::new(Counter::new(5));
        let observed = Arc::new(Mutex::new(None));
        let (c, o) = (Arc::downgrade(&counter), observed.clone());
        counter.on_increment(move |_| {
            *o.lock().unwrap() = c.upgrade().map(|c| c.value());
        });

        counter.increment();
        assert_eq!(*observed.lock().unwrap(), Some(6));
    }
}

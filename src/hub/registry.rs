//! # Synchronous, ordered notification hub.
//!
//! [`NotificationHub`] maps each [`EventKind`] to an ordered list of
//! subscribers. `publish` invokes them in registration order on the calling
//! thread and returns only after the last one finished.
//!
//! ## Architecture
//! ```text
//! publish(kind, payload)
//!     │
//!     ├─► acquire dispatch slot ── held by another thread? wait (condvar)
//!     │                        └─ held by this thread (nested publish)? queue, return Deferred
//!     ├─► snapshot subscribers[kind]       (registry lock released before invoking)
//!     ├─► sub1(payload) ─► sub2(payload) ─► ... ─► subN(payload)
//!     │        └─ panic / Err → warn!, counted in DispatchReport, continue
//!     ├─► drain nested publishes queued by callbacks (FIFO)
//!     └─► release slot, wake waiters
//! ```
//!
//! ## Rules
//! - Dispatch order equals subscription order.
//! - The subscriber list is captured when dispatch begins: `subscribe`/`unsubscribe`
//!   from inside a callback take effect on the next dispatch.
//! - Two publishes on one hub never interleave.
//! - A failing subscriber never affects the registry or other subscribers.
//!
//! Publishing from async code is fine while callbacks stay short; a publish that
//! waits for another thread's dispatch blocks its executor thread meanwhile. Use
//! [`DispatchQueue`](crate::DispatchQueue) to funnel many async producers instead.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use tracing::{trace, warn};

use crate::error::SubscriberError;
use crate::hub::EventKind;
use crate::hub::subscriber::{Subscriber, SubscriptionHandle};

/// Outcome of a single dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Kind that was published.
    pub kind: EventKind,
    /// Subscribers that returned normally.
    pub delivered: usize,
    /// Failures caught during dispatch, in invocation order.
    pub failed: Vec<SubscriberError>,
}

impl DispatchReport {
    fn new(kind: EventKind) -> Self {
        Self {
            kind,
            delivered: 0,
            failed: Vec::new(),
        }
    }

    /// Number of subscribers invoked (successful or not).
    pub fn invoked(&self) -> usize {
        self.delivered + self.failed.len()
    }

    /// True when every invoked subscriber returned normally.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Result of [`NotificationHub::publish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Publish {
    /// This call performed the dispatch.
    Delivered(DispatchReport),
    /// Published from inside a callback; queued behind the running dispatch
    /// and delivered before the outermost `publish` returns.
    Deferred,
}

impl Publish {
    /// Returns the report if the dispatch ran in this call.
    pub fn report(&self) -> Option<&DispatchReport> {
        match self {
            Publish::Delivered(r) => Some(r),
            Publish::Deferred => None,
        }
    }
}

struct DispatchSlot<P> {
    owner: Option<ThreadId>,
    pending: VecDeque<(EventKind, P)>,
}

/// Publish/subscribe registry with synchronous, in-order fan-out.
///
/// ## Example
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use eventpipe::NotificationHub;
///
/// let hub = NotificationHub::<i64>::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let s = seen.clone();
/// hub.subscribe("incremented", move |n| s.lock().unwrap().push(*n));
///
/// hub.publish("incremented", 11);
/// assert_eq!(*seen.lock().unwrap(), vec![11]);
/// ```
pub struct NotificationHub<P> {
    registry: Mutex<HashMap<EventKind, Vec<Arc<Subscriber<P>>>>>,
    slot: Mutex<DispatchSlot<P>>,
    idle: Condvar,
    next_id: AtomicU64,
}

impl<P: 'static> NotificationHub<P> {
    /// Creates an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(HashMap::new()),
            slot: Mutex::new(DispatchSlot {
                owner: None,
                pending: VecDeque::new(),
            }),
            idle: Condvar::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registers `callback` for `kind`, after every existing subscriber of that kind.
    pub fn subscribe<F>(&self, kind: impl Into<EventKind>, callback: F) -> SubscriptionHandle
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        self.insert(kind.into(), None, move |p: &P| {
            callback(p);
            Ok(())
        })
    }

    /// Registers a named callback; the name shows up in logs and errors.
    pub fn subscribe_named<F>(
        &self,
        kind: impl Into<EventKind>,
        name: impl Into<Arc<str>>,
        callback: F,
    ) -> SubscriptionHandle
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        self.insert(kind.into(), Some(name.into()), move |p: &P| {
            callback(p);
            Ok(())
        })
    }

    /// Registers a callback that may fail. An `Err` is logged and counted like a panic.
    pub fn subscribe_fallible<F>(&self, kind: impl Into<EventKind>, callback: F) -> SubscriptionHandle
    where
        F: Fn(&P) -> Result<(), SubscriberError> + Send + Sync + 'static,
    {
        self.insert(kind.into(), None, callback)
    }

    fn insert<F>(&self, kind: EventKind, name: Option<Arc<str>>, callback: F) -> SubscriptionHandle
    where
        F: Fn(&P) -> Result<(), SubscriberError> + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let sub = Arc::new(Subscriber::new(id, name, Arc::new(callback)));
        self.registry()
            .entry(kind.clone())
            .or_default()
            .push(sub);
        trace!(kind = %kind, id, "subscribed");
        SubscriptionHandle::new(kind, id)
    }

    /// Removes a subscriber. Returns `false` if it was already removed.
    ///
    /// Safe to call from inside a callback; a dispatch already in progress
    /// still invokes the removed subscriber.
    pub fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool {
        let mut registry = self.registry();
        let Some(subs) = registry.get_mut(handle.kind()) else {
            return false;
        };
        let before = subs.len();
        subs.retain(|s| s.id != handle.id());
        let removed = subs.len() != before;
        if subs.is_empty() {
            registry.remove(handle.kind());
        }
        removed
    }

    /// Removes every subscriber of `kind`; returns how many were removed.
    pub fn clear(&self, kind: &str) -> usize {
        self.registry().remove(kind).map_or(0, |subs| subs.len())
    }

    /// Number of subscribers currently registered for `kind`.
    pub fn subscriber_count(&self, kind: &str) -> usize {
        self.registry().get(kind).map_or(0, Vec::len)
    }

    /// Kinds with at least one subscriber, sorted.
    pub fn kinds(&self) -> Vec<EventKind> {
        let mut kinds: Vec<EventKind> = self.registry().keys().cloned().collect();
        kinds.sort_unstable();
        kinds
    }

    /// Invokes every subscriber of `kind` in registration order and returns
    /// once all of them have run.
    ///
    /// ### Ordering
    /// - Another thread's dispatch in progress → this call waits for it.
    /// - Called from inside a callback → queued; returns [`Publish::Deferred`].
    pub fn publish(&self, kind: impl Into<EventKind>, payload: P) -> Publish {
        let kind = kind.into();
        let me = thread::current().id();

        let mut slot = self.slot();
        loop {
            match slot.owner {
                None => break,
                Some(owner) if owner == me => {
                    trace!(kind = %kind, "nested publish deferred");
                    slot.pending.push_back((kind, payload));
                    return Publish::Deferred;
                }
                Some(_) => {
                    slot = self.idle.wait(slot).unwrap_or_else(PoisonError::into_inner);
                }
            }
        }
        slot.owner = Some(me);
        drop(slot);

        let _release = SlotRelease { hub: self };
        let report = self.deliver(&kind, &payload);
        loop {
            // Slot lock must be released before delivering; callbacks may publish again.
            let next = self.slot().pending.pop_front();
            let Some((kind, payload)) = next else { break };
            self.deliver(&kind, &payload);
        }
        Publish::Delivered(report)
    }

    fn deliver(&self, kind: &EventKind, payload: &P) -> DispatchReport {
        let subs: Vec<Arc<Subscriber<P>>> = self.registry().get(kind).cloned().unwrap_or_default();

        let mut report = DispatchReport::new(kind.clone());
        for sub in subs {
            match sub.invoke(payload) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    warn!(
                        kind = %kind,
                        subscriber = %sub.label(),
                        label = err.as_label(),
                        "{}; continuing dispatch",
                        err.as_message()
                    );
                    report.failed.push(err);
                }
            }
        }
        report
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<EventKind, Vec<Arc<Subscriber<P>>>>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self) -> MutexGuard<'_, DispatchSlot<P>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P: 'static> Default for NotificationHub<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// Frees the dispatch slot even if delivery unwinds.
struct SlotRelease<'a, P> {
    hub: &'a NotificationHub<P>,
}

impl<P> Drop for SlotRelease<'_, P> {
    fn drop(&mut self) {
        let mut slot = self.hub.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.owner = None;
        slot.pending.clear();
        drop(slot);
        self.hub.idle.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn(&i64) + Send + Sync>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = log.clone();
        let make = move |tag: &str| -> Box<dyn Fn(&i64) + Send + Sync> {
            let l = l.clone();
            let tag = tag.to_string();
            Box::new(move |n: &i64| l.lock().unwrap().push(format!("{tag}:{n}")))
        };
        (log, make)
    }

    #[test]
    fn test_dispatch_follows_registration_order() {
        let hub = NotificationHub::<i64>::new();
        let (log, make) = recorder();
        for tag in ["a", "b", "c"] {
            let cb = make(tag);
            hub.subscribe("tick", move |n| cb(n));
        }

        let out = hub.publish("tick", 1);
        assert_eq!(out.report().map(|r| r.delivered), Some(3));
        assert_eq!(*log.lock().unwrap(), vec!["a:1", "b:1", "c:1"]);
    }

    #[test]
    fn test_publish_only_reaches_matching_kind() {
        let hub = NotificationHub::<i64>::new();
        let (log, make) = recorder();
        let cb = make("inc");
        hub.subscribe("incremented", move |n| cb(n));

        let out = hub.publish("decremented", 9);
        assert_eq!(out.report().map(DispatchReport::invoked), Some(0));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_removed_subscriber_never_called_again() {
        let hub = NotificationHub::<i64>::new();
        let (log, make) = recorder();
        let a = make("a");
        let b = make("b");
        let ha = hub.subscribe("k", move |n| a(n));
        hub.subscribe("k", move |n| b(n));

        hub.publish("k", 1);
        assert!(hub.unsubscribe(&ha));
        assert!(!hub.unsubscribe(&ha));
        hub.publish("k", 2);

        assert_eq!(*log.lock().unwrap(), vec!["a:1", "b:1", "b:2"]);
        assert_eq!(hub.subscriber_count("k"), 1);
    }

    #[test]
    fn test_failing_subscriber_does_not_stop_dispatch() {
        let hub = NotificationHub::<i64>::new();
        let (log, make) = recorder();
        let a = make("a");
        let c = make("c");
        hub.subscribe("k", move |n| a(n));
        hub.subscribe_named("k", "bad", |_| panic!("boom"));
        hub.subscribe_fallible("k", |_| Err(SubscriberError::failed("refused")));
        hub.subscribe("k", move |n| c(n));

        let out = hub.publish("k", 5);
        let report = out.report().unwrap();
        assert_eq!(report.delivered, 2);
        assert_eq!(report.failed.len(), 2);
        assert_eq!(
            report.failed[0],
            SubscriberError::Panicked {
                subscriber: "bad".into(),
                info: "boom".into()
            }
        );
        assert_eq!(*log.lock().unwrap(), vec!["a:5", "c:5"]);

        // Hub still usable.
        hub.publish("k", 6);
        assert_eq!(log.lock().unwrap().len(), 4);
    }

    #[test]
    fn test_unsubscribe_during_dispatch_applies_next_time() {
        let hub = Arc::new(NotificationHub::<i64>::new());
        let (log, make) = recorder();

        let later = make("later");
        let victim: Arc<Mutex<Option<SubscriptionHandle>>> = Arc::new(Mutex::new(None));

        let h = hub.clone();
        let v = victim.clone();
        hub.subscribe("k", move |_| {
            if let Some(handle) = v.lock().unwrap().as_ref() {
                h.unsubscribe(handle);
            }
        });
        let handle = hub.subscribe("k", move |n| later(n));
        *victim.lock().unwrap() = Some(handle);

        hub.publish("k", 1);
        hub.publish("k", 2);
        assert_eq!(*log.lock().unwrap(), vec!["later:1"]);
    }

    #[test]
    fn test_subscribe_during_dispatch_applies_next_time() {
        let hub = Arc::new(NotificationHub::<i64>::new());
        let log = Arc::new(Mutex::new(Vec::<String>::new()));
        let added = Arc::new(Mutex::new(false));

        let h = hub.clone();
        let l = log.clone();
        hub.subscribe("k", move |_| {
            let mut added = added.lock().unwrap();
            if !*added {
                *added = true;
                let l = l.clone();
                h.subscribe("k", move |n: &i64| l.lock().unwrap().push(format!("new:{n}")));
            }
        });

        hub.publish("k", 1);
        assert!(log.lock().unwrap().is_empty());
        hub.publish("k", 2);
        assert_eq!(*log.lock().unwrap(), vec!["new:2"]);
    }

    #[test]
    fn test_nested_publish_runs_after_current_dispatch() {
        let hub = Arc::new(NotificationHub::<i64>::new());
        let log = Arc::new(Mutex::new(Vec::new()));

        let h = hub.clone();
        let l = log.clone();
        hub.subscribe("outer", move |n| {
            l.lock().unwrap().push(format!("outer-a:{n}"));
            assert_eq!(h.publish("inner", n + 100), Publish::Deferred);
        });
        let l = log.clone();
        hub.subscribe("outer", move |n| l.lock().unwrap().push(format!("outer-b:{n}")));
        let l = log.clone();
        hub.subscribe("inner", move |n| l.lock().unwrap().push(format!("inner:{n}")));

        let out = hub.publish("outer", 1);
        assert!(matches!(out, Publish::Delivered(_)));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["outer-a:1", "outer-b:1", "inner:101"]
        );
    }

    #[test]
    fn test_deferred_dispatch_may_publish_again() {
        let hub = Arc::new(NotificationHub::<i64>::new());
        let log = Arc::new(Mutex::new(Vec::new()));

        for (kind, next) in [("first", Some("second")), ("second", Some("third")), ("third", None)] {
            let h = hub.clone();
            let l = log.clone();
            hub.subscribe(kind, move |n| {
                l.lock().unwrap().push(format!("{kind}:{n}"));
                if let Some(next) = next {
                    h.publish(next, n + 1);
                }
            });
        }

        hub.publish("first", 1);
        assert_eq!(*log.lock().unwrap(), vec!["first:1", "second:2", "third:3"]);
    }

    #[test]
    fn test_publishes_from_threads_never_interleave() {
        let hub = Arc::new(NotificationHub::<i64>::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        let (entered_tx, entered_rx) = mpsc::channel();

        let l = log.clone();
        hub.subscribe("k", move |n| {
            l.lock().unwrap().push(format!("start:{n}"));
            if *n == 1 {
                entered_tx.send(()).unwrap();
                std::thread::sleep(Duration::from_millis(50));
            }
        });
        let l = log.clone();
        hub.subscribe("k", move |n| l.lock().unwrap().push(format!("end:{n}")));

        let h = hub.clone();
        let first = std::thread::spawn(move || {
            h.publish("k", 1);
        });
        entered_rx.recv().unwrap();
        let out = hub.publish("k", 2);
        first.join().unwrap();

        assert!(matches!(out, Publish::Delivered(_)));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["start:1", "end:1", "start:2", "end:2"]
        );
    }

    #[test]
    fn test_kinds_and_clear() {
        let hub = NotificationHub::<i64>::new();
        hub.subscribe("b", |_| {});
        hub.subscribe("a", |_| {});
        hub.subscribe("a", |_| {});

        assert_eq!(hub.kinds(), vec![EventKind::from("a"), EventKind::from("b")]);
        assert_eq!(hub.clear("a"), 2);
        assert_eq!(hub.subscriber_count("a"), 0);
        assert_eq!(hub.clear("a"), 0);
    }
}

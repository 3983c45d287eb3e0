//! # Registered callbacks and their handles.
//!
//! A [`Subscriber`] is owned by the hub: the callback, a hub-unique id and an
//! optional name used in logs and [`SubscriberError`]s.
//!
//! ## Panic isolation
//! Every invocation goes through `catch_unwind`. A panic becomes
//! [`SubscriberError::Panicked`]; the hub keeps dispatching.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a callback panics while holding a lock it captured.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::error::SubscriberError;
use crate::hub::EventKind;

pub(crate) type Callback<P> = Arc<dyn Fn(&P) -> Result<(), SubscriberError> + Send + Sync>;

/// Handle returned by `subscribe`; pass it to `unsubscribe` to remove the callback.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    kind: EventKind,
    id: u64,
}

impl SubscriptionHandle {
    pub(crate) fn new(kind: EventKind, id: u64) -> Self {
        Self { kind, id }
    }

    /// Kind this subscription listens to.
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Hub-unique subscriber id.
    pub fn id(&self) -> u64 {
        self.id
    }
}

pub(crate) struct Subscriber<P> {
    pub(crate) id: u64,
    name: Option<Arc<str>>,
    callback: Callback<P>,
}

impl<P> Subscriber<P> {
    pub(crate) fn new(id: u64, name: Option<Arc<str>>, callback: Callback<P>) -> Self {
        Self { id, name, callback }
    }

    /// Name for logs: the given name, or `#<id>`.
    pub(crate) fn label(&self) -> String {
        match &self.name {
            Some(name) => name.to_string(),
            None => format!("#{}", self.id),
        }
    }

    /// Invokes the callback, converting panics and errors into [`SubscriberError`].
    pub(crate) fn invoke(&self, payload: &P) -> Result<(), SubscriberError> {
        match catch_unwind(AssertUnwindSafe(|| (self.callback)(payload))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(err.with_subscriber(&self.label())),
            Err(panic) => Err(SubscriberError::Panicked {
                subscriber: self.label(),
                info: panic_message(panic.as_ref()),
            }),
        }
    }
}

pub(crate) fn panic_message(any: &(dyn Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

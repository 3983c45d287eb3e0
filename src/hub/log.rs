//! # LogWriter: payload printer
//!
//! A minimal subscriber that writes each payload it receives through `tracing`.
//! Use it for demos and debugging.
//!
//! ## Example output
//! ```text
//! INFO eventpipe::hub::log: notification kind=incremented payload=11
//! INFO eventpipe::hub::log: notification kind=decremented payload=10
//! ```

use std::fmt::Debug;

use tracing::info;

use crate::hub::{EventKind, NotificationHub, SubscriptionHandle};

/// Tracing-backed payload writer.
#[derive(Default, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Subscribes the writer to `kind` on `hub`.
    pub fn attach<P>(&self, hub: &NotificationHub<P>, kind: impl Into<EventKind>) -> SubscriptionHandle
    where
        P: Debug + 'static,
    {
        let kind = kind.into();
        let tag = kind.clone();
        hub.subscribe_named(kind, "LogWriter", move |payload: &P| {
            info!(kind = %tag, payload = ?payload, "notification");
        })
    }
}

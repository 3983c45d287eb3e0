//! Notifications: kind tokens, the synchronous hub and the async dispatch queue.
//!
//! ## Contents
//! - [`EventKind`] name of a notification category (lookup key)
//! - [`NotificationHub`] ordered, synchronous fan-out to subscribers
//! - [`SubscriptionHandle`] removal token returned by `subscribe`
//! - [`DispatchQueue`] / [`DispatchSender`] serialized publishing for async producers
//!
//! ## Quick reference
//! - **Publishers**: [`Counter`](crate::Counter), [`HubSink`](crate::HubSink),
//!   any code holding the hub, or many tasks through a [`DispatchQueue`].
//! - **Consumers**: closures registered with `subscribe*`.

mod kind;
#[cfg(feature = "logging")]
mod log;
mod queue;
mod registry;
mod subscriber;

pub use kind::EventKind;
#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use queue::{DispatchQueue, DispatchSender};
pub use registry::{DispatchReport, NotificationHub, Publish};
pub use subscriber::SubscriptionHandle;

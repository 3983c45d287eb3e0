//! Pipes: drive a [`LazyStream`](crate::LazyStream) into a [`Sink`].
//!
//! ## Contents
//! - [`Sink`] write/close contract with per-write readiness
//! - [`LineWriter`] newline-terminated text to stdout, a file, or any `AsyncWrite`
//! - [`HubSink`] relays items into a [`NotificationHub`](crate::NotificationHub)
//! - [`Pipe`], [`run`] the coordinator; [`Completion`], [`Outcome`] its result
//!
//! ## Architecture
//! ```text
//! LazyStream ──request_next()──► Pipe ──write(item)──► Sink
//!      ▲                          │                      │
//!      └──────── next pull only after write resolves ◄───┘
//! ```

mod hub_sink;
mod line;
#[allow(clippy::module_inception)]
mod pipe;
mod sink;

pub use hub_sink::HubSink;
pub use line::LineWriter;
pub use pipe::{Completion, Outcome, Pipe, run};
pub use sink::Sink;

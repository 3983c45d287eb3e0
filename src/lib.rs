//! # eventpipe
//!
//! **Eventpipe** provides two coordination primitives for Rust programs:
//!
//! - a [`NotificationHub`] that fans a published payload out to every
//!   subscriber of its [`EventKind`], synchronously and in registration order;
//! - a [`LazyStream`] that produces one item per consumer request, with a
//!   single request in flight at a time, plus a [`Pipe`] that drives a stream
//!   into a [`Sink`] without ever pulling ahead of it.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  ┌──────────────┐  increment()/decrement()  ┌─────────────────────────────────┐
//!  │   Counter    │ ────── publish(kind) ───► │ NotificationHub                 │
//!  └──────────────┘                           │  kind → [sub#1, sub#2, ...]     │
//!  ┌──────────────┐  send(kind, payload)      │  (registration order, sync)     │
//!  │DispatchQueue │ ────── publish(kind) ───► │                                 │
//!  └──────────────┘                           └───────┬───────────┬─────────────┘
//!         ▲                                           ▼           ▼
//!   async producers                              callback     callback
//!
//!  ┌──────────────┐ request_next() ┌──────────┐ write(item) ┌────────────────────┐
//!  │  LazyStream  │ ◄───────────── │   Pipe   │ ──────────► │ Sink               │
//!  │  (Produce)   │ ─────────────► │          │ ◄────────── │ LineWriter/HubSink │
//!  └──────┬───────┘   Some(item)   └──────────┘   ready     └────────────────────┘
//!         │
//!         └── CancellationToken ◄── Shutdown (SIGINT/SIGTERM/SIGQUIT)
//! ```
//!
//! ### Stream lifecycle
//! ```text
//! Idle ──request_next()──► Producing ──item──► Idle (cursor += 1)
//!   │                         │
//!   │                         ├─ cursor == bound    ─► Terminated
//!   │                         ├─ producer error     ─► Terminated
//!   │                         └─ cancel()           ─► Terminated (pull → Abandoned)
//!   └─ cancel() ──────────────────────────────────────► Terminated
//!
//! Terminated: every request_next() → Ok(None)
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                           |
//! |-------------------|--------------------------------------------------------------|----------------------------------------------|
//! | **Notifications** | Kind-keyed, ordered, synchronous fan-out.                    | [`NotificationHub`], [`EventKind`]           |
//! | **Async publish** | Serialized publishing for many async producers.              | [`DispatchQueue`], [`DispatchSender`]        |
//! | **Streams**       | Pull-driven production with bound, delay, and cancellation.  | [`LazyStream`], [`Produce`]                  |
//! | **Pipes**         | Backpressured stream → sink coordination.                    | [`Pipe`], [`Sink`], [`LineWriter`]           |
//! | **Entities**      | Stateful objects that announce their changes.                | [`Counter`]                                  |
//! | **Shutdown**      | Signal handling and cancellation fan-out.                    | [`Shutdown`], [`register_shutdown_handler`]  |
//! | **Errors**        | Typed errors with stable labels.                             | [`StreamError`], [`PipeError`], [`SinkError`]|
//! | **Configuration** | Stream bound/delay/start, queue capacity.                    | [`StreamConfig`], [`HubConfig`]              |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use eventpipe::{Completion, LazyStream, LineWriter, Outcome, StreamConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = StreamConfig::default().with_bound(3).with_delay(std::time::Duration::ZERO);
//!     let stream = LazyStream::ticker(&cfg);
//!
//!     let done = eventpipe::run(stream, LineWriter::new(Vec::new())).await?;
//!     assert_eq!(done, Completion { delivered: 3, outcome: Outcome::Finished });
//!     Ok(())
//! }
//! ```
mod config;
mod counter;
mod error;
mod hub;
mod pipe;
mod shutdown;
mod stream;

// ---- Public re-exports ----

pub use config::{HubConfig, StreamConfig};
pub use counter::{Counter, DECREMENTED, INCREMENTED};
pub use error::{HubError, PipeError, ShutdownError, SinkError, StreamError, SubscriberError};
pub use hub::{
    DispatchQueue, DispatchReport, DispatchSender, EventKind, NotificationHub, Publish,
    SubscriptionHandle,
};
pub use pipe::{Completion, HubSink, LineWriter, Outcome, Pipe, Sink, run};
pub use shutdown::{
    Shutdown, is_shutdown, register_shutdown_handler, shutdown, shutdown_token,
    wait_for_shutdown_signal,
};
pub use stream::{Inbound, LazyStream, Phase, Produce, ProduceFn, StreamState, Ticker};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use hub::LogWriter;

//! # Sink trait.
//!
//! A [`Sink`] consumes the items a [`Pipe`](crate::Pipe) pulls. `write`
//! resolves once the sink is ready for the next item; that is the sink's
//! backpressure signal, and the pipe never pulls before it.
//!
//! ## Rules
//! - Items arrive in production order, one write at a time.
//! - `close` is called exactly once by the pipe, on every exit path.
//! - A failed write aborts the pipe run.

use async_trait::async_trait;

use crate::error::SinkError;

/// Destination for piped items.
///
/// ### Implementation requirements
/// - Return from `write` only when the next write may start.
/// - Flush buffered data in `close`.
#[async_trait]
pub trait Sink<T: Send + 'static>: Send {
    /// Writes one item.
    async fn write(&mut self, item: T) -> Result<(), SinkError>;

    /// Flushes and releases the sink.
    async fn close(&mut self) -> Result<(), SinkError>;

    /// Returns the sink name used in logs.
    ///
    /// The default uses `type_name::<Self>()`; override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

//! # Producers: what a pull waits on.
//!
//! A [`Produce`] implementation is the readiness source of a
//! [`LazyStream`](crate::LazyStream): the stream hands it the advanced cursor
//! and suspends until it resolves.
//!
//! - [`Ticker`]: the cursor itself, after a fixed delay (timer readiness).
//! - [`Inbound`]: the next value from a channel fed by an external task
//!   (e.g. a socket reader handing over datagrams).
//! - [`ProduceFn`]: any closure `Fn(u64) -> Future`.
//!
//! `Ok(None)` from a producer means the source itself has ended.

use std::borrow::Cow;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use crate::error::StreamError;

/// # Asynchronous source of stream items.
///
/// `produce` is only called while the stream is `Producing`, never twice at
/// once for the same stream.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use eventpipe::{Produce, StreamError};
///
/// struct Squares;
///
/// #[async_trait]
/// impl Produce for Squares {
///     type Item = u64;
///
///     async fn produce(&self, cursor: u64) -> Result<Option<u64>, StreamError> {
///         Ok(Some(cursor * cursor))
///     }
/// }
/// ```
#[async_trait]
pub trait Produce: Send + Sync + 'static {
    /// Item type handed to the consumer.
    type Item: Send + 'static;

    /// Produces the item for `cursor`, or `None` if the source is exhausted.
    async fn produce(&self, cursor: u64) -> Result<Option<Self::Item>, StreamError>;
}

/// Yields the cursor after a fixed delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ticker {
    delay: Option<Duration>,
}

impl Ticker {
    /// `None` produces immediately.
    pub fn new(delay: Option<Duration>) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Produce for Ticker {
    type Item = u64;

    async fn produce(&self, cursor: u64) -> Result<Option<u64>, StreamError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(Some(cursor))
    }
}

/// Yields values pushed by an external task; ends when every sender is dropped.
pub struct Inbound<T> {
    rx: Mutex<mpsc::Receiver<T>>,
}

impl<T: Send + 'static> Inbound<T> {
    /// Wraps an existing receiver.
    pub fn new(rx: mpsc::Receiver<T>) -> Self {
        Self { rx: Mutex::new(rx) }
    }

    /// Creates a bounded channel and returns the sender alongside the producer.
    pub fn channel(capacity: usize) -> (mpsc::Sender<T>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl<T: Send + 'static> Produce for Inbound<T> {
    type Item = T;

    async fn produce(&self, _cursor: u64) -> Result<Option<T>, StreamError> {
        Ok(self.rx.lock().await.recv().await)
    }
}

/// Closure-backed producer.
///
/// Wraps `F: Fn(u64) -> Fut`, creating a fresh future per pull.
pub struct ProduceFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ProduceFn<F> {
    /// Creates a new closure-backed producer.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Producer name, for logs.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl<F, Fut, T> Produce for ProduceFn<F>
where
    F: Fn(u64) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<T>, StreamError>> + Send + 'static,
    T: Send + 'static,
{
    type Item = T;

    async fn produce(&self, cursor: u64) -> Result<Option<T>, StreamError> {
        (self.f)(cursor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ticker_waits_for_delay() {
        let ticker = Ticker::new(Some(Duration::from_millis(500)));
        let started = tokio::time::Instant::now();
        assert_eq!(ticker.produce(3).await, Ok(Some(3)));
        assert!(started.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_inbound_ends_when_senders_drop() {
        let (tx, inbound) = Inbound::channel(4);
        tx.send("hello").await.unwrap();
        drop(tx);
        assert_eq!(inbound.produce(1).await, Ok(Some("hello")));
        assert_eq!(inbound.produce(2).await, Ok(None));
    }

    #[tokio::test]
    async fn test_produce_fn_maps_cursor() {
        let p = ProduceFn::new("labels", |n: u64| async move {
            Ok::<_, StreamError>(Some(format!("item-{n}")))
        });
        assert_eq!(p.name(), "labels");
        assert_eq!(p.produce(2).await, Ok(Some("item-2".to_string())));
    }
}

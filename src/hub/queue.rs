//! # Serialized async publishing.
//!
//! [`DispatchQueue`] funnels publishes from any number of async producers
//! into one worker task that calls [`NotificationHub::publish`] in FIFO order.
//!
//! ## Architecture
//! ```text
//! Producers (many):                       Worker (one):
//!   task A ── send(kind, p) ──┐
//!   task B ── try_send(...) ──┼──► [bounded mpsc] ──► hub.publish(kind, p) ──► ack (oneshot)
//!   task C ── send(kind, p) ──┘
//! ```
//!
//! ## Rules
//! - **FIFO**: publishes are dispatched in the order they were accepted.
//! - **`send`** waits for queue space and for the dispatch to finish.
//! - **`try_send`** never waits; a full queue drops the publish (`HubError::QueueFull`).
//! - **Deferred emission**: a publish enqueued during setup is dispatched only after
//!   the enqueuing task yields, so listeners attached right after still see it.
//! - **Shutdown** stops accepting new publishes, drains what is queued, joins the worker.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::HubConfig;
use crate::error::HubError;
use crate::hub::{EventKind, NotificationHub, Publish};

struct Envelope<P> {
    kind: EventKind,
    payload: P,
    ack: Option<oneshot::Sender<Publish>>,
}

/// Cloneable producer side of a [`DispatchQueue`].
pub struct DispatchSender<P> {
    tx: mpsc::Sender<Envelope<P>>,
}

impl<P> Clone for DispatchSender<P> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<P: Send + 'static> DispatchSender<P> {
    /// Enqueues a publish and waits until the hub has dispatched it.
    pub async fn send(&self, kind: impl Into<EventKind>, payload: P) -> Result<Publish, HubError> {
        let (ack, done) = oneshot::channel();
        let env = Envelope {
            kind: kind.into(),
            payload,
            ack: Some(ack),
        };
        self.tx.send(env).await.map_err(|_| HubError::QueueClosed)?;
        done.await.map_err(|_| HubError::WorkerGone)
    }

    /// Enqueues a publish without waiting for space or dispatch.
    pub fn try_send(&self, kind: impl Into<EventKind>, payload: P) -> Result<(), HubError> {
        let env = Envelope {
            kind: kind.into(),
            payload,
            ack: None,
        };
        self.tx.try_send(env).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => HubError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => HubError::QueueClosed,
        })
    }
}

/// Single-worker dispatch queue in front of a [`NotificationHub`].
pub struct DispatchQueue<P> {
    sender: DispatchSender<P>,
    stop: CancellationToken,
    worker: JoinHandle<()>,
}

impl<P: Send + 'static> DispatchQueue<P> {
    /// Spawns the worker task on the current tokio runtime.
    ///
    /// Must be called from within a runtime.
    #[must_use]
    pub fn spawn(hub: Arc<NotificationHub<P>>, cfg: &HubConfig) -> Self {
        let (tx, mut rx) = mpsc::channel::<Envelope<P>>(cfg.queue_capacity_clamped());
        let stop = CancellationToken::new();
        let stop_worker = stop.clone();

        let worker = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    env = rx.recv() => match env {
                        Some(env) => dispatch(&hub, env),
                        None => break,
                    },
                    _ = stop_worker.cancelled() => {
                        rx.close();
                        while let Some(env) = rx.recv().await {
                            dispatch(&hub, env);
                        }
                        break;
                    }
                }
            }
            debug!("dispatch worker stopped");
        });

        Self {
            sender: DispatchSender { tx },
            stop,
            worker,
        }
    }

    /// Returns a new producer handle.
    pub fn sender(&self) -> DispatchSender<P> {
        self.sender.clone()
    }

    /// See [`DispatchSender::send`].
    pub async fn send(&self, kind: impl Into<EventKind>, payload: P) -> Result<Publish, HubError> {
        self.sender.send(kind, payload).await
    }

    /// See [`DispatchSender::try_send`].
    pub fn try_send(&self, kind: impl Into<EventKind>, payload: P) -> Result<(), HubError> {
        self.sender.try_send(kind, payload)
    }

    /// Stops accepting publishes, drains the queue, and waits for the worker.
    pub async fn shutdown(self) {
        self.stop.cancel();
        drop(self.sender);
        let _ = self.worker.await;
    }
}

fn dispatch<P: 'static>(hub: &NotificationHub<P>, env: Envelope<P>) {
    let out = hub.publish(env.kind, env.payload);
    if let Some(ack) = env.ack {
        let _ = ack.send(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn hub_with_log() -> (Arc<NotificationHub<u32>>, Arc<Mutex<Vec<u32>>>) {
        let hub = Arc::new(NotificationHub::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = log.clone();
        hub.subscribe("n", move |v: &u32| l.lock().unwrap().push(*v));
        (hub, log)
    }

    #[tokio::test]
    async fn test_send_acknowledges_after_dispatch() {
        let (hub, log) = hub_with_log();
        let queue = DispatchQueue::spawn(hub, &HubConfig::default());

        let out = queue.send("n", 7).await.unwrap();
        assert_eq!(out.report().map(|r| r.delivered), Some(1));
        assert_eq!(*log.lock().unwrap(), vec![7]);
        queue.shutdown().await;
    }

    #[tokio::test]
    async fn test_producers_are_serialized_fifo() {
        let (hub, log) = hub_with_log();
        let queue = DispatchQueue::spawn(hub, &HubConfig::default());

        let tx = queue.sender();
        let producer = tokio::spawn(async move {
            for v in 0..50 {
                tx.send("n", v).await.unwrap();
            }
        });
        producer.await.unwrap();

        assert_eq!(*log.lock().unwrap(), (0..50).collect::<Vec<_>>());
        queue.shutdown().await;
    }

    #[tokio::test]
    async fn test_try_send_is_deferred_until_yield() {
        let (hub, log) = hub_with_log();
        let queue = DispatchQueue::spawn(hub.clone(), &HubConfig::default());

        queue.try_send("n", 1).unwrap();
        // Attached after emission, still observes it.
        let late = Arc::new(Mutex::new(Vec::new()));
        let l = late.clone();
        hub.subscribe("n", move |v: &u32| l.lock().unwrap().push(*v));

        queue.shutdown().await;
        assert_eq!(*log.lock().unwrap(), vec![1]);
        assert_eq!(*late.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_shutdown_drains_and_closes() {
        let (hub, log) = hub_with_log();
        let queue = DispatchQueue::spawn(hub, &HubConfig { queue_capacity: 8 });
        let tx = queue.sender();

        for v in 0..5 {
            tx.try_send("n", v).unwrap();
        }
        queue.shutdown().await;

        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(tx.try_send("n", 9), Err(HubError::QueueClosed));
        assert_eq!(tx.send("n", 9).await, Err(HubError::QueueClosed));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_try_send_full_queue() {
        let (hub, _log) = hub_with_log();
        let queue = DispatchQueue::spawn(hub, &HubConfig { queue_capacity: 1 });

        // current_thread: the worker cannot run until we yield.
        queue.try_send("n", 1).unwrap();
        assert_eq!(queue.try_send("n", 2), Err(HubError::QueueFull));
        queue.shutdown().await;
    }
}

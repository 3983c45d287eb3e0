//! # Example: inbound
//!
//! A stream whose readiness comes from outside: a task plays the part of a
//! socket reader and hands over "datagrams" through a channel. Each one is
//! pulled by a [`Pipe`] and relayed to hub listeners through a [`HubSink`].
//!
//! ## Flow
//! ```text
//! reader task ──tx.send()──► Inbound ──► LazyStream ──► Pipe ──► HubSink
//!                                                                  │
//!                                              hub.publish("datagram", msg)
//!                                                      ├─► LogWriter
//!                                                      └─► byte counter
//! ```
//!
//! ## Run
//! Requires the `logging` feature to export [`LogWriter`].
//! ```bash
//! RUST_LOG=info cargo run --example inbound --features logging
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use eventpipe::{
    HubSink, Inbound, LazyStream, LogWriter, NotificationHub, Pipe, StreamConfig,
    register_shutdown_handler, shutdown_token,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    register_shutdown_handler()?;

    let hub = Arc::new(NotificationHub::<String>::new());
    LogWriter::new().attach(&hub, "datagram");

    let bytes = Arc::new(AtomicUsize::new(0));
    let b = bytes.clone();
    hub.subscribe_named("datagram", "byte-counter", move |msg: &String| {
        b.fetch_add(msg.len(), Ordering::Relaxed);
    });

    let (tx, source) = Inbound::channel(8);
    tokio::spawn(async move {
        for i in 1..=5 {
            tokio::time::sleep(Duration::from_millis(200)).await;
            if tx.send(format!("packet-{i}")).await.is_err() {
                break;
            }
        }
        // Dropping the sender ends the stream.
    });

    let stream = LazyStream::with_token(source, &StreamConfig::unbounded(), shutdown_token());
    let done = Pipe::new(stream, HubSink::new(hub, "datagram").strict())
        .run()
        .await?;

    info!(
        delivered = done.delivered,
        bytes = bytes.load(Ordering::Relaxed),
        outcome = ?done.outcome,
        "inbound finished"
    );
    Ok(())
}

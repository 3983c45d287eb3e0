//! # Example: counter
//!
//! A [`Counter`] announcing every change to its listeners.
//!
//! Shows how to:
//! - Listen for both kinds with one callback.
//! - Remove a listener with its [`SubscriptionHandle`](eventpipe::SubscriptionHandle).
//! - Funnel publishes from async tasks through a [`DispatchQueue`].
//!
//! ## Flow
//! ```text
//! counter.increment() ──► hub.publish("incremented", 11) ──► printer(11)
//! counter.decrement() ──► hub.publish("decremented", 10) ──► printer(10)
//!
//! task A ─┐
//! task B ─┼─► DispatchQueue ──► hub.publish(...)   (one at a time, FIFO)
//! task C ─┘
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example counter
//! ```

use std::sync::Arc;

use eventpipe::{Counter, DECREMENTED, DispatchQueue, HubConfig, INCREMENTED};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let counter = Counter::new(10);

    let printer = |n: &i64| println!("value is now {n}");
    counter.on_increment(printer);
    let down = counter.on_decrement(printer);

    counter.increment();
    counter.increment();
    counter.decrement();
    counter.decrement();
    counter.decrement();

    counter.unsubscribe(&down);
    counter.decrement();
    println!("final value {} (last decrement went unheard)", counter.value());

    // Several async producers sharing the counter's hub.
    let queue = DispatchQueue::spawn(Arc::clone(counter.hub()), &HubConfig::default());
    let mut producers = Vec::new();
    for i in 0..3i64 {
        let tx = queue.sender();
        producers.push(tokio::spawn(async move {
            let kind = if i % 2 == 0 { INCREMENTED } else { DECREMENTED };
            tx.send(kind, 100 + i).await
        }));
    }
    for p in producers {
        let publish = p.await??;
        if let Some(report) = publish.report() {
            println!("{} delivered to {} listener(s)", report.kind, report.delivered);
        }
    }
    queue.shutdown().await;
    Ok(())
}

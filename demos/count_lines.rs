//! # Example: count_lines
//!
//! Pipes a bounded counting stream (1..=10, one value every 500 ms) into
//! standard output or a file, one value per line.
//!
//! ## Flow
//! ```text
//! LazyStream<Ticker> ──request_next()──► Pipe ──write──► LineWriter (stdout | file)
//!        ▲
//!        └── shutdown_token() ◄── SIGINT / SIGTERM / SIGQUIT
//! ```
//!
//! Ctrl-C stops production; values already written stay written and the
//! sink is closed.
//!
//! ## Run
//! ```bash
//! cargo run --example count_lines
//! cargo run --example count_lines -- /tmp/count.txt
//! RUST_LOG=eventpipe=debug cargo run --example count_lines
//! ```

use eventpipe::{
    Completion, LazyStream, LineWriter, Outcome, Pipe, StreamConfig, Ticker,
    register_shutdown_handler, shutdown_token,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    register_shutdown_handler()?;

    let cfg = StreamConfig::default();
    let stream = LazyStream::with_token(Ticker::new(cfg.production_delay()), &cfg, shutdown_token());

    let done: Completion = match std::env::args().nth(1) {
        Some(path) => {
            let sink = LineWriter::create(&path).await?;
            info!(path = %path, "writing to file");
            Pipe::new(stream, sink).run().await?
        }
        None => Pipe::new(stream, LineWriter::stdout()).run().await?,
    };

    match done.outcome {
        Outcome::Finished => info!(delivered = done.delivered, "done"),
        Outcome::Cancelled => info!(delivered = done.delivered, "interrupted"),
    }
    Ok(())
}

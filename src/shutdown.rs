//! # Process-level shutdown.
//!
//! Provides [`wait_for_shutdown_signal`] (OS signals), [`Shutdown`] (a root
//! cancellation token that streams and pipes hang off), and a process-wide
//! instance with explicit init/teardown:
//! [`register_shutdown_handler`] and [`shutdown`].
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT` (quit signal, often used for core dumps or hard stop)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]
//!
//! ## Wiring
//! ```text
//! register_shutdown_handler()
//!     └─► spawn: wait_for_shutdown_signal() ──► shutdown()
//!                                                  └─► root.cancel()
//!                                                        ├─► LazyStream A terminated (in-flight pull abandoned)
//!                                                        └─► Pipe B cancelled (sink closed)
//! ```

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::ShutdownError;

/// Resolves on the first of Ctrl-C, `SIGINT`, `SIGTERM` or `SIGQUIT`.
///
/// Listeners are installed per call. Fails only if a listener cannot be registered.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut int = signal(SignalKind::interrupt())?;
    let mut term = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;

    let name = tokio::select! {
        _ = tokio::signal::ctrl_c() => "ctrl-c",
        _ = int.recv() => "SIGINT",
        _ = term.recv() => "SIGTERM",
        _ = quit.recv() => "SIGQUIT",
    };
    tracing::debug!(signal = name, "termination signal");
    Ok(())
}

/// Resolves on Ctrl-C.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Root of a cancellation tree.
///
/// Hand [`token`](Self::token) to every stream that must stop on shutdown
/// (`LazyStream::with_token`); [`shutdown`](Self::shutdown) cancels them all.
#[derive(Clone, Debug, Default)]
pub struct Shutdown {
    root: CancellationToken,
}

impl Shutdown {
    /// Creates an independent shutdown root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Child token, cancelled when this root shuts down.
    pub fn token(&self) -> CancellationToken {
        self.root.child_token()
    }

    /// Cancels every token handed out. Idempotent.
    pub fn shutdown(&self) {
        self.root.cancel();
    }

    /// True once [`shutdown`](Self::shutdown) was called.
    pub fn is_shutdown(&self) -> bool {
        self.root.is_cancelled()
    }

    /// Resolves once shutdown was requested.
    pub async fn wait(&self) {
        self.root.cancelled().await;
    }
}

static PROCESS: OnceLock<Shutdown> = OnceLock::new();
static HANDLER_REGISTERED: AtomicBool = AtomicBool::new(false);

fn process() -> &'static Shutdown {
    PROCESS.get_or_init(Shutdown::new)
}

/// Token tied to the process-wide shutdown.
pub fn shutdown_token() -> CancellationToken {
    process().token()
}

/// Triggers process-wide shutdown: every [`shutdown_token`] is cancelled.
pub fn shutdown() {
    process().shutdown();
}

/// True once process-wide shutdown was triggered.
pub fn is_shutdown() -> bool {
    process().is_shutdown()
}

/// Installs the signal listener that calls [`shutdown`] on SIGINT/SIGTERM/SIGQUIT.
///
/// Must be called from within a tokio runtime, once per process.
///
/// # Errors
/// - [`ShutdownError::AlreadyRegistered`] on a second call
/// - [`ShutdownError::NoRuntime`] outside a tokio runtime
pub fn register_shutdown_handler() -> Result<(), ShutdownError> {
    let handle =
        tokio::runtime::Handle::try_current().map_err(|_| ShutdownError::NoRuntime)?;
    if HANDLER_REGISTERED.swap(true, Ordering::SeqCst) {
        return Err(ShutdownError::AlreadyRegistered);
    }

    let root = process().clone();
    handle.spawn(async move {
        tokio::select! {
            res = wait_for_shutdown_signal() => match res {
                Ok(()) => {
                    info!("shutdown signal received");
                    root.shutdown();
                }
                Err(err) => warn!(error = %err, "signal listener failed; shutdown() must be called explicitly"),
            },
            _ = root.wait() => {}
        }
    });
    Ok(())
}

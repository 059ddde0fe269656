//! OS signal handling.
//!
//! SIGINT and SIGTERM both trigger the same shutdown, at any point after
//! registration. A second signal while shutdown is under way exits the
//! process immediately. Other platforms only see Ctrl+C.

use std::fmt;

use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::Shutdown;
use crate::observability::metrics;

/// The termination request that was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    Interrupt,
    Terminate,
}

impl TerminationSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationSignal::Interrupt => "SIGINT",
            TerminationSignal::Terminate => "SIGTERM",
        }
    }
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registered SIGINT and SIGTERM handlers.
pub struct TerminationListener {
    #[cfg(unix)]
    sigint: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigterm: tokio::signal::unix::Signal,
}

impl TerminationListener {
    /// Register the handlers. Signals delivered after this call are queued
    /// until `recv` observes them.
    #[cfg(unix)]
    pub fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
        })
    }

    #[cfg(not(unix))]
    pub fn register() -> std::io::Result<Self> {
        Ok(Self {})
    }

    /// Wait for the next termination signal.
    #[cfg(unix)]
    pub async fn recv(&mut self) -> std::io::Result<TerminationSignal> {
        let received = tokio::select! {
            _ = self.sigint.recv() => TerminationSignal::Interrupt,
            _ = self.sigterm.recv() => TerminationSignal::Terminate,
        };
        Ok(received)
    }

    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> std::io::Result<TerminationSignal> {
        tokio::signal::ctrl_c().await?;
        Ok(TerminationSignal::Interrupt)
    }
}

/// What to do with a received signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    /// Begin graceful shutdown.
    Shutdown,
    /// Shutdown is already running; stop waiting for it.
    ForceExit,
}

/// Trigger `shutdown` for the first signal; any later one forces exit.
pub fn on_signal(shutdown: &Shutdown, signal: TerminationSignal) -> SignalAction {
    if shutdown.trigger() {
        tracing::info!(signal = %signal, "Termination signal received, shutting down");
        metrics::record_shutdown(signal.as_str());
        SignalAction::Shutdown
    } else {
        tracing::warn!(signal = %signal, "Second termination signal received, exiting immediately");
        SignalAction::ForceExit
    }
}

/// Register signal handlers and spawn a task that handles every SIGINT or
/// SIGTERM for the life of the process.
pub fn install(shutdown: Shutdown) -> std::io::Result<JoinHandle<()>> {
    let mut listener = TerminationListener::register()?;

    Ok(tokio::spawn(async move {
        loop {
            match listener.recv().await {
                Ok(signal) => {
                    if on_signal(&shutdown, signal) == SignalAction::ForceExit {
                        std::process::exit(0);
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Signal listener failed");
                    return;
                }
            }
        }
    }))
}

//! Shared connection handle.
//!
//! Written once after a successful connect, read by request handlers, and
//! read-then-cleared once on shutdown. Reading the slot never blocks; the
//! reported status comes from a ping bounded by the ping timeout.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use serde::Serialize;

use crate::database::client::Connection;
use crate::observability::metrics;

/// Connection state as reported on the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DatabaseStatus {
    Connected,
    Disconnected,
}

type Slot = ArcSwapOption<Box<dyn Connection>>;

/// How long a status check waits for the server to answer a ping.
pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(2);

/// Cloneable handle to the (possibly absent) live connection.
#[derive(Clone)]
pub struct DatabaseHandle {
    slot: Arc<Slot>,
    ping_timeout: Duration,
}

impl Default for DatabaseHandle {
    fn default() -> Self {
        Self {
            slot: Arc::default(),
            ping_timeout: DEFAULT_PING_TIMEOUT,
        }
    }
}

impl DatabaseHandle {
    /// Create an empty handle.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ping_timeout(mut self, ping_timeout: Duration) -> Self {
        self.ping_timeout = ping_timeout;
        self
    }

    /// Store a freshly opened connection.
    pub fn install(&self, connection: Box<dyn Connection>) {
        self.slot.store(Some(Arc::new(connection)));
        metrics::record_database_status(true);
    }

    /// Current connection, if any.
    pub fn connection(&self) -> Option<Arc<Box<dyn Connection>>> {
        self.slot.load_full()
    }

    /// Whether a connection is held, regardless of whether the server
    /// still answers.
    pub fn is_installed(&self) -> bool {
        self.slot.load().is_some()
    }

    /// Live status: `Connected` only if the held connection answers a ping
    /// within the ping timeout.
    pub async fn status(&self) -> DatabaseStatus {
        let Some(connection) = self.connection() else {
            return DatabaseStatus::Disconnected;
        };

        match tokio::time::timeout(self.ping_timeout, connection.ping()).await {
            Ok(Ok(())) => DatabaseStatus::Connected,
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "Database ping failed");
                DatabaseStatus::Disconnected
            }
            Err(_) => {
                tracing::debug!(timeout = ?self.ping_timeout, "Database ping timed out");
                DatabaseStatus::Disconnected
            }
        }
    }

    /// Take the connection out of the handle and close it.
    ///
    /// Returns `false` when there was nothing to release.
    pub async fn release(&self) -> bool {
        let Some(connection) = self.slot.swap(None) else {
            tracing::debug!("No database connection to release");
            return false;
        };

        connection.close().await;
        metrics::record_database_status(false);
        tracing::info!("Database connection closed");
        true
    }
}

impl std::fmt::Debug for DatabaseHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseHandle")
            .field("installed", &self.is_installed())
            .field("ping_timeout", &self.ping_timeout)
            .finish()
    }
}

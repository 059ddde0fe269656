//! Startup orchestration.
//!
//! # Order
//! 1. Configuration is loaded by the caller and handed to the coordinator
//! 2. One database connection attempt, bounded by the connect timeout
//! 3. Bind the listener and start serving
//! 4. Log readiness
//!
//! Each step finishes (or fails) before the next begins, so the listener
//! never accepts traffic while the connection attempt is unresolved.
//!
//! A shutdown requested before the listener is bound cancels the pending
//! connection attempt, releases anything already opened, and skips the bind.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::{JoinError, JoinHandle};

use crate::config::{AppConfig, ConnectFailurePolicy};
use crate::database::{redact_uri, Connection, DatabaseClient, DatabaseError, DatabaseHandle};
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::observability::metrics;

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("database connection failed: {cause}")]
    Connection {
        #[source]
        cause: DatabaseError,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Shutdown was requested before the listener was bound. Not a failure:
    /// callers exit successfully.
    #[error("shutdown requested before startup completed")]
    Interrupted,
}

impl StartupError {
    pub fn is_interrupted(&self) -> bool {
        matches!(self, StartupError::Interrupted)
    }
}

/// Sequences startup and hands back a running service.
pub struct Coordinator<C> {
    config: AppConfig,
    client: C,
    shutdown: Shutdown,
}

impl<C: DatabaseClient> Coordinator<C> {
    pub fn new(config: AppConfig, client: C) -> Self {
        Self {
            config,
            client,
            shutdown: Shutdown::new(),
        }
    }

    /// Use an existing shutdown coordinator, e.g. one already wired to signals.
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn shutdown(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Run the startup sequence.
    ///
    /// Under the abort policy a failed connection attempt returns
    /// `StartupError::Connection` and no listener is bound. A shutdown
    /// requested before the bind returns `StartupError::Interrupted`.
    pub async fn start(self) -> Result<RunningService, StartupError> {
        let database = DatabaseHandle::new();

        tokio::select! {
            biased;
            _ = self.shutdown.wait() => {
                tracing::info!("Shutdown requested while connecting to database, skipping startup");
                return Err(StartupError::Interrupted);
            }
            connected = self.connect_database(&database) => connected?,
        }

        if self.shutdown.is_triggered() {
            tracing::info!("Shutdown requested during startup, not binding listener");
            release_within(&database, self.config.lifecycle.shutdown_timeout()).await;
            return Err(StartupError::Interrupted);
        }

        let addr = self.config.bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| StartupError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| StartupError::Bind { addr, source })?;

        let server = HttpServer::new(&self.config, database.clone());
        let server_task = tokio::spawn(server.run(listener, self.shutdown.clone()));

        tracing::info!(
            address = %local_addr,
            environment = %self.config.environment,
            database_connected = database.is_installed(),
            "Server running"
        );

        Ok(RunningService {
            local_addr,
            database,
            shutdown: self.shutdown,
            server: server_task,
            shutdown_timeout: self.config.lifecycle.shutdown_timeout(),
        })
    }

    /// Make the single connection attempt and apply the failure policy.
    async fn connect_database(&self, database: &DatabaseHandle) -> Result<(), StartupError> {
        let policy = self.config.database.failure_policy;

        match self.attempt_connect().await {
            Ok(connection) => {
                database.install(connection);
                tracing::info!("Database connected");
                Ok(())
            }
            Err(cause) => match policy {
                ConnectFailurePolicy::Abort => {
                    tracing::error!(error = %cause, %policy, "Database connection failed, aborting startup");
                    Err(StartupError::Connection { cause })
                }
                ConnectFailurePolicy::Degraded => {
                    metrics::record_database_status(false);
                    tracing::warn!(error = %cause, %policy, "Database connection failed, continuing in degraded mode");
                    Ok(())
                }
            },
        }
    }

    async fn attempt_connect(&self) -> Result<Box<dyn Connection>, DatabaseError> {
        let uri = self
            .config
            .database
            .uri
            .as_deref()
            .ok_or(DatabaseError::MissingUri)?;
        let timeout = self.config.database.connect_timeout();

        tracing::info!(uri = %redact_uri(uri), timeout = ?timeout, "Connecting to database");

        match tokio::time::timeout(timeout, self.client.connect(uri)).await {
            Ok(result) => result,
            Err(_) => Err(DatabaseError::Timeout(timeout)),
        }
    }
}

/// What happened during shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    /// The server task finished on its own within the shutdown timeout.
    pub server_stopped: bool,
    /// A database connection was present and closed within the shutdown
    /// timeout.
    pub database_released: bool,
}

/// A started service: listener bound, server task running.
pub struct RunningService {
    local_addr: SocketAddr,
    database: DatabaseHandle,
    shutdown: Shutdown,
    server: JoinHandle<std::io::Result<()>>,
    shutdown_timeout: Duration,
}

impl RunningService {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn database(&self) -> &DatabaseHandle {
        &self.database
    }

    pub fn shutdown(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Wait for shutdown, stop the server, then release the database.
    ///
    /// The server gets `shutdown_timeout` to stop; after that its task is
    /// aborted and in-flight requests are abandoned. Closing the database
    /// gets another `shutdown_timeout`.
    pub async fn wait(self) -> ShutdownReport {
        let mut server = self.server;

        let exited_early = tokio::select! {
            _ = self.shutdown.wait() => None,
            joined = &mut server => Some(joined),
        };

        let server_stopped = match exited_early {
            Some(joined) => {
                tracing::warn!("HTTP server exited before shutdown was requested");
                self.shutdown.trigger();
                server_exit_ok(joined)
            }
            None => match tokio::time::timeout(self.shutdown_timeout, &mut server).await {
                Ok(joined) => server_exit_ok(joined),
                Err(_) => {
                    tracing::warn!(
                        timeout = ?self.shutdown_timeout,
                        "HTTP server did not stop in time, abandoning in-flight requests"
                    );
                    server.abort();
                    false
                }
            },
        };

        let database_released = release_within(&self.database, self.shutdown_timeout).await;

        tracing::info!(server_stopped, database_released, "Shutdown complete");

        ShutdownReport {
            server_stopped,
            database_released,
        }
    }
}

/// Release the database, giving up after `timeout`. The connection is out
/// of the handle either way, so a later release is still a no-op.
async fn release_within(database: &DatabaseHandle, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, database.release()).await {
        Ok(released) => released,
        Err(_) => {
            tracing::warn!(timeout = ?timeout, "Database did not close in time, abandoning it");
            false
        }
    }
}

fn server_exit_ok(joined: Result<std::io::Result<()>, JoinError>) -> bool {
    match joined {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::error!(error = %e, "HTTP server failed");
            false
        }
        Err(e) => {
            tracing::error!(error = %e, "HTTP server task panicked or was cancelled");
            false
        }
    }
}

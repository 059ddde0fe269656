//! Database client abstraction.
//!
//! The coordinator only needs two things from a database driver: a single
//! connection attempt and a way to close what it opened. Handlers
//! additionally ping the server and list collections.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by database clients and connections.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("no database URI configured (set MONGO_URI or MONGODB_URI)")]
    MissingUri,

    #[error("invalid connection string: {0}")]
    InvalidUri(String),

    #[error("connection attempt timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("query failed: {0}")]
    Query(String),
}

/// Opens connections.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Make one connection attempt. Implementations must not retry.
    async fn connect(&self, uri: &str) -> Result<Box<dyn Connection>, DatabaseError>;
}

/// A live database session.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Round-trip to the server. Fails once the server is unreachable or
    /// the session has been closed.
    async fn ping(&self) -> Result<(), DatabaseError>;

    /// Names of the collections in the connected database.
    async fn list_collections(&self) -> Result<Vec<String>, DatabaseError>;

    /// Close the session. Calling this more than once is a no-op.
    async fn close(&self);
}

//! Database subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     lifecycle → DatabaseClient::connect(uri) → DatabaseHandle::install
//!
//! Requests:
//!     handlers → DatabaseHandle::status / connection (lock-free read)
//!
//! Shutdown:
//!     lifecycle → DatabaseHandle::release (swap out, close once)
//! ```

pub mod client;
pub mod handle;
pub mod mongo;

pub use client::{Connection, DatabaseClient, DatabaseError};
pub use handle::{DatabaseHandle, DatabaseStatus};
pub use mongo::{redact_uri, MongoClient};

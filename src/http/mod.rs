//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID assigned or propagated)
//!     → cors.rs (origin policy per environment)
//!     → routes.rs (handlers reading the injected database handle)
//!     → Send to client
//! ```

pub mod cors;
pub mod request;
pub mod routes;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};

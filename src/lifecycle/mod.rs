//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Connect database (once, bounded) → Bind listener → Ready log
//!     (a shutdown before the bind cancels the rest and exits 0)
//!
//! Shutdown (shutdown.rs):
//!     Trigger → Stop accepting → Bounded wait for server → Release database → Exit 0
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown (identical handling)
//!     Second signal → Exit 0 immediately
//! ```
//!
//! # Design Decisions
//! - Ordered startup: the listener starts last, after the connection attempt resolves
//! - Connection failure policy is fixed per run (abort or degraded)
//! - Shutdown has a timeout: the server task is aborted after the deadline,
//!   and closing the database is bounded by the same timeout
//! - Releasing the database is idempotent

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::{SignalAction, TerminationSignal};
pub use startup::{Coordinator, RunningService, ShutdownReport, StartupError};

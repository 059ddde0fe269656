//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → loader.rs (optional TOML file, validated by validation.rs)
//!     → loader.rs (.env outside production, then environment overrides)
//!     → AppConfig (immutable for the process lifetime)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so an empty environment is a valid config
//! - Environment values never fail: bad values keep the default
//! - File values are validated; errors are collected, not short-circuited

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, load_config, ConfigError};
pub use schema::{
    AppConfig, ConnectFailurePolicy, DatabaseConfig, Environment, HttpConfig, LifecycleConfig,
    ListenerConfig, LogFormat, ObservabilityConfig,
};

//! BookStore API
//!
//! A minimal HTTP API skeleton built with Tokio and Axum. It connects to
//! MongoDB, serves a handful of placeholder routes and sequences startup and
//! shutdown so the listener never takes traffic before the database
//! connection attempt has resolved.
//!
//! # Architecture Overview
//!
//! ```text
//!   config ──▶ lifecycle::Coordinator ──▶ database::DatabaseClient::connect
//!                     │                          │
//!                     │                          ▼
//!                     │                  database::DatabaseHandle ◀── handlers
//!                     ▼                                                 ▲
//!              bind listener ──▶ http::HttpServer ──▶ routes ───────────┘
//!                     ▲
//!   SIGINT/SIGTERM ───┘ lifecycle::Shutdown → stop server → release database
//! ```

pub mod config;
pub mod database;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use database::{DatabaseHandle, MongoClient};
pub use http::HttpServer;
pub use lifecycle::{Coordinator, Shutdown};

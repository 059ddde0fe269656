//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bookstore_api::config::{AppConfig, ConnectFailurePolicy};
use bookstore_api::database::{Connection, DatabaseClient, DatabaseError};
use serde_json::Value;
use tokio::sync::Notify;

#[derive(Clone, Copy, Default)]
enum Outcome {
    #[default]
    Connect,
    Refuse,
    Hang,
}

/// A database client whose connection attempts are scripted.
#[derive(Clone, Default)]
pub struct FakeDatabase {
    outcome: Outcome,
    gate: Option<Arc<Notify>>,
    fail_queries: bool,
    hang_on_close: bool,
    unreachable: Arc<AtomicBool>,
    pub attempts: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
}

impl FakeDatabase {
    pub fn healthy() -> Self {
        Self::default()
    }

    pub fn refusing() -> Self {
        Self {
            outcome: Outcome::Refuse,
            ..Self::default()
        }
    }

    pub fn hanging() -> Self {
        Self {
            outcome: Outcome::Hang,
            ..Self::default()
        }
    }

    /// Connects only after `gate` is notified.
    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn with_failing_queries(mut self) -> Self {
        self.fail_queries = true;
        self
    }

    /// Connections never finish closing.
    pub fn with_hanging_close(mut self) -> Self {
        self.hang_on_close = true;
        self
    }

    /// Simulate the server going away (or coming back) after connect.
    pub fn set_reachable(&self, reachable: bool) {
        self.unreachable.store(!reachable, Ordering::SeqCst);
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatabaseClient for FakeDatabase {
    async fn connect(&self, _uri: &str) -> Result<Box<dyn Connection>, DatabaseError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        match self.outcome {
            Outcome::Connect => Ok(Box::new(FakeConnection {
                open: AtomicBool::new(true),
                fail_queries: self.fail_queries,
                hang_on_close: self.hang_on_close,
                unreachable: self.unreachable.clone(),
                closes: self.closes.clone(),
            })),
            Outcome::Refuse => Err(DatabaseError::Connect("connection refused".to_string())),
            Outcome::Hang => std::future::pending().await,
        }
    }
}

pub struct FakeConnection {
    open: AtomicBool,
    fail_queries: bool,
    hang_on_close: bool,
    unreachable: Arc<AtomicBool>,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl Connection for FakeConnection {
    async fn ping(&self) -> Result<(), DatabaseError> {
        if !self.open.load(Ordering::SeqCst) {
            return Err(DatabaseError::Query("connection closed".to_string()));
        }
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(DatabaseError::Query("server selection timeout".to_string()));
        }
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>, DatabaseError> {
        if self.fail_queries {
            return Err(DatabaseError::Query("not primary".to_string()));
        }
        Ok(vec!["authors".to_string(), "books".to_string()])
    }

    async fn close(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
        if self.hang_on_close {
            std::future::pending::<()>().await;
        }
    }
}

/// Loopback config on an ephemeral port with a short shutdown bound.
pub fn test_config(policy: ConnectFailurePolicy) -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.host = "127.0.0.1".to_string();
    config.listener.port = 0;
    config.database.uri = Some("mongodb://fake.invalid:27017/bookstore".to_string());
    config.database.failure_policy = policy;
    config.database.connect_timeout_secs = 5;
    config.lifecycle.shutdown_timeout_secs = 2;
    config
}

/// Reserve a free loopback port. The port is released before returning.
pub fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

pub async fn get_json(addr: SocketAddr, path: &str) -> (u16, Value) {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let res = client
        .get(format!("http://{}{}", addr, path))
        .send()
        .await
        .expect("server unreachable");
    let status = res.status().as_u16();
    (status, res.json().await.expect("json body"))
}

//! MongoDB implementation of the database client.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};

use crate::database::client::{Connection, DatabaseClient, DatabaseError};

const APP_NAME: &str = "bookstore-api";

/// Opens MongoDB sessions.
#[derive(Debug, Clone)]
pub struct MongoClient {
    /// Database used when the connection string names none.
    default_database: String,
    /// Driver-level server selection and socket connect timeout.
    connect_timeout: Duration,
}

impl MongoClient {
    pub fn new(default_database: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            default_database: default_database.into(),
            connect_timeout,
        }
    }
}

#[async_trait]
impl DatabaseClient for MongoClient {
    async fn connect(&self, uri: &str) -> Result<Box<dyn Connection>, DatabaseError> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| DatabaseError::InvalidUri(e.to_string()))?;
        options.app_name = Some(APP_NAME.to_string());
        options.connect_timeout = Some(self.connect_timeout);
        options.server_selection_timeout = Some(self.connect_timeout);

        let client =
            Client::with_options(options).map_err(|e| DatabaseError::Connect(e.to_string()))?;
        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(&self.default_database));

        // The driver connects lazily; a ping forces server selection.
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| DatabaseError::Connect(e.to_string()))?;

        tracing::debug!(database = %database.name(), "MongoDB ping succeeded");

        Ok(Box::new(MongoConnection {
            client,
            database,
            open: AtomicBool::new(true),
        }))
    }
}

/// A connected MongoDB client bound to one database.
pub struct MongoConnection {
    client: Client,
    database: Database,
    open: AtomicBool,
}

#[async_trait]
impl Connection for MongoConnection {
    async fn ping(&self) -> Result<(), DatabaseError> {
        if !self.open.load(Ordering::SeqCst) {
            return Err(DatabaseError::Query("connection closed".to_string()));
        }

        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(|e| DatabaseError::Query(e.to_string()))
    }

    async fn list_collections(&self) -> Result<Vec<String>, DatabaseError> {
        self.database
            .list_collection_names()
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))
    }

    async fn close(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            self.client.clone().shutdown().await;
        }
    }
}

/// Strip credentials from a connection string for logging.
pub fn redact_uri(uri: &str) -> String {
    match url::Url::parse(uri) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("****"));
            }
            parsed.to_string()
        }
        Err(_) => "<unparseable>".to_string(),
    }
}

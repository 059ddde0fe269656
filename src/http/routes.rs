//! Route handlers.
//!
//! Handlers read the injected database handle and never fail: database
//! problems show up as degraded payloads, not 5xx responses.

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::Environment;
use crate::database::DatabaseStatus;
use crate::http::server::AppState;

/// Current time in RFC 3339 with milliseconds and a `Z` suffix.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub environment: Environment,
    pub timestamp: String,
}

pub async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: "BookStore API is running!",
        environment: state.environment,
        timestamp: timestamp(),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: DatabaseStatus,
    pub timestamp: String,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        database: state.database.status().await,
        timestamp: timestamp(),
    })
}

const BOOKS_MESSAGE: &str = "Books endpoint";

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BooksResponse {
    Collections {
        message: &'static str,
        collections: Vec<String>,
    },
    Unavailable {
        message: &'static str,
        error: &'static str,
        tip: &'static str,
    },
}

/// Lists the collections of the connected database.
pub async fn books(State(state): State<AppState>) -> Json<BooksResponse> {
    let Some(connection) = state.database.connection() else {
        return Json(BooksResponse::Collections {
            message: BOOKS_MESSAGE,
            collections: vec!["Database not connected".to_string()],
        });
    };

    match connection.list_collections().await {
        Ok(collections) => Json(BooksResponse::Collections {
            message: BOOKS_MESSAGE,
            collections,
        }),
        Err(e) => {
            tracing::warn!(error = %e, "Listing collections failed");
            Json(BooksResponse::Unavailable {
                message: BOOKS_MESSAGE,
                error: "Database not available",
                tip: "Start MongoDB service to enable database features",
            })
        }
    }
}

/// Placeholder catalogue. Static, independent of the database.
pub fn sample_books() -> Value {
    json!([
        {
            "id": 1,
            "title": "The Pragmatic Programmer",
            "author": "Andrew Hunt, David Thomas",
            "publishYear": 1999
        },
        {
            "id": 2,
            "title": "Designing Data-Intensive Applications",
            "author": "Martin Kleppmann",
            "publishYear": 2017
        },
        {
            "id": 3,
            "title": "The Rust Programming Language",
            "author": "Steve Klabnik, Carol Nichols",
            "publishYear": 2018
        }
    ])
}

pub async fn api_books(State(state): State<AppState>) -> Json<Value> {
    let database = state.database.status().await;
    Json(json!({
        "message": "Sample books",
        "database": database,
        "books": sample_books(),
    }))
}

pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Not found", "path": uri.path() })),
    )
}

//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request ID, tracing, CORS, body limit, timeout, metrics)
//! - Serve on a bound listener until shutdown is triggered

use std::time::{Duration, Instant};

use axum::{
    extract::{DefaultBodyLimit, MatchedPath, Request},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{AppConfig, Environment};
use crate::database::DatabaseHandle;
use crate::http::cors::cors_layer;
use crate::http::request::{request_id, UuidRequestId, X_REQUEST_ID};
use crate::http::routes;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub database: DatabaseHandle,
    pub environment: Environment,
}

/// HTTP server for the bookstore API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server serving the given database handle.
    pub fn new(config: &AppConfig, database: DatabaseHandle) -> Self {
        let state = AppState {
            database,
            environment: config.environment,
        };

        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(routes::root))
            .route("/health", get(routes::health))
            .route("/books", get(routes::books))
            .route("/api/books", get(routes::api_books))
            .fallback(routes::not_found)
            .layer(middleware::from_fn(track_metrics))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.http.max_body_bytes))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
                    .layer(TraceLayer::new_for_http().make_span_with(make_span))
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                    .layer(cors_layer(config.environment, &config.http.cors_origins))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.http.request_timeout_secs,
                    ))),
            )
    }

    /// The router, for serving through something other than `run`.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on the given listener until `shutdown` is triggered.
    ///
    /// New connections stop being accepted as soon as shutdown begins.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::debug!(address = %addr, "HTTP server accepting connections");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.wait().await;
                tracing::info!("HTTP server no longer accepting connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn make_span(request: &Request) -> tracing::Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id(request),
    )
}

/// Requests that matched no route (the JSON 404) are labelled `unmatched`.
async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());
    let method = request.method().to_string();

    let response = next.run(request).await;

    metrics::record_request(&method, &route, response.status().as_u16(), start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, StatusCode};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use tower::ServiceExt;

    fn router(environment: Environment) -> Router {
        let mut config = AppConfig::default();
        config.environment = environment;
        HttpServer::new(&config, DatabaseHandle::new()).router()
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn root_reports_environment() {
        let (status, body) = get_json(router(Environment::Production), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "BookStore API is running!");
        assert_eq!(body["environment"], "production");
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn health_without_database_is_ok_and_disconnected() {
        let (status, body) = get_json(router(Environment::Development), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
        assert_eq!(body["database"], "Disconnected");
    }

    #[tokio::test]
    async fn books_without_database_degrades() {
        let (status, body) = get_json(router(Environment::Development), "/books").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Books endpoint");
        assert_eq!(body["collections"][0], "Database not connected");
    }

    #[tokio::test]
    async fn api_books_serves_samples() {
        let (status, body) = get_json(router(Environment::Development), "/api/books").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["books"].as_array().unwrap().len(), 3);
        assert_eq!(body["database"], "Disconnected");
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let (status, body) = get_json(router(Environment::Development), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["path"], "/nope");
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let response = router(Environment::Development)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("x-request-id", "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()["x-request-id"], "req-42");

        let response = router(Environment::Development)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn cors_allows_only_configured_origin() {
        let preflight = |origin: &'static str| {
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/books")
                .header(header::ORIGIN, origin)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap()
        };

        let response = router(Environment::Development)
            .oneshot(preflight("http://localhost:3000"))
            .await
            .unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
            "true"
        );

        let response = router(Environment::Production)
            .oneshot(preflight("http://localhost:3000"))
            .await
            .unwrap();
        assert!(!response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[test]
    fn request_metrics_are_labelled_by_route() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        ::metrics::with_local_recorder(&recorder, || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async {
                let (status, _) = get_json(router(Environment::Development), "/health").await;
                assert_eq!(status, StatusCode::OK);
                let (status, _) = get_json(router(Environment::Development), "/nope").await;
                assert_eq!(status, StatusCode::NOT_FOUND);
            });
        });

        let rendered = handle.render();
        let health = rendered
            .lines()
            .find(|line| {
                line.starts_with("bookstore_http_requests_total{")
                    && line.contains(r#"route="/health""#)
            })
            .unwrap_or_else(|| panic!("no /health request sample in:\n{rendered}"));
        assert!(health.contains(r#"method="GET""#));
        assert!(health.contains(r#"status="200""#));

        assert!(rendered.lines().any(|line| {
            line.starts_with("bookstore_http_requests_total{")
                && line.contains(r#"route="unmatched""#)
                && line.contains(r#"status="404""#)
        }));
        assert!(!rendered.contains(r#"route="/nope""#));
    }
}

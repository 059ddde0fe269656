//! Cross-origin policy.
//!
//! Credentials are allowed, so origins are always an explicit list.

use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

use crate::config::validation::is_valid_origin;
use crate::config::Environment;

const PRODUCTION_ORIGINS: &[&str] = &["https://your-frontend-domain.netlify.app"];
const DEVELOPMENT_ORIGINS: &[&str] = &["http://localhost:3000"];

pub fn default_origins(environment: Environment) -> &'static [&'static str] {
    match environment {
        Environment::Production => PRODUCTION_ORIGINS,
        Environment::Development => DEVELOPMENT_ORIGINS,
    }
}

/// Origins to allow: the configured list, or the environment default when
/// none are configured. Invalid entries are skipped.
pub fn allowed_origins(environment: Environment, configured: &[String]) -> Vec<HeaderValue> {
    let origins: Vec<&str> = if configured.is_empty() {
        default_origins(environment).to_vec()
    } else {
        configured.iter().map(String::as_str).collect()
    };

    origins
        .into_iter()
        .filter_map(|origin| {
            if !is_valid_origin(origin) {
                tracing::warn!(origin, "Ignoring invalid CORS origin");
                return None;
            }
            HeaderValue::from_str(origin).ok()
        })
        .collect()
}

pub fn cors_layer(environment: Environment, configured: &[String]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins(environment, configured)))
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

//! Configuration validation.
//!
//! Applies to configuration read from a file. Environment values are never
//! rejected; unparseable ones fall back to defaults in the loader.
//!
//! Returns every error found, not just the first.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;

use crate::config::schema::AppConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("database.uri must not be empty")]
    EmptyDatabaseUri,

    #[error("http.cors_origins entry {0:?} is not a valid origin")]
    InvalidOrigin(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let durations = [
        ("database.connect_timeout_secs", config.database.connect_timeout_secs),
        ("http.request_timeout_secs", config.http.request_timeout_secs),
        ("lifecycle.shutdown_timeout_secs", config.lifecycle.shutdown_timeout_secs),
    ];
    for (field, value) in durations {
        if value == 0 {
            errors.push(ValidationError::ZeroDuration { field });
        }
    }

    if matches!(&config.database.uri, Some(uri) if uri.trim().is_empty()) {
        errors.push(ValidationError::EmptyDatabaseUri);
    }

    for origin in &config.http.cors_origins {
        if !is_valid_origin(origin) {
            errors.push(ValidationError::InvalidOrigin(origin.clone()));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// An origin is a scheme and host with no path, usable as a header value.
pub fn is_valid_origin(origin: &str) -> bool {
    let Ok(parsed) = url::Url::parse(origin) else {
        return false;
    };
    matches!(parsed.scheme(), "http" | "https")
        && parsed.host_str().is_some()
        && parsed.path() == "/"
        && !origin.ends_with('/')
        && HeaderValue::from_str(origin).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = AppConfig::default();
        config.database.connect_timeout_secs = 0;
        config.lifecycle.shutdown_timeout_secs = 0;
        config.database.uri = Some("  ".to_string());
        config.http.cors_origins = vec!["localhost:3000".to_string()];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::EmptyDatabaseUri));
        assert!(errors.contains(&ValidationError::InvalidOrigin("localhost:3000".to_string())));
    }

    #[test]
    fn metrics_address_checked_only_when_enabled() {
        let mut config = AppConfig::default();
        config.observability.metrics_address = "not-an-address".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn origin_rules() {
        assert!(is_valid_origin("http://localhost:3000"));
        assert!(is_valid_origin("https://your-frontend-domain.netlify.app"));
        assert!(!is_valid_origin("https://example.com/app"));
        assert!(!is_valid_origin("https://example.com/"));
        assert!(!is_valid_origin("ftp://example.com"));
        assert!(!is_valid_origin("*"));
    }
}

//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::{AppConfig, ConnectFailurePolicy, Environment, LogFormat};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build the process configuration.
///
/// Starts from defaults or the given file, loads `.env` outside production,
/// then applies environment overrides.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    load_dotenv();

    let mut config = match path {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    config.apply_env(|key| std::env::var(key).ok());

    Ok(config)
}

/// Load `.env` from the working directory unless the process is already
/// marked as production.
fn load_dotenv() {
    let node_env = std::env::var("NODE_ENV").ok();
    if let Ok(dir) = std::env::current_dir() {
        load_dotenv_in(&dir, node_env.as_deref());
    }
}

/// Load `dir/.env` unless `node_env` names production. Variables already
/// present in the environment are not overwritten.
///
/// Returns whether a file was loaded.
fn load_dotenv_in(dir: &Path, node_env: Option<&str>) -> bool {
    let production = node_env
        .map(|value| Environment::from_name(value).is_production())
        .unwrap_or(false);

    !production && dotenvy::from_path(dir.join(".env")).is_ok()
}

impl AppConfig {
    /// Overlay values from an environment lookup.
    ///
    /// Absent or unparseable values keep the current setting.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(host) = var("HOST") {
            self.listener.host = host;
        }
        if let Some(port) = parsed(var("PORT")) {
            self.listener.port = port;
        }
        if let Some(env) = var("NODE_ENV") {
            self.environment = Environment::from_name(&env);
        }

        if let Some(uri) = var("MONGO_URI").or_else(|| var("MONGODB_URI")) {
            self.database.uri = Some(uri);
        }
        if let Some(name) = var("DATABASE_NAME") {
            self.database.name = name;
        }
        if let Some(secs) = positive(var("DB_CONNECT_TIMEOUT_SECS")) {
            self.database.connect_timeout_secs = secs;
        }
        if let Some(policy) = var("DB_FAILURE_POLICY")
            .as_deref()
            .and_then(ConnectFailurePolicy::from_name)
        {
            self.database.failure_policy = policy;
        }

        if let Some(secs) = positive(var("REQUEST_TIMEOUT_SECS")) {
            self.http.request_timeout_secs = secs;
        }
        if let Some(bytes) = parsed::<usize>(var("MAX_BODY_BYTES")).filter(|b| *b > 0) {
            self.http.max_body_bytes = bytes;
        }
        if let Some(origins) = var("CORS_ORIGINS") {
            self.http.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(secs) = positive(var("SHUTDOWN_TIMEOUT_SECS")) {
            self.lifecycle.shutdown_timeout_secs = secs;
        }

        if let Some(level) = var("LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(format) = var("LOG_FORMAT").as_deref().and_then(LogFormat::from_name) {
            self.observability.log_format = Some(format);
        }
        if let Some(enabled) = var("METRICS_ENABLED").as_deref().and_then(parse_bool) {
            self.observability.metrics_enabled = enabled;
        }
        if let Some(address) = var("METRICS_ADDRESS") {
            self.observability.metrics_address = address;
        }
    }
}

fn parsed<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}

fn positive(value: Option<String>) -> Option<u64> {
    parsed::<u64>(value).filter(|v| *v > 0)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

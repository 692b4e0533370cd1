//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

const DEFAULT_TRANSLATION_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_TRANSLATION_MODEL: &str = "llama-3.3-70b-versatile";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// When absent, library state lives in an in-process store.
    pub database_url: Option<String>,
    pub log_level: Level,
    pub storage_prefix: String,
    pub storage_quota_bytes: usize,
    pub translation_api_url: String,
    pub translation_model: String,
    pub translation_target_language: String,
    pub rate_limit_retry_delay: Duration,
    pub cors_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Storage Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let storage_prefix =
            std::env::var("STORAGE_PREFIX").unwrap_or_else(|_| "language_reader".to_string());
        let storage_quota_bytes = parse_var("STORAGE_QUOTA_BYTES", 5 * 1024 * 1024)?;

        // --- Load Translation Provider Settings ---
        let translation_api_url = std::env::var("TRANSLATION_API_URL")
            .unwrap_or_else(|_| DEFAULT_TRANSLATION_API_URL.to_string());
        let translation_model = std::env::var("TRANSLATION_MODEL")
            .unwrap_or_else(|_| DEFAULT_TRANSLATION_MODEL.to_string());
        let translation_target_language = std::env::var("TRANSLATION_TARGET_LANGUAGE")
            .unwrap_or_else(|_| "Russian".to_string());
        let rate_limit_retry_delay =
            Duration::from_millis(parse_var("RATE_LIMIT_RETRY_DELAY_MS", 2000)?);

        let cors_origin =
            std::env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            storage_prefix,
            storage_quota_bytes,
            translation_api_url,
            translation_model,
            translation_target_language,
            rate_limit_retry_delay,
            cors_origin,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

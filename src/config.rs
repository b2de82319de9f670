// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Loaded once at startup and passed explicitly into the session manager
//! and router. Nothing reads the environment after `main` has wired things up.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Origin allowed to call the API from a browser
    pub cors_allowed_origin: String,

    // --- Token signing ---
    /// HMAC key for access tokens (raw bytes)
    pub access_signing_key: Vec<u8>,
    /// HMAC key for refresh tokens (raw bytes)
    pub refresh_signing_key: Vec<u8>,
    /// Access token lifetime
    pub access_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_ttl: Duration,

    // --- Session store ---
    pub redis_url: String,
    /// Prefix prepended to the user id to form the store key
    pub session_key_prefix: String,
    /// Optional expiry on session records. `None` keeps records until
    /// sign-out or overwrite.
    pub session_ttl: Option<Duration>,
    /// Upper bound on a single store or repository round trip
    pub store_timeout: Duration,
    /// Pause before the one retry of a failed store call
    pub store_retry_backoff: Duration,

    /// Request-level timeout applied by the HTTP layer
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let access_ttl_minutes: u64 = parse_or("JWT_SECRET_KEY_EXPIRE_MINUTES_COUNT", 15)?;
        let refresh_ttl_hours: u64 = parse_or("JWT_REFRESH_KEY_EXPIRE_HOURS_COUNT", 720)?;

        let session_ttl = match env::var("SESSION_TTL_SECS") {
            Ok(raw) if !raw.trim().is_empty() => Some(Duration::from_secs(
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid("SESSION_TTL_SECS"))?,
            )),
            _ => None,
        };

        Ok(Self {
            port: parse_or("PORT", 8080)?,
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),

            access_signing_key: required_secret("JWT_SECRET_KEY")?,
            refresh_signing_key: required_secret("JWT_REFRESH_KEY")?,
            access_ttl: scaled_secs(
                access_ttl_minutes,
                60,
                "JWT_SECRET_KEY_EXPIRE_MINUTES_COUNT",
            )?,
            refresh_ttl: scaled_secs(
                refresh_ttl_hours,
                60 * 60,
                "JWT_REFRESH_KEY_EXPIRE_HOURS_COUNT",
            )?,

            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379/0".to_string()),
            session_key_prefix: env::var("SESSION_KEY_PREFIX").unwrap_or_default(),
            session_ttl,
            store_timeout: Duration::from_millis(parse_or("STORE_TIMEOUT_MS", 2000)?),
            store_retry_backoff: Duration::from_millis(parse_or("STORE_RETRY_BACKOFF_MS", 100)?),

            request_timeout: Duration::from_secs(parse_or("REQUEST_TIMEOUT_SECS", 10)?),
        })
    }

    /// Config for tests: fixed keys, short timeouts, no retry backoff.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            cors_allowed_origin: "http://localhost:5173".to_string(),
            access_signing_key: b"test_access_key_32_bytes_minimum!".to_vec(),
            refresh_signing_key: b"test_refresh_key_32_bytes_minimum".to_vec(),
            access_ttl: Duration::from_secs(15 * 60),
            refresh_ttl: Duration::from_secs(30 * 24 * 60 * 60),
            redis_url: "redis://127.0.0.1:6379/0".to_string(),
            session_key_prefix: String::new(),
            session_ttl: None,
            store_timeout: Duration::from_millis(500),
            store_retry_backoff: Duration::ZERO,
            request_timeout: Duration::from_secs(10),
        }
    }
}

fn required_secret(name: &'static str) -> Result<Vec<u8>, ConfigError> {
    let value = env::var(name).map_err(|_| ConfigError::Missing(name))?;
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::Invalid(name));
    }
    Ok(value.as_bytes().to_vec())
}

/// `count` units of `unit_secs` seconds each, rejecting overflow.
fn scaled_secs(count: u64, unit_secs: u64, name: &'static str) -> Result<Duration, ConfigError> {
    count
        .checked_mul(unit_secs)
        .map(Duration::from_secs)
        .ok_or(ConfigError::Invalid(name))
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

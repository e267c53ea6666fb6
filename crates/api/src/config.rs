//! Process configuration, read once at startup and passed explicitly.

use std::time::Duration;

use thiserror::Error;

use fintrack_auth::{SigningSecret, TokenError, TokenIssuer, DEFAULT_TOKEN_TTL_HOURS, MAX_TOKEN_TTL_HOURS};
use fintrack_observability::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 2_000;
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error(transparent)]
    Token(#[from] TokenError),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub jwt_secret: SigningSecret,
    pub token_ttl: chrono::Duration,
    pub store_timeout: Duration,
    pub log_format: LogFormat,
    /// Only consulted when built with the `postgres` feature.
    pub database_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) => SigningSecret::new(secret)?,
            None => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                SigningSecret::new(DEV_JWT_SECRET)?
            }
        };

        let token_ttl_hours = parse_or("TOKEN_TTL_HOURS", lookup("TOKEN_TTL_HOURS"), DEFAULT_TOKEN_TTL_HOURS)?;
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&token_ttl_hours) {
            return Err(invalid(
                "TOKEN_TTL_HOURS",
                format!("must be between 1 and {MAX_TOKEN_TTL_HOURS}"),
            ));
        }
        let token_ttl = chrono::Duration::try_hours(token_ttl_hours)
            .ok_or_else(|| invalid("TOKEN_TTL_HOURS", "out of range"))?;

        let store_timeout_ms = parse_or("STORE_TIMEOUT_MS", lookup("STORE_TIMEOUT_MS"), DEFAULT_STORE_TIMEOUT_MS)?;
        if store_timeout_ms == 0 {
            return Err(invalid("STORE_TIMEOUT_MS", "must be positive"));
        }

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.parse().map_err(|e: fintrack_observability::UnknownLogFormat| {
                invalid("LOG_FORMAT", e.to_string())
            })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            jwt_secret,
            token_ttl,
            store_timeout: Duration::from_millis(store_timeout_ms),
            log_format,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
        })
    }

    /// Token issuer bound to the configured secret and ttl.
    pub fn token_issuer(&self) -> Result<TokenIssuer, ConfigError> {
        Ok(TokenIssuer::with_ttl(&self.jwt_secret, self.token_ttl)?)
    }
}

fn invalid(var: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        var,
        reason: reason.into(),
    }
}

fn parse_or<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| invalid(var, e.to_string())),
        None => Ok(default),
    }
}

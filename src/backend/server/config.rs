/**
 * Server Configuration
 *
 * Loaded from environment variables (a `.env` file is honoured by the binary
 * through `dotenv`). Every value has a development default except
 * `DATABASE_URL`; without it the server runs on the in-memory store.
 *
 * | variable | default |
 * |---|---|
 * | `SERVER_PORT` | 5000 |
 * | `DATABASE_URL` | unset (in-memory store) |
 * | `JWT_SECRET` | development fallback, logged as a warning |
 * | `JWT_EXPIRY_DAYS` | 30 |
 * | `CLIENT_URL` | `http://localhost:4200` |
 * | `OUTBOUND_BUFFER` | 256 |
 *
 * # Database
 *
 * `load_database` never fails the startup: a missing URL, an unreachable
 * server or a failed migration all degrade to `None` (or a warning) so the
 * server still comes up.
 */

use std::str::FromStr;

use sqlx::PgPool;
use thiserror::Error;

use crate::backend::realtime::DEFAULT_OUTBOUND_BUFFER;

const DEV_JWT_SECRET: &str = "hearth-development-secret-change-me";

/// Invalid configuration value
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}': {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_expiry_days: u64,
    pub client_url: String,
    pub outbound_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            database_url: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_expiry_days: 30,
            client_url: "http://localhost:4200".to_string(),
            outbound_buffer: DEFAULT_OUTBOUND_BUFFER,
        }
    }
}

fn parse_var<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            name,
            value,
            reason: e.to_string(),
        }),
    }
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let jwt_secret = match non_empty("JWT_SECRET") {
            Some(secret) => secret,
            None => {
                tracing::warn!("[Server] JWT_SECRET not set, using the development secret");
                defaults.jwt_secret
            }
        };

        let outbound_buffer = parse_var("OUTBOUND_BUFFER", non_empty("OUTBOUND_BUFFER"), defaults.outbound_buffer)?;
        if outbound_buffer == 0 {
            return Err(ConfigError::InvalidValue {
                name: "OUTBOUND_BUFFER",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            port: parse_var("SERVER_PORT", non_empty("SERVER_PORT"), defaults.port)?,
            database_url: non_empty("DATABASE_URL"),
            jwt_secret,
            jwt_expiry_days: parse_var("JWT_EXPIRY_DAYS", non_empty("JWT_EXPIRY_DAYS"), defaults.jwt_expiry_days)?,
            client_url: non_empty("CLIENT_URL").unwrap_or(defaults.client_url),
            outbound_buffer,
        })
    }
}

/// Builder for configs assembled in code (tests, embedding)
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = Some(url.into());
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.jwt_secret = secret.into();
        self
    }

    pub fn jwt_expiry_days(mut self, days: u64) -> Self {
        self.config.jwt_expiry_days = days;
        self
    }

    pub fn client_url(mut self, url: impl Into<String>) -> Self {
        self.config.client_url = url.into();
        self
    }

    pub fn outbound_buffer(mut self, capacity: usize) -> Self {
        self.config.outbound_buffer = capacity.max(1);
        self
    }

    pub fn build(self) -> ServerConfig {
        self.config
    }
}

/// Connect to PostgreSQL and run migrations.
///
/// Returns `None` when `database_url` is unset or the connection fails.
pub async fn load_database(database_url: Option<&str>) -> Option<PgPool> {
    let Some(database_url) = database_url else {
        tracing::warn!("[Server] DATABASE_URL not set, using the in-memory store");
        return None;
    };

    tracing::info!("[Server] Connecting to database...");
    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("[Server] Failed to create database connection pool: {:?}", e);
            tracing::warn!("[Server] Falling back to the in-memory store");
            return None;
        }
    };

    tracing::info!("[Server] Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(()) => tracing::info!("[Server] Database migrations completed"),
        Err(e) => {
            tracing::error!("[Server] Failed to run database migrations: {}", e);
            tracing::warn!("[Server] Continuing; the schema might not be up to date");
        }
    }

    Some(pool)
}

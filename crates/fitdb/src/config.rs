//! Database configuration.
//!
//! Read once at process start, from the environment or any other key lookup, and never
//! mutated afterwards.

use crate::error::{DbError, DbResult};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

pub const DEFAULT_POOL_MIN: usize = 1;
pub const DEFAULT_POOL_MAX: usize = 4;
pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_CONNECTION_TIMEOUT_MS: u64 = 2_000;

/// Supported database engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Engine {
    #[default]
    Postgres,
}

impl Engine {
    pub fn as_str(self) -> &'static str {
        match self {
            Engine::Postgres => "postgres",
        }
    }
}

impl FromStr for Engine {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Engine::Postgres),
            _ => Err(DbError::UnsupportedEngine(s.to_string())),
        }
    }
}

impl TryFrom<String> for Engine {
    type Error = DbError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pool sizing and timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Connections kept open while idle.
    pub min: usize,
    pub max: usize,
    /// How long an idle pooled connection is kept before being closed.
    pub idle_timeout_ms: u64,
    /// How long to wait for a free or new connection.
    pub connection_timeout_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min: DEFAULT_POOL_MIN,
            max: DEFAULT_POOL_MAX,
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
            connection_timeout_ms: DEFAULT_CONNECTION_TIMEOUT_MS,
        }
    }
}

impl PoolConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }

    pub fn validate(&self) -> DbResult<()> {
        if self.max == 0 {
            return Err(DbError::config("pool max must be greater than 0"));
        }
        if self.min > self.max {
            return Err(DbError::config(format!(
                "pool min ({}) cannot exceed pool max ({})",
                self.min, self.max
            )));
        }
        if self.connection_timeout_ms == 0 {
            return Err(DbError::config("pool connection timeout must be greater than 0"));
        }
        Ok(())
    }
}

/// Connection settings for one logical database.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default, alias = "type")]
    pub engine: Engine,
    pub host: String,
    pub port: u16,
    pub user: String,
    /// Sensitive: redacted from `Debug` output.
    pub password: String,
    pub database: String,
    #[serde(default)]
    pub pool: PoolConfig,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("engine", &self.engine)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("pool", &self.pool)
            .finish()
    }
}

impl DatabaseConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            engine: Engine::default(),
            host: host.into(),
            port,
            user: user.into(),
            password: password.into(),
            database: database.into(),
            pool: PoolConfig::default(),
        }
    }

    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    /// Read the configuration from process environment variables.
    ///
    /// Required: `PG_HOST`, `PG_PORT`, `PG_USER`, `PG_PASSWORD`, `PG_DATABASE`.
    /// Optional: `DB_ENGINE`, `PG_POOL_MIN`, `PG_POOL_MAX`, `PG_POOL_IDLE_TIMEOUT_MS`,
    /// `PG_POOL_CONNECT_TIMEOUT_MS`.
    pub fn from_env() -> DbResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) against an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DbResult<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| DbError::config(format!("missing required variable {key}")))
        };

        let engine = match lookup("DB_ENGINE") {
            Some(tag) if !tag.is_empty() => tag.parse()?,
            _ => Engine::default(),
        };

        let defaults = PoolConfig::default();
        let pool = PoolConfig {
            min: parse_optional(&lookup, "PG_POOL_MIN")?.unwrap_or(defaults.min),
            max: parse_optional(&lookup, "PG_POOL_MAX")?.unwrap_or(defaults.max),
            idle_timeout_ms: parse_optional(&lookup, "PG_POOL_IDLE_TIMEOUT_MS")?
                .unwrap_or(defaults.idle_timeout_ms),
            connection_timeout_ms: parse_optional(&lookup, "PG_POOL_CONNECT_TIMEOUT_MS")?
                .unwrap_or(defaults.connection_timeout_ms),
        };
        pool.validate()?;

        Ok(Self {
            engine,
            host: required("PG_HOST")?,
            port: parse_value("PG_PORT", &required("PG_PORT")?)?,
            user: required("PG_USER")?,
            password: required("PG_PASSWORD")?,
            database: required("PG_DATABASE")?,
            pool,
        })
    }

    /// `postgres://{user}:{password}@{host}:{port}/{database}`, percent-encoding
    /// credentials where needed.
    pub fn connection_string(&self) -> DbResult<String> {
        let invalid = |what: &str| DbError::config(format!("invalid {what} in database config"));

        let mut url = Url::parse("postgres://localhost")
            .map_err(|e| DbError::config(format!("invalid base url: {e}")))?;
        url.set_host(Some(&self.host)).map_err(|_| invalid("host"))?;
        url.set_port(Some(self.port)).map_err(|_| invalid("port"))?;
        url.set_username(&self.user).map_err(|_| invalid("user"))?;
        url.set_password(Some(&self.password))
            .map_err(|_| invalid("password"))?;
        url.set_path(&format!("/{}", self.database));
        Ok(url.into())
    }

    /// Driver configuration for this database.
    pub fn to_pg_config(&self) -> tokio_postgres::Config {
        let mut cfg = tokio_postgres::Config::new();
        cfg.host(&self.host)
            .port(self.port)
            .user(&self.user)
            .password(&self.password)
            .dbname(&self.database)
            .connect_timeout(self.pool.connection_timeout());
        cfg
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> DbResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| DbError::config(format!("{key} must be numeric, got {raw:?}")))
}

fn parse_optional<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> DbResult<Option<T>> {
    match lookup(key) {
        Some(raw) if !raw.is_empty() => parse_value(key, &raw).map(Some),
        _ => Ok(None),
    }
}

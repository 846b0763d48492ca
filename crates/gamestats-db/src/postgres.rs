//! `PostgreSQL` connection pool and configuration.
//!
//! Uses [`sqlx`] with runtime query construction (not compile-time checked)
//! to avoid requiring a live database at build time. All queries are
//! parameterized to prevent SQL injection.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use crate::error::DbError;
use crate::retry::RetryPolicy;

/// Default `PostgreSQL` port.
pub const DEFAULT_PORT: u16 = 5432;

/// Default maximum number of connections in the pool.
///
/// The generator writes from a single loop, so one connection does the work.
const DEFAULT_MAX_CONNECTIONS: u32 = 2;

/// Default connection timeout in seconds.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default idle timeout in seconds.
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;

/// Configuration for the `PostgreSQL` connection pool.
#[derive(Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    /// Server host name.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Database name.
    pub database: String,
    /// Login role.
    pub user: String,
    /// Login password.
    pub password: String,
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Idle connection timeout.
    pub idle_timeout: Duration,
}

impl PostgresConfig {
    /// Create a configuration for `database` on `host`, default port and
    /// empty credentials.
    pub fn new(host: &str, database: &str) -> Self {
        Self {
            host: host.to_owned(),
            port: DEFAULT_PORT,
            database: database.to_owned(),
            user: String::new(),
            password: String::new(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
        }
    }

    /// Set the server port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the login role and password.
    #[must_use]
    pub fn with_credentials(mut self, user: &str, password: &str) -> Self {
        user.clone_into(&mut self.user);
        password.clone_into(&mut self.password);
        self
    }

    /// Set the maximum number of connections.
    #[must_use]
    pub const fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the idle connection timeout.
    #[must_use]
    pub const fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Build the driver-level connect options.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
    }
}

impl core::fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("connect_timeout", &self.connect_timeout)
            .field("idle_timeout", &self.idle_timeout)
            .finish()
    }
}

/// Connection pool handle to `PostgreSQL`.
#[derive(Clone)]
pub struct PostgresPool {
    pool: PgPool,
}

impl PostgresPool {
    /// Connect to `PostgreSQL` using the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the connection fails.
    pub async fn connect(config: &PostgresConfig) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout)
            .connect_with(config.connect_options())
            .await?;

        tracing::info!(
            host = config.host,
            port = config.port,
            database = config.database,
            max_connections = config.max_connections,
            "Successfully connected to database"
        );

        Ok(Self { pool })
    }

    /// Connect, retrying per `policy` while the server is unreachable.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::RetriesExhausted`] wrapping the last failure once
    /// every attempt has failed.
    pub async fn connect_with_retry(
        config: &PostgresConfig,
        policy: &RetryPolicy,
    ) -> Result<Self, DbError> {
        policy
            .run("database connection", || Self::connect(config))
            .await
            .map_err(|exhausted| DbError::RetriesExhausted {
                attempts: exhausted.attempts,
                last: Box::new(exhausted.last_error),
            })
    }

    /// Wrap an existing [`PgPool`].
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Return a reference to the underlying [`PgPool`].
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close all connections in the pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("PostgreSQL pool closed");
    }
}

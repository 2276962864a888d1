//! Database connection pool management
//!
//! Taskboard keeps everything in one SQLite file. The pool is created once at
//! startup, shared through [`Store`](super::store::Store) clones and closed at
//! shutdown.
//!
//! The defaults hold exactly one connection that never expires. That keeps
//! every statement strictly sequential and lets `sqlite::memory:` databases
//! live as long as the pool does.
//!
//! # Example
//!
//! ```no_run
//! use taskboard_shared::db::pool::{close_pool, create_pool, DatabaseConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig {
//!         url: "sqlite://database/tasks.db".to_string(),
//!         ..Default::default()
//!     };
//!
//!     let pool = create_pool(config).await?;
//!
//!     let row: (i64,) = sqlx::query_as("SELECT ?")
//!         .bind(42i64)
//!         .fetch_one(&pool)
//!         .await?;
//!     assert_eq!(row.0, 42);
//!
//!     close_pool(pool).await;
//!     Ok(())
//! }
//! ```

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration for the database connection pool
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite URL (`sqlite://path/to/file.db` or `sqlite::memory:`)
    pub url: String,

    /// Maximum number of connections in the pool
    ///
    /// Default: 1. Raising it is only meaningful for file databases; every
    /// in-memory connection would otherwise see its own empty database.
    pub max_connections: u32,

    /// Timeout for acquiring a connection from the pool (seconds)
    ///
    /// Default: 30 seconds
    pub connect_timeout_seconds: u64,

    /// Create the database file when it does not exist
    ///
    /// Default: true
    pub create_if_missing: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            connect_timeout_seconds: 30,
            create_if_missing: true,
        }
    }
}

impl DatabaseConfig {
    /// Config for a private in-memory database
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// True when the URL points at an in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

/// Creates and initializes a SQLite connection pool
///
/// This function:
/// 1. Parses the URL and turns on foreign key enforcement
/// 2. Opens the pool with non-expiring connections
/// 3. Performs a health check to verify the database answers
///
/// # Errors
///
/// Returns an error if:
/// - The database URL is invalid
/// - The file cannot be opened or created
/// - Health check fails
pub async fn create_pool(config: DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    info!(
        url = %config.url,
        max_connections = config.max_connections,
        connect_timeout_seconds = config.connect_timeout_seconds,
        "Creating database connection pool"
    );

    let max_connections = if config.is_in_memory() && config.max_connections > 1 {
        warn!(
            requested = config.max_connections,
            "In-memory database limited to a single connection"
        );
        1
    } else {
        config.max_connections.max(1)
    };

    let connect_options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(config.create_if_missing)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(connect_options)
        .await?;

    health_check(&pool).await?;

    info!("Database connection pool created successfully");
    Ok(pool)
}

/// Performs a health check on the database connection
///
/// # Errors
///
/// Returns an error if the health check query fails
pub async fn health_check(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    debug!("Performing database health check");

    let result: (i32,) = sqlx::query_as("SELECT 1").fetch_one(pool).await?;

    if result.0 == 1 {
        debug!("Database health check passed");
        Ok(())
    } else {
        warn!("Database health check returned unexpected value: {}", result.0);
        Err(sqlx::Error::Protocol(
            "Health check returned unexpected value".into(),
        ))
    }
}

/// Snapshot of pool usage
#[derive(Debug, Clone)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub active_connections: usize,

    /// Number of idle connections available
    pub idle_connections: usize,

    /// Total connections in the pool
    pub total_connections: usize,
}

pub fn get_pool_stats(pool: &SqlitePool) -> PoolStats {
    let size = pool.size();
    let idle = pool.num_idle();

    PoolStats {
        active_connections: (size as usize).saturating_sub(idle),
        idle_connections: idle,
        total_connections: size as usize,
    }
}

/// Gracefully closes the connection pool
///
/// Waits for checked-out connections to be returned, then closes all of them.
/// Calling it on an already closed pool is harmless.
pub async fn close_pool(pool: SqlitePool) {
    info!("Closing database connection pool");
    pool.close().await;
    info!("Database connection pool closed");
}

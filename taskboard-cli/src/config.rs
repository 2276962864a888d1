/// Configuration management for the CLI
///
/// This module loads configuration from environment variables (and a `.env`
/// file when present) and provides a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `TASKBOARD_DATABASE_URL`: SQLite URL (default: sqlite://database/tasks.db)
/// - `TASKBOARD_DB_MAX_CONNECTIONS`: Pool size (default: 1)
/// - `TASKBOARD_DB_CONNECT_TIMEOUT`: Seconds to wait for a connection (default: 30)
/// - `RUST_LOG`: Log filter (default: taskboard_cli=info,taskboard_shared=info)
///
/// # Example
///
/// ```no_run
/// use taskboard_cli::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// config.prepare_database_dir()?;
/// println!("Using {}", config.database.url);
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use taskboard_shared::db::pool;

/// Default location of the database file, relative to the working directory
pub const DEFAULT_DATABASE_URL: &str = "sqlite://database/tasks.db";

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Database configuration
    pub database: DatabaseConfig,
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    pub connect_timeout_seconds: u64,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable does not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("TASKBOARD_DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let max_connections = lookup("TASKBOARD_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|| "1".to_string())
            .parse::<u32>()
            .context("TASKBOARD_DB_MAX_CONNECTIONS must be a positive integer")?;

        let connect_timeout_seconds = lookup("TASKBOARD_DB_CONNECT_TIMEOUT")
            .unwrap_or_else(|| "30".to_string())
            .parse::<u64>()
            .context("TASKBOARD_DB_CONNECT_TIMEOUT must be a number of seconds")?;

        Ok(Self {
            database: DatabaseConfig {
                url,
                max_connections,
                connect_timeout_seconds,
            },
        })
    }

    /// Replaces the database URL, e.g. from a command line flag
    pub fn with_database_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.database.url = url;
        }
        self
    }

    /// Pool settings for the shared library
    pub fn pool_config(&self) -> pool::DatabaseConfig {
        pool::DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            connect_timeout_seconds: self.database.connect_timeout_seconds,
            ..Default::default()
        }
    }

    /// Creates the directory holding the database file if it is missing
    pub fn prepare_database_dir(&self) -> anyhow::Result<()> {
        if let Some(dir) = database_dir(&self.database.url) {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create database directory {}", dir.display()))?;
        }
        Ok(())
    }
}

/// Parent directory of a file-backed SQLite URL
///
/// `None` for in-memory databases and files in the working directory.
fn database_dir(url: &str) -> Option<PathBuf> {
    if url.contains(":memory:") || url.contains("mode=memory") {
        return None;
    }

    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    let path = path.split('?').next().unwrap_or(path);

    PathBuf::from(path)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(PathBuf::from)
}

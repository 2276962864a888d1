//! The persistence store
//!
//! [`Store`] is the one handle through which everything reads and writes the
//! database. It is opened once, cloned into whoever needs it (clones share
//! the same pool) and closed once at shutdown.
//!
//! Per-entity operations live in `db::users`, `db::projects` and `db::tasks`
//! as further `impl Store` blocks. This module holds what they share: the
//! table descriptors with their update allow-lists and the generic
//! update/delete statements.
//!
//! # Example
//!
//! ```no_run
//! use taskboard_shared::db::fields::UpdateFields;
//! use taskboard_shared::db::pool::DatabaseConfig;
//! use taskboard_shared::db::store::Store;
//! use taskboard_shared::models::{TaskId, User};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Store::open(DatabaseConfig::default()).await?;
//!
//! let user = User::new("alice", "alice@example.com", "developer")?;
//! let id = store.insert_user(&user).await?;
//! let record = store.get_user_by_id(id).await?;
//! assert!(record.is_some());
//!
//! let changed = store
//!     .update_user(id, &UpdateFields::new().set("role", "manager"))
//!     .await?;
//! assert_eq!(changed, 1);
//!
//! assert_eq!(store.delete_task(TaskId(999)).await?, 0);
//! store.close().await;
//! # Ok(())
//! # }
//! ```

use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqlitePool};
use tracing::{debug, warn};

use super::fields::{FieldValue, UpdateFields};
use super::pool::{close_pool, create_pool, get_pool_stats, health_check, DatabaseConfig, PoolStats};
use super::schema::{self, SchemaStatus};
use crate::error::{StoreError, ValidationError};
use crate::timestamp;

/// Columns `update_user` may touch
pub const USER_FIELDS: &[&str] = &["username", "email", "role", "registration_date"];

/// Columns `update_project` may touch
pub const PROJECT_FIELDS: &[&str] = &["name", "description", "start_date", "end_date", "status"];

/// Columns `update_task` may touch
pub const TASK_FIELDS: &[&str] = &[
    "title",
    "description",
    "priority",
    "status",
    "due_date",
    "project_id",
    "assignee_id",
];

/// The three tables of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Users,
    Projects,
    Tasks,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Projects => "projects",
            Table::Tasks => "tasks",
        }
    }

    /// Columns an update may set
    pub fn allowed_fields(self) -> &'static [&'static str] {
        match self {
            Table::Users => USER_FIELDS,
            Table::Projects => PROJECT_FIELDS,
            Table::Tasks => TASK_FIELDS,
        }
    }

    /// Columns holding ISO-8601 text
    pub fn timestamp_fields(self) -> &'static [&'static str] {
        match self {
            Table::Users => &["registration_date"],
            Table::Projects => &["start_date", "end_date"],
            Table::Tasks => &["due_date"],
        }
    }

    /// Fails on the first column outside the allow-list
    pub fn check_fields(self, fields: &UpdateFields) -> Result<(), StoreError> {
        let allowed = self.allowed_fields();

        match fields.names().find(|name| !allowed.contains(name)) {
            Some(field) => Err(StoreError::FieldNotAllowed {
                table: self.name(),
                field: field.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Brings a value into its at-rest form
    ///
    /// Text bound for a timestamp column is parsed and re-rendered so the
    /// column only ever holds the canonical format. Timestamp columns accept
    /// nothing but text or a timestamp.
    fn normalize(self, field: &str, value: &FieldValue) -> Result<FieldValue, StoreError> {
        if !self.timestamp_fields().contains(&field) {
            return Ok(value.clone());
        }

        match value {
            FieldValue::Text(text) => Ok(FieldValue::Timestamp(timestamp::parse(text)?)),
            FieldValue::Timestamp(ts) => Ok(FieldValue::Timestamp(*ts)),
            FieldValue::Integer(_) | FieldValue::Null => {
                Err(ValidationError::NotATimestamp(field.to_string()).into())
            }
        }
    }
}

/// Handle to the task tracker database
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Opens the database described by `config` and ensures the schema
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created or a table cannot be
    /// created.
    pub async fn open(config: DatabaseConfig) -> Result<Self, StoreError> {
        let pool = create_pool(config).await?;
        Self::with_pool(pool).await
    }

    /// Wraps an existing pool, creating any missing tables
    pub async fn with_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        if let Err(e) = schema::create_tables(&pool).await {
            close_pool(pool).await;
            return Err(e.into());
        }
        Ok(Self { pool })
    }

    /// Fresh private in-memory store
    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::open(DatabaseConfig::in_memory()).await
    }

    /// Underlying pool, for ad-hoc queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        Ok(health_check(&self.pool).await?)
    }

    pub async fn schema_status(&self) -> Result<SchemaStatus, StoreError> {
        Ok(schema::get_schema_status(&self.pool).await?)
    }

    pub fn pool_stats(&self) -> PoolStats {
        get_pool_stats(&self.pool)
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// Releases the database
    ///
    /// Closing affects every clone of this store.
    pub async fn close(self) {
        close_pool(self.pool).await;
    }

    /// `UPDATE <table> SET ... WHERE id = ?` with every value bound
    ///
    /// Returns the number of rows changed (0 or 1). An empty field set is a
    /// no-op returning 0. Columns are checked against the allow-list before
    /// any SQL runs.
    pub(crate) async fn update_row(
        &self,
        table: Table,
        id: i64,
        fields: &UpdateFields,
    ) -> Result<u64, StoreError> {
        if fields.is_empty() {
            return Ok(0);
        }

        if let Err(e) = table.check_fields(fields) {
            warn!(table = table.name(), id, error = %e, "Rejected update");
            return Err(e);
        }

        let mut assignments = Vec::with_capacity(fields.len());
        let mut values = Vec::with_capacity(fields.len());
        for (field, value) in fields.iter() {
            assignments.push(format!("{field} = ?"));
            values.push(table.normalize(field, value)?);
        }

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?",
            table.name(),
            assignments.join(", ")
        );

        let mut query = sqlx::query(&sql);
        for value in values {
            query = bind_value(query, value);
        }

        let result = query.bind(id).execute(&self.pool).await?;
        let rows = result.rows_affected();

        debug!(table = table.name(), id, rows, "Updated row");
        Ok(rows)
    }

    /// `DELETE FROM <table> WHERE id = ?`, returning 0 or 1
    pub(crate) async fn delete_row(&self, table: Table, id: i64) -> Result<u64, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = ?", table.name());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        let rows = result.rows_affected();

        debug!(table = table.name(), id, rows, "Deleted row");
        Ok(rows)
    }
}

fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: FieldValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        FieldValue::Null => query.bind(None::<i64>),
        FieldValue::Integer(n) => query.bind(n),
        FieldValue::Text(text) => query.bind(text),
        FieldValue::Timestamp(ts) => query.bind(timestamp::format(&ts)),
    }
}

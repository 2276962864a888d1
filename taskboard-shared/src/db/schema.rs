//! Table definitions
//!
//! The schema is small and fixed, so tables are created with
//! `CREATE TABLE IF NOT EXISTS` on startup instead of through a migration
//! runner. Creating them is idempotent.
//!
//! Order matters: `tasks` references `users` and `projects`, so
//! [`create_tables`] creates those two first.
//!
//! # Example
//!
//! ```no_run
//! use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
//! use taskboard_shared::db::schema::{create_tables, get_schema_status};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig::default()).await?;
//! create_tables(&pool).await?;
//!
//! let status = get_schema_status(&pool).await?;
//! assert!(status.is_complete());
//! # Ok(())
//! # }
//! ```

use sqlx::sqlite::SqlitePool;
use tracing::{debug, info};

pub const USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL,
    email TEXT NOT NULL,
    role TEXT NOT NULL CHECK(role IN ('admin','manager','developer')),
    registration_date TEXT NOT NULL
)
"#;

pub const PROJECTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    status TEXT NOT NULL CHECK(status IN ('active','completed','on_hold')) DEFAULT 'active'
)
"#;

pub const TASKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    priority INTEGER NOT NULL CHECK(priority IN (1,2,3)),
    status TEXT NOT NULL CHECK(status IN ('pending','in_progress','completed')) DEFAULT 'pending',
    due_date TEXT NOT NULL,
    project_id INTEGER NULL,
    assignee_id INTEGER NULL,
    FOREIGN KEY(project_id) REFERENCES projects(id) ON DELETE SET NULL,
    FOREIGN KEY(assignee_id) REFERENCES users(id) ON DELETE SET NULL
)
"#;

/// Which tables exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchemaStatus {
    pub users: bool,
    pub projects: bool,
    pub tasks: bool,
}

impl SchemaStatus {
    /// All three tables are present
    pub fn is_complete(&self) -> bool {
        self.users && self.projects && self.tasks
    }
}

pub async fn create_user_table(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(USERS_TABLE).execute(pool).await?;
    debug!(table = "users", "Table ready");
    Ok(())
}

pub async fn create_project_table(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(PROJECTS_TABLE).execute(pool).await?;
    debug!(table = "projects", "Table ready");
    Ok(())
}

pub async fn create_task_table(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(TASKS_TABLE).execute(pool).await?;
    debug!(table = "tasks", "Table ready");
    Ok(())
}

/// Creates every table that does not exist yet
///
/// # Errors
///
/// Returns an error if any `CREATE TABLE` statement fails
pub async fn create_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    info!("Ensuring database schema");

    create_user_table(pool).await?;
    create_project_table(pool).await?;
    create_task_table(pool).await?;

    info!("Database schema ready");
    Ok(())
}

/// Reports which of the three tables exist
pub async fn get_schema_status(pool: &SqlitePool) -> Result<SchemaStatus, sqlx::Error> {
    let names: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master
         WHERE type = 'table' AND name IN ('users', 'projects', 'tasks')",
    )
    .fetch_all(pool)
    .await?;

    let has = |table: &str| names.iter().any(|name| name == table);
    let status = SchemaStatus {
        users: has("users"),
        projects: has("projects"),
        tasks: has("tasks"),
    };

    debug!(?status, "Schema status retrieved");
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::{create_pool, DatabaseConfig};

    #[test]
    fn test_schema_status_complete() {
        let status = SchemaStatus {
            users: true,
            projects: true,
            tasks: false,
        };
        assert!(!status.is_complete());
        assert!(!SchemaStatus::default().is_complete());
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() {
        let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();
        assert_eq!(get_schema_status(&pool).await.unwrap(), SchemaStatus::default());

        create_tables(&pool).await.unwrap();
        create_tables(&pool).await.unwrap();

        assert!(get_schema_status(&pool).await.unwrap().is_complete());
    }

    #[tokio::test]
    async fn test_partial_schema_is_reported() {
        let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();
        create_user_table(&pool).await.unwrap();

        let status = get_schema_status(&pool).await.unwrap();
        assert!(status.users);
        assert!(!status.projects);
        assert!(!status.tasks);
    }
}

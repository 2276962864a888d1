//! `tasks` table operations, including the filtered queries

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use tracing::debug;

use super::decode::{decode_enum, decode_priority, decode_timestamp};
use super::fields::UpdateFields;
use super::store::{Store, Table};
use crate::error::StoreError;
use crate::models::task::{Task, TaskRecord};
use crate::models::{ProjectId, TaskId, UserId};
use crate::progress::TaskCounts;
use crate::timestamp;

const TASK_COLUMNS: &str =
    "id, title, description, priority, status, due_date, project_id, assignee_id";

impl<'r> FromRow<'r, SqliteRow> for TaskRecord {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            priority: decode_priority(row, "priority")?,
            status: decode_enum(row, "status")?,
            due_date: decode_timestamp(row, "due_date")?,
            project_id: row.try_get("project_id")?,
            assignee_id: row.try_get("assignee_id")?,
        })
    }
}

impl Store {
    /// Inserts a new task and returns its identity
    ///
    /// The task's current status is written as-is.
    ///
    /// # Errors
    ///
    /// - `AlreadyPersisted` if the task already has an identity
    /// - `Database` if the row is rejected, e.g. a project or assignee that
    ///   does not exist
    pub async fn insert_task(&self, task: &Task) -> Result<TaskId, StoreError> {
        if let Some(id) = task.id() {
            return Err(StoreError::AlreadyPersisted {
                table: Table::Tasks.name(),
                id: id.get(),
            });
        }

        let id: TaskId = sqlx::query_scalar(
            r#"
            INSERT INTO tasks (title, description, priority, status, due_date, project_id, assignee_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(task.title())
        .bind(task.description())
        .bind(i64::from(task.priority()))
        .bind(task.status().as_str())
        .bind(timestamp::format(&task.due_date()))
        .bind(task.project_id())
        .bind(task.assignee_id())
        .fetch_one(self.pool())
        .await?;

        debug!(task_id = %id, "Inserted task");
        Ok(id)
    }

    /// Finds a task by ID
    pub async fn get_task_by_id(&self, id: TaskId) -> Result<Option<TaskRecord>, StoreError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?");
        let record = sqlx::query_as::<_, TaskRecord>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(record)
    }

    /// Lists all tasks by ascending ID
    pub async fn get_all_tasks(&self) -> Result<Vec<TaskRecord>, StoreError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id");
        let records = sqlx::query_as::<_, TaskRecord>(&sql)
            .fetch_all(self.pool())
            .await?;

        Ok(records)
    }

    /// Updates columns of a task row
    ///
    /// Allowed: title, description, priority, status, due_date, project_id,
    /// assignee_id.
    pub async fn update_task(&self, id: TaskId, fields: &UpdateFields) -> Result<u64, StoreError> {
        self.update_row(Table::Tasks, id.get(), fields).await
    }

    pub async fn delete_task(&self, id: TaskId) -> Result<u64, StoreError> {
        self.delete_row(Table::Tasks, id.get()).await
    }

    /// Tasks whose title or description contains `query`
    ///
    /// Matching uses `LIKE`, so it is case-insensitive for ASCII letters and
    /// `%`/`_` in the query act as wildcards.
    pub async fn search_tasks(&self, query: &str) -> Result<Vec<TaskRecord>, StoreError> {
        let pattern = format!("%{query}%");
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE title LIKE ? OR description LIKE ? ORDER BY id"
        );
        let records = sqlx::query_as::<_, TaskRecord>(&sql)
            .bind(&pattern)
            .bind(&pattern)
            .fetch_all(self.pool())
            .await?;

        Ok(records)
    }

    pub async fn get_tasks_by_project(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<TaskRecord>, StoreError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = ? ORDER BY id");
        let records = sqlx::query_as::<_, TaskRecord>(&sql)
            .bind(project_id)
            .fetch_all(self.pool())
            .await?;

        Ok(records)
    }

    pub async fn get_tasks_by_user(&self, user_id: UserId) -> Result<Vec<TaskRecord>, StoreError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE assignee_id = ? ORDER BY id");
        let records = sqlx::query_as::<_, TaskRecord>(&sql)
            .bind(user_id)
            .fetch_all(self.pool())
            .await?;

        Ok(records)
    }

    /// Total and completed task counts for a project
    pub async fn count_tasks_for_project(
        &self,
        project_id: ProjectId,
    ) -> Result<TaskCounts, StoreError> {
        let (total, completed): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(status = 'completed'), 0)
            FROM tasks
            WHERE project_id = ?
            "#,
        )
        .bind(project_id)
        .fetch_one(self.pool())
        .await?;

        Ok(TaskCounts {
            total: total.max(0) as u64,
            completed: completed.max(0) as u64,
        })
    }
}

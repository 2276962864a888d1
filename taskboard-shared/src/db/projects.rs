//! `projects` table operations

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use tracing::debug;

use super::decode::{decode_enum, decode_timestamp};
use super::fields::UpdateFields;
use super::store::{Store, Table};
use crate::error::StoreError;
use crate::models::project::{Project, ProjectRecord};
use crate::models::ProjectId;
use crate::timestamp;

impl<'r> FromRow<'r, SqliteRow> for ProjectRecord {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            start_date: decode_timestamp(row, "start_date")?,
            end_date: decode_timestamp(row, "end_date")?,
            status: decode_enum(row, "status")?,
        })
    }
}

impl Store {
    /// Inserts a new project and returns its identity
    ///
    /// # Errors
    ///
    /// - `AlreadyPersisted` if the project already has an identity
    /// - `Database` if the row is rejected
    pub async fn insert_project(&self, project: &Project) -> Result<ProjectId, StoreError> {
        if let Some(id) = project.id() {
            return Err(StoreError::AlreadyPersisted {
                table: Table::Projects.name(),
                id: id.get(),
            });
        }

        let id: ProjectId = sqlx::query_scalar(
            r#"
            INSERT INTO projects (name, description, start_date, end_date, status)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(project.name())
        .bind(project.description())
        .bind(timestamp::format(&project.start_date()))
        .bind(timestamp::format(&project.end_date()))
        .bind(project.status().as_str())
        .fetch_one(self.pool())
        .await?;

        debug!(project_id = %id, "Inserted project");
        Ok(id)
    }

    /// Finds a project by ID
    pub async fn get_project_by_id(
        &self,
        id: ProjectId,
    ) -> Result<Option<ProjectRecord>, StoreError> {
        let record = sqlx::query_as::<_, ProjectRecord>(
            r#"
            SELECT id, name, description, start_date, end_date, status
            FROM projects
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(record)
    }

    /// Lists all projects by ascending ID
    pub async fn get_all_projects(&self) -> Result<Vec<ProjectRecord>, StoreError> {
        let records = sqlx::query_as::<_, ProjectRecord>(
            r#"
            SELECT id, name, description, start_date, end_date, status
            FROM projects
            ORDER BY id
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        Ok(records)
    }

    /// Updates columns of a project row
    ///
    /// Allowed: name, description, start_date, end_date, status. Dates are
    /// not checked against each other here.
    pub async fn update_project(
        &self,
        id: ProjectId,
        fields: &UpdateFields,
    ) -> Result<u64, StoreError> {
        self.update_row(Table::Projects, id.get(), fields).await
    }

    /// Deletes a project
    ///
    /// Tasks of the project keep existing with `project_id` cleared.
    pub async fn delete_project(&self, id: ProjectId) -> Result<u64, StoreError> {
        self.delete_row(Table::Projects, id.get()).await
    }
}

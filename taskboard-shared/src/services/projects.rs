//! Project operations and progress

use chrono::{DateTime, Utc};
use tracing::info;

use crate::db::fields::UpdateFields;
use crate::db::store::Store;
use crate::error::StoreError;
use crate::models::{Project, ProjectChanges, ProjectId, Task};
use crate::progress::{project_progress, ProgressMode};
use crate::timestamp;

/// Project management on top of a [`Store`]
#[derive(Debug, Clone)]
pub struct ProjectService {
    store: Store,
}

impl ProjectService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Persists a new project and returns it with its identity attached
    pub async fn add_project(&self, mut project: Project) -> Result<Project, StoreError> {
        let id = self.store.insert_project(&project).await?;
        project.assign_id(id);

        info!(project_id = %id, name = project.name(), "Project created");
        Ok(project)
    }

    pub async fn get_project(&self, id: ProjectId) -> Result<Option<Project>, StoreError> {
        Ok(self.store.get_project_by_id(id).await?.map(Project::from))
    }

    pub async fn get_all_projects(&self) -> Result<Vec<Project>, StoreError> {
        let records = self.store.get_all_projects().await?;
        Ok(records.into_iter().map(Project::from).collect())
    }

    /// Raw column update, see [`Store::update_project`]
    pub async fn update_project(
        &self,
        id: ProjectId,
        fields: &UpdateFields,
    ) -> Result<u64, StoreError> {
        self.store.update_project(id, fields).await
    }

    /// Deletes a project, returning whether one was removed
    pub async fn delete_project(&self, id: ProjectId) -> Result<bool, StoreError> {
        let deleted = self.store.delete_project(id).await? > 0;
        if deleted {
            info!(project_id = %id, "Project deleted");
        }
        Ok(deleted)
    }

    /// Sets the status of a stored project and returns the reloaded project
    ///
    /// `None` if the project does not exist. An unknown status is a
    /// validation error and nothing is written.
    pub async fn update_project_status(
        &self,
        id: ProjectId,
        status: &str,
    ) -> Result<Option<Project>, StoreError> {
        let Some(mut project) = self.get_project(id).await? else {
            return Ok(None);
        };

        project.update_status(status)?;

        let changes = ProjectChanges {
            status: Some(project.status()),
            ..Default::default()
        };
        self.store.update_project(id, &changes.into_fields()).await?;

        info!(project_id = %id, status = %project.status(), "Project status changed");
        self.get_project(id).await
    }

    /// Tasks belonging to the project, by ascending ID
    pub async fn get_project_tasks(&self, id: ProjectId) -> Result<Vec<Task>, StoreError> {
        let records = self.store.get_tasks_by_project(id).await?;
        Ok(records.into_iter().map(Task::from).collect())
    }

    /// Progress in percent under [`ProgressMode::Auto`], now
    ///
    /// `None` if the project does not exist.
    pub async fn get_project_progress(&self, id: ProjectId) -> Result<Option<f64>, StoreError> {
        self.get_project_progress_with(id, ProgressMode::Auto, timestamp::now())
            .await
    }

    /// Progress in percent under an explicit mode and clock
    pub async fn get_project_progress_with(
        &self,
        id: ProjectId,
        mode: ProgressMode,
        now: DateTime<Utc>,
    ) -> Result<Option<f64>, StoreError> {
        let Some(project) = self.get_project(id).await? else {
            return Ok(None);
        };

        let counts = self.store.count_tasks_for_project(id).await?;
        Ok(Some(project_progress(&project, counts, mode, now)))
    }
}

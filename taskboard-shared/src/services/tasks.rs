//! Task operations, search and filters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::fields::UpdateFields;
use crate::db::store::Store;
use crate::error::StoreError;
use crate::models::{Priority, ProjectId, Task, TaskChanges, TaskId, TaskStatus, UserId};
use crate::timestamp;

/// Status and priority filter, as offered next to the task list
///
/// An unset criterion matches every task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.map_or(true, |status| task.status() == status)
            && self.priority.map_or(true, |priority| task.priority() == priority)
    }
}

/// Task management on top of a [`Store`]
#[derive(Debug, Clone)]
pub struct TaskService {
    store: Store,
}

impl TaskService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Persists a new task and returns it with its identity attached
    ///
    /// The task is stored with whatever status it currently has.
    pub async fn add_task(&self, mut task: Task) -> Result<Task, StoreError> {
        let id = self.store.insert_task(&task).await?;
        task.assign_id(id);

        info!(
            task_id = %id,
            title = task.title(),
            priority = %task.priority(),
            status = %task.status(),
            "Task created"
        );
        Ok(task)
    }

    pub async fn get_task(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        Ok(self.store.get_task_by_id(id).await?.map(Task::from))
    }

    pub async fn get_all_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let records = self.store.get_all_tasks().await?;
        Ok(records.into_iter().map(Task::from).collect())
    }

    /// Raw column update, see [`Store::update_task`]
    pub async fn update_task(&self, id: TaskId, fields: &UpdateFields) -> Result<u64, StoreError> {
        self.store.update_task(id, fields).await
    }

    /// Deletes a task, returning whether one was removed
    pub async fn delete_task(&self, id: TaskId) -> Result<bool, StoreError> {
        let deleted = self.store.delete_task(id).await? > 0;
        if deleted {
            info!(task_id = %id, "Task deleted");
        }
        Ok(deleted)
    }

    /// Substring search over title and description
    pub async fn search_tasks(&self, query: &str) -> Result<Vec<Task>, StoreError> {
        let records = self.store.search_tasks(query).await?;
        Ok(records.into_iter().map(Task::from).collect())
    }

    /// Sets the status of a stored task and returns the reloaded task
    ///
    /// `None` if the task does not exist. An unknown status is a validation
    /// error and nothing is written.
    pub async fn update_task_status(
        &self,
        id: TaskId,
        status: &str,
    ) -> Result<Option<Task>, StoreError> {
        let Some(mut task) = self.get_task(id).await? else {
            return Ok(None);
        };

        task.update_status(status)?;

        let changes = TaskChanges {
            status: Some(task.status()),
            ..Default::default()
        };
        self.store.update_task(id, &changes.into_fields()).await?;

        info!(task_id = %id, status = %task.status(), "Task status changed");
        self.get_task(id).await
    }

    /// Tasks overdue right now
    pub async fn get_overdue_tasks(&self) -> Result<Vec<Task>, StoreError> {
        self.get_overdue_tasks_at(timestamp::now()).await
    }

    /// Tasks not completed and due at or before `now`, by ascending ID
    pub async fn get_overdue_tasks_at(&self, now: DateTime<Utc>) -> Result<Vec<Task>, StoreError> {
        let tasks = self.get_all_tasks().await?;
        Ok(tasks.into_iter().filter(|task| task.is_overdue_at(now)).collect())
    }

    pub async fn get_tasks_by_project(&self, project_id: ProjectId) -> Result<Vec<Task>, StoreError> {
        let records = self.store.get_tasks_by_project(project_id).await?;
        Ok(records.into_iter().map(Task::from).collect())
    }

    pub async fn get_tasks_by_user(&self, user_id: UserId) -> Result<Vec<Task>, StoreError> {
        let records = self.store.get_tasks_by_user(user_id).await?;
        Ok(records.into_iter().map(Task::from).collect())
    }

    /// All tasks matching `filter`, by ascending ID
    pub async fn filter_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let tasks = self.get_all_tasks().await?;
        Ok(tasks.into_iter().filter(|task| filter.matches(task)).collect())
    }
}

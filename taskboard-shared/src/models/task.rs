//! Task model
//!
//! A task is a unit of work with a priority (1, 2 or 3), a due date and
//! optional links to a project and an assignee.
//!
//! # State Machine
//!
//! ```text
//! pending → in_progress → completed
//! ```
//!
//! The arrows are the usual flow, not a restriction: any known status may
//! replace any other.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE tasks (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     title TEXT NOT NULL,
//!     description TEXT NOT NULL DEFAULT '',
//!     priority INTEGER NOT NULL CHECK(priority IN (1,2,3)),
//!     status TEXT NOT NULL CHECK(status IN ('pending','in_progress','completed')) DEFAULT 'pending',
//!     due_date TEXT NOT NULL,
//!     project_id INTEGER NULL REFERENCES projects(id) ON DELETE SET NULL,
//!     assignee_id INTEGER NULL REFERENCES users(id) ON DELETE SET NULL
//! );
//! ```
//!
//! # Example
//!
//! ```
//! use taskboard_shared::models::task::{Task, TaskStatus};
//!
//! let mut task = Task::new("Write report", "", 2, "2000-01-01T09:00", None, None).unwrap();
//! assert!(task.is_overdue());
//!
//! task.update_status("completed").unwrap();
//! assert_eq!(task.status(), TaskStatus::Completed);
//! assert!(!task.is_overdue());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

use super::id::{ProjectId, TaskId, UserId};
use crate::db::fields::{FieldValue, UpdateFields};
use crate::error::ValidationError;
use crate::timestamp::{self, IntoTimestamp};

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    #[default]
    Pending,

    /// Someone is working on it
    InProgress,

    /// Done
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    /// Converts status to its stored string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(ValidationError::InvalidTaskStatus(s.to_string())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TaskStatus> for FieldValue {
    fn from(status: TaskStatus) -> Self {
        FieldValue::Text(status.as_str().to_string())
    }
}

/// Task priority, always 1, 2 or 3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Priority(u8);

impl Priority {
    pub const ALL: [Priority; 3] = [Priority(1), Priority(2), Priority(3)];

    /// # Errors
    ///
    /// `InvalidPriority` for anything outside 1..=3
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        match value {
            1..=3 => Ok(Priority(value as u8)),
            _ => Err(ValidationError::InvalidPriority(value)),
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Priority {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Priority::new(value)
    }
}

impl From<Priority> for i64 {
    fn from(priority: Priority) -> Self {
        i64::from(priority.0)
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        text.parse::<i64>()
            .map_err(|_| ValidationError::PriorityNotANumber(text.to_string()))
            .and_then(Priority::new)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Priority> for FieldValue {
    fn from(priority: Priority) -> Self {
        FieldValue::Integer(i64::from(priority.0))
    }
}

impl From<ProjectId> for FieldValue {
    fn from(id: ProjectId) -> Self {
        FieldValue::Integer(id.0)
    }
}

impl From<UserId> for FieldValue {
    fn from(id: UserId) -> Self {
        FieldValue::Integer(id.0)
    }
}

/// A validated task
#[derive(Debug, Clone)]
pub struct Task {
    id: Option<TaskId>,
    title: String,
    description: String,
    priority: Priority,
    status: TaskStatus,
    due_date: DateTime<Utc>,
    project_id: Option<ProjectId>,
    assignee_id: Option<UserId>,
}

impl Task {
    /// Creates an unsaved, pending task
    ///
    /// # Errors
    ///
    /// - `InvalidPriority` if `priority` is not 1, 2 or 3
    /// - `InvalidTimestamp` if the due date text does not parse
    pub fn new(
        title: &str,
        description: &str,
        priority: i64,
        due_date: impl IntoTimestamp,
        project_id: Option<ProjectId>,
        assignee_id: Option<UserId>,
    ) -> Result<Self, ValidationError> {
        let priority = Priority::new(priority)?;
        let due_date = due_date.into_timestamp()?;

        Ok(Self {
            id: None,
            title: title.trim().to_string(),
            description: description.to_string(),
            priority,
            status: TaskStatus::Pending,
            due_date,
            project_id,
            assignee_id,
        })
    }

    pub fn id(&self) -> Option<TaskId> {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn due_date(&self) -> DateTime<Utc> {
        self.due_date
    }

    pub fn project_id(&self) -> Option<ProjectId> {
        self.project_id
    }

    pub fn assignee_id(&self) -> Option<UserId> {
        self.assignee_id
    }

    pub(crate) fn assign_id(&mut self, id: TaskId) {
        self.id = Some(id);
    }

    /// Replaces the status with a named one
    ///
    /// # Errors
    ///
    /// `InvalidTaskStatus` for anything but pending, in_progress, completed;
    /// the current status is kept.
    pub fn update_status(&mut self, new_status: &str) -> Result<(), ValidationError> {
        self.status = new_status.parse()?;
        Ok(())
    }

    /// Not completed and due at or before `now`
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_completed() && self.due_date <= now
    }

    pub fn is_overdue(&self) -> bool {
        self.is_overdue_at(Utc::now())
    }

    /// Field mapping with the due date as ISO-8601 text
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("id".into(), json!(self.id));
        map.insert("title".into(), json!(self.title));
        map.insert("description".into(), json!(self.description));
        map.insert("priority".into(), json!(self.priority.get()));
        map.insert("status".into(), json!(self.status.as_str()));
        map.insert("due_date".into(), json!(timestamp::format(&self.due_date)));
        map.insert("project_id".into(), json!(self.project_id));
        map.insert("assignee_id".into(), json!(self.assignee_id));
        map
    }
}

/// Persisted tasks compare by identity; unsaved tasks compare by value
impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => {
                self.title == other.title
                    && self.description == other.description
                    && self.priority == other.priority
                    && self.status == other.status
                    && self.due_date == other.due_date
                    && self.project_id == other.project_id
                    && self.assignee_id == other.assignee_id
            }
            _ => false,
        }
    }
}

impl Eq for Task {}

impl PartialEq<TaskId> for Task {
    fn eq(&self, other: &TaskId) -> bool {
        self.id == Some(*other)
    }
}

impl PartialEq<Task> for TaskId {
    fn eq(&self, other: &Task) -> bool {
        other == self
    }
}

/// A row of the `tasks` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: TaskStatus,
    #[serde(with = "crate::timestamp::iso")]
    pub due_date: DateTime<Utc>,
    pub project_id: Option<ProjectId>,
    pub assignee_id: Option<UserId>,
}

/// Rebuilds a task from its stored row; id and status are attached directly
impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        Self {
            id: Some(record.id),
            title: record.title,
            description: record.description,
            priority: record.priority,
            status: record.status,
            due_date: record.due_date,
            project_id: record.project_id,
            assignee_id: record.assignee_id,
        }
    }
}

/// Typed partial update for a task row
///
/// The reference fields are doubly optional: `Some(None)` clears the link.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<DateTime<Utc>>,
    pub project_id: Option<Option<ProjectId>>,
    pub assignee_id: Option<Option<UserId>>,
}

impl TaskChanges {
    pub fn into_fields(self) -> UpdateFields {
        let mut fields = UpdateFields::new();

        if let Some(title) = self.title {
            fields.insert("title", title.trim());
        }
        if let Some(description) = self.description {
            fields.insert("description", description);
        }
        if let Some(priority) = self.priority {
            fields.insert("priority", priority);
        }
        if let Some(status) = self.status {
            fields.insert("status", status);
        }
        if let Some(due_date) = self.due_date {
            fields.insert("due_date", due_date);
        }
        if let Some(project_id) = self.project_id {
            fields.insert("project_id", project_id);
        }
        if let Some(assignee_id) = self.assignee_id {
            fields.insert("assignee_id", assignee_id);
        }

        fields
    }
}

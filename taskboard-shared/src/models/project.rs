//! Project model
//!
//! A project spans a time window and groups tasks. Its end may not precede
//! its start when it is created; later date edits go straight to the store
//! and are not cross-checked.
//!
//! # State Machine
//!
//! ```text
//! active ⇄ on_hold
//! active ⇄ completed
//! on_hold ⇄ completed
//! ```
//!
//! Any status may replace any other; only unknown values are rejected.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE projects (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     name TEXT NOT NULL,
//!     description TEXT NOT NULL DEFAULT '',
//!     start_date TEXT NOT NULL,
//!     end_date TEXT NOT NULL,
//!     status TEXT NOT NULL CHECK(status IN ('active','completed','on_hold')) DEFAULT 'active'
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

use super::id::ProjectId;
use crate::db::fields::{FieldValue, UpdateFields};
use crate::error::ValidationError;
use crate::timestamp::{self, IntoTimestamp};

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Work is ongoing
    #[default]
    Active,

    /// Work is finished
    Completed,

    /// Work is paused
    OnHold,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 3] = [
        ProjectStatus::Active,
        ProjectStatus::Completed,
        ProjectStatus::OnHold,
    ];

    /// Converts status to its stored string
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::OnHold => "on_hold",
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "active" => Ok(ProjectStatus::Active),
            "completed" => Ok(ProjectStatus::Completed),
            "on_hold" => Ok(ProjectStatus::OnHold),
            _ => Err(ValidationError::InvalidProjectStatus(s.to_string())),
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ProjectStatus> for FieldValue {
    fn from(status: ProjectStatus) -> Self {
        FieldValue::Text(status.as_str().to_string())
    }
}

/// A validated project
#[derive(Debug, Clone)]
pub struct Project {
    id: Option<ProjectId>,
    name: String,
    description: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    status: ProjectStatus,
}

impl Project {
    /// Creates an unsaved, active project
    ///
    /// Dates may be structured values or ISO-8601 text.
    ///
    /// # Errors
    ///
    /// - `InvalidTimestamp` if a date string does not parse
    /// - `EndBeforeStart` if `end < start` (equal dates are fine)
    ///
    /// # Example
    ///
    /// ```
    /// use taskboard_shared::models::project::Project;
    ///
    /// let project = Project::new("Launch", "", "2024-01-01", "2024-01-31").unwrap();
    /// assert_eq!(project.status().as_str(), "active");
    /// assert!(Project::new("Oops", "", "2024-02-01", "2024-01-01").is_err());
    /// ```
    pub fn new(
        name: &str,
        description: &str,
        start_date: impl IntoTimestamp,
        end_date: impl IntoTimestamp,
    ) -> Result<Self, ValidationError> {
        let start_date = start_date.into_timestamp()?;
        let end_date = end_date.into_timestamp()?;

        if end_date < start_date {
            return Err(ValidationError::EndBeforeStart {
                start: start_date,
                end: end_date,
            });
        }

        Ok(Self {
            id: None,
            name: name.trim().to_string(),
            description: description.to_string(),
            start_date,
            end_date,
            status: ProjectStatus::Active,
        })
    }

    pub fn id(&self) -> Option<ProjectId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    pub fn end_date(&self) -> DateTime<Utc> {
        self.end_date
    }

    pub fn status(&self) -> ProjectStatus {
        self.status
    }

    pub(crate) fn assign_id(&mut self, id: ProjectId) {
        self.id = Some(id);
    }

    /// Replaces the status with a named one
    ///
    /// # Errors
    ///
    /// `InvalidProjectStatus` for anything but active, completed, on_hold;
    /// the current status is kept.
    pub fn update_status(&mut self, new_status: &str) -> Result<(), ValidationError> {
        self.status = new_status.parse()?;
        Ok(())
    }

    /// Time-based progress at `now`, in whole percent
    ///
    /// 0 before the start, 100 at or after the end, otherwise the floored
    /// share of elapsed seconds. A zero-length span counts as done.
    pub fn progress_at(&self, now: DateTime<Utc>) -> u8 {
        if now < self.start_date {
            return 0;
        }
        if now >= self.end_date {
            return 100;
        }

        let total = (self.end_date - self.start_date).num_seconds();
        if total <= 0 {
            return 100;
        }
        let elapsed = (now - self.start_date).num_seconds();

        (elapsed * 100 / total).clamp(0, 100) as u8
    }

    /// Time-based progress right now
    pub fn progress(&self) -> u8 {
        self.progress_at(Utc::now())
    }

    /// Field mapping with dates as ISO-8601 text
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("id".into(), json!(self.id));
        map.insert("name".into(), json!(self.name));
        map.insert("description".into(), json!(self.description));
        map.insert("start_date".into(), json!(timestamp::format(&self.start_date)));
        map.insert("end_date".into(), json!(timestamp::format(&self.end_date)));
        map.insert("status".into(), json!(self.status.as_str()));
        map
    }
}

/// Persisted projects compare by identity; unsaved projects compare by value
impl PartialEq for Project {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => {
                self.name == other.name
                    && self.description == other.description
                    && self.start_date == other.start_date
                    && self.end_date == other.end_date
                    && self.status == other.status
            }
            _ => false,
        }
    }
}

impl Eq for Project {}

impl PartialEq<ProjectId> for Project {
    fn eq(&self, other: &ProjectId) -> bool {
        self.id == Some(*other)
    }
}

impl PartialEq<Project> for ProjectId {
    fn eq(&self, other: &Project) -> bool {
        other == self
    }
}

/// A row of the `projects` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    #[serde(with = "crate::timestamp::iso")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "crate::timestamp::iso")]
    pub end_date: DateTime<Utc>,
    pub status: ProjectStatus,
}

/// Rebuilds a project from its stored row; the stored dates and status are
/// trusted as-is
impl From<ProjectRecord> for Project {
    fn from(record: ProjectRecord) -> Self {
        Self {
            id: Some(record.id),
            name: record.name,
            description: record.description,
            start_date: record.start_date,
            end_date: record.end_date,
            status: record.status,
        }
    }
}

/// Typed partial update for a project row
#[derive(Debug, Clone, Default)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<ProjectStatus>,
}

impl ProjectChanges {
    pub fn into_fields(self) -> UpdateFields {
        let mut fields = UpdateFields::new();

        if let Some(name) = self.name {
            fields.insert("name", name.trim());
        }
        if let Some(description) = self.description {
            fields.insert("description", description);
        }
        if let Some(start_date) = self.start_date {
            fields.insert("start_date", start_date);
        }
        if let Some(end_date) = self.end_date {
            fields.insert("end_date", end_date);
        }
        if let Some(status) = self.status {
            fields.insert("status", status);
        }

        fields
    }
}

//! Project progress
//!
//! A project's progress is derived, never stored. Two sources exist:
//!
//! - the share of its tasks that are completed
//! - the share of its time window that has elapsed ([`Project::progress_at`])
//!
//! [`ProgressMode::Auto`] uses the task share whenever the project has at
//! least one task and falls back to time otherwise. The other modes pin one
//! source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::project::Project;
use crate::models::task::TaskStatus;

/// Which signal drives project progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressMode {
    /// Task share if any tasks exist, else elapsed time
    #[default]
    Auto,

    /// Task share only (0 for a project without tasks)
    Tasks,

    /// Elapsed time only
    Time,
}

impl FromStr for ProgressMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "auto" => Ok(ProgressMode::Auto),
            "tasks" => Ok(ProgressMode::Tasks),
            "time" => Ok(ProgressMode::Time),
            other => Err(format!("unknown progress mode {other:?} (expected auto, tasks or time)")),
        }
    }
}

/// Task totals for one project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskCounts {
    pub total: u64,
    pub completed: u64,
}

impl TaskCounts {
    /// Tallies a set of task statuses
    pub fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = TaskStatus>,
    {
        statuses
            .into_iter()
            .fold(TaskCounts::default(), |mut counts, status| {
                counts.total += 1;
                if status.is_completed() {
                    counts.completed += 1;
                }
                counts
            })
    }

    /// Completed share in percent, `None` without tasks
    pub fn completion_percent(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.completed as f64 * 100.0 / self.total as f64)
        }
    }
}

/// Progress of `project` in percent at `now`
pub fn project_progress(
    project: &Project,
    counts: TaskCounts,
    mode: ProgressMode,
    now: DateTime<Utc>,
) -> f64 {
    let by_time = || f64::from(project.progress_at(now));

    match mode {
        ProgressMode::Auto => counts.completion_percent().unwrap_or_else(by_time),
        ProgressMode::Tasks => counts.completion_percent().unwrap_or(0.0),
        ProgressMode::Time => by_time(),
    }
}

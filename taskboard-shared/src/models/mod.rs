//! Domain models for Taskboard
//!
//! Each entity validates itself on construction and carries an identity only
//! after the store has inserted it.
//!
//! # Models
//!
//! - `user`: people tasks are assigned to
//! - `project`: time-boxed groups of tasks
//! - `task`: units of work with priority, status and due date
//! - `id`: typed identities shared by all of the above
//!
//! Each model module also defines the matching stored row (`*Record`) and a
//! typed partial update (`*Changes`).
//!
//! # Example
//!
//! ```
//! use taskboard_shared::models::{Project, Task};
//!
//! let project = Project::new("Website", "relaunch", "2024-03-01", "2024-04-01").unwrap();
//! let task = Task::new("Draft copy", "", 1, "2024-03-10 17:00", None, None).unwrap();
//! assert!(project.id().is_none() && task.id().is_none());
//! ```

pub mod id;
pub mod project;
pub mod task;
pub mod user;

pub use id::{ProjectId, TaskId, UserId};
pub use project::{Project, ProjectChanges, ProjectRecord, ProjectStatus};
pub use task::{Priority, Task, TaskChanges, TaskRecord, TaskStatus};
pub use user::{Role, User, UserChanges, UserRecord};

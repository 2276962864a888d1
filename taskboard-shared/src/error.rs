//! Error types shared by the models, the store and the services
//!
//! Two layers:
//!
//! - [`ValidationError`]: an input broke an entity rule (bad email, unknown
//!   role, priority outside 1..=3, end before start, unparseable timestamp).
//!   Raised before anything touches the database.
//! - [`StoreError`]: everything the persistence layer can fail with. Wraps
//!   validation failures so service methods have a single error type.
//!
//! A missing row is never an error; lookups return `Ok(None)`.

use chrono::{DateTime, Utc};

/// Entity validation failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Email does not have the `local@domain.tld` shape
    #[error("Invalid email: {0:?}")]
    InvalidEmail(String),

    /// Role is not one of admin, manager, developer
    #[error("Invalid role: {0:?} (expected admin, manager or developer)")]
    InvalidRole(String),

    /// Priority outside 1..=3
    #[error("Priority must be 1, 2 or 3, got {0}")]
    InvalidPriority(i64),

    /// Priority text is not a number
    #[error("Priority must be 1, 2 or 3, got {0:?}")]
    PriorityNotANumber(String),

    /// Project status is not one of active, completed, on_hold
    #[error("Invalid project status: {0:?} (expected active, completed or on_hold)")]
    InvalidProjectStatus(String),

    /// Task status is not one of pending, in_progress, completed
    #[error("Invalid task status: {0:?} (expected pending, in_progress or completed)")]
    InvalidTaskStatus(String),

    /// Project ends before it starts
    #[error("End date {end} must not be before start date {start}")]
    EndBeforeStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Text is not an accepted ISO-8601 timestamp
    #[error("Invalid timestamp {0:?}: expected ISO-8601 such as 2024-01-31T09:30:00")]
    InvalidTimestamp(String),

    /// A timestamp column was given a value that is neither text nor a timestamp
    #[error("Field {0:?} holds a timestamp, not an integer or NULL")]
    NotATimestamp(String),
}

/// Persistence layer failure
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Update named a column outside the table's allow-list
    #[error("Field {field:?} cannot be updated on {table}")]
    FieldNotAllowed { table: &'static str, field: String },

    /// Insert was given an entity that already has an identity
    #[error("Row {id} already exists in {table}")]
    AlreadyPersisted { table: &'static str, id: i64 },

    /// A value failed entity validation on its way into the store
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Database error (connection, constraint violation, ...)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// True for failures caused by caller input rather than the database
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StoreError::FieldNotAllowed { .. }
                | StoreError::AlreadyPersisted { .. }
                | StoreError::Validation(_)
        )
    }
}

//! `users` table operations

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use tracing::debug;

use super::decode::{decode_enum, decode_timestamp};
use super::fields::UpdateFields;
use super::store::{Store, Table};
use crate::error::StoreError;
use crate::models::user::{User, UserRecord};
use crate::models::UserId;
use crate::timestamp;

impl<'r> FromRow<'r, SqliteRow> for UserRecord {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            role: decode_enum(row, "role")?,
            registration_date: decode_timestamp(row, "registration_date")?,
        })
    }
}

impl Store {
    /// Inserts a new user and returns its identity
    ///
    /// # Errors
    ///
    /// - `AlreadyPersisted` if the user already has an identity
    /// - `Database` if the row is rejected
    pub async fn insert_user(&self, user: &User) -> Result<UserId, StoreError> {
        if let Some(id) = user.id() {
            return Err(StoreError::AlreadyPersisted {
                table: Table::Users.name(),
                id: id.get(),
            });
        }

        let id: UserId = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, email, role, registration_date)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(user.username())
        .bind(user.email())
        .bind(user.role().as_str())
        .bind(timestamp::format(&user.registration_date()))
        .fetch_one(self.pool())
        .await?;

        debug!(user_id = %id, "Inserted user");
        Ok(id)
    }

    /// Finds a user by ID
    pub async fn get_user_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, username, email, role, registration_date
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(record)
    }

    /// Lists all users by ascending ID
    pub async fn get_all_users(&self) -> Result<Vec<UserRecord>, StoreError> {
        let records = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, username, email, role, registration_date
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        Ok(records)
    }

    /// Updates columns of a user row
    ///
    /// Allowed: username, email, role, registration_date.
    pub async fn update_user(&self, id: UserId, fields: &UpdateFields) -> Result<u64, StoreError> {
        self.update_row(Table::Users, id.get(), fields).await
    }

    /// Deletes a user
    ///
    /// Tasks assigned to the user keep existing with `assignee_id` cleared.
    pub async fn delete_user(&self, id: UserId) -> Result<u64, StoreError> {
        self.delete_row(Table::Users, id.get()).await
    }
}

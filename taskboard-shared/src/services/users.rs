//! User operations

use tracing::info;

use crate::db::fields::UpdateFields;
use crate::db::store::Store;
use crate::error::StoreError;
use crate::models::{Task, User, UserChanges, UserId};

/// User management on top of a [`Store`]
#[derive(Debug, Clone)]
pub struct UserService {
    store: Store,
}

impl UserService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Persists a new user and returns it with its identity attached
    pub async fn add_user(&self, mut user: User) -> Result<User, StoreError> {
        let id = self.store.insert_user(&user).await?;
        user.assign_id(id);

        info!(user_id = %id, username = user.username(), role = %user.role(), "User created");
        Ok(user)
    }

    pub async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.store.get_user_by_id(id).await?.map(User::from))
    }

    pub async fn get_all_users(&self) -> Result<Vec<User>, StoreError> {
        let records = self.store.get_all_users().await?;
        Ok(records.into_iter().map(User::from).collect())
    }

    /// Raw column update, see [`Store::update_user`]
    pub async fn update_user(&self, id: UserId, fields: &UpdateFields) -> Result<u64, StoreError> {
        self.store.update_user(id, fields).await
    }

    /// Changes username, email and/or role of a stored user
    ///
    /// Returns `None` if the user does not exist. Invalid values fail before
    /// anything is written.
    pub async fn update_user_info(
        &self,
        id: UserId,
        username: Option<&str>,
        email: Option<&str>,
        role: Option<&str>,
    ) -> Result<Option<User>, StoreError> {
        let Some(mut user) = self.get_user(id).await? else {
            return Ok(None);
        };

        user.update_info(username, email, role)?;

        let changes = UserChanges {
            username: username.map(|_| user.username().to_string()),
            email: email.map(|_| user.email().to_string()),
            role: role.map(|_| user.role()),
            registration_date: None,
        };
        self.store.update_user(id, &changes.into_fields()?).await?;

        info!(user_id = %id, "User updated");
        Ok(Some(user))
    }

    /// Deletes a user, returning whether one was removed
    ///
    /// Their tasks stay, unassigned.
    pub async fn delete_user(&self, id: UserId) -> Result<bool, StoreError> {
        let deleted = self.store.delete_user(id).await? > 0;
        if deleted {
            info!(user_id = %id, "User deleted");
        }
        Ok(deleted)
    }

    /// Tasks assigned to the user, by ascending ID
    pub async fn get_user_tasks(&self, id: UserId) -> Result<Vec<Task>, StoreError> {
        let records = self.store.get_tasks_by_user(id).await?;
        Ok(records.into_iter().map(Task::from).collect())
    }
}

//! User model
//!
//! A user is a person tasks can be assigned to. Usernames are trimmed, emails
//! must have the `local@domain.tld` shape and roles come from a closed set.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE users (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     username TEXT NOT NULL,
//!     email TEXT NOT NULL,
//!     role TEXT NOT NULL CHECK(role IN ('admin','manager','developer')),
//!     registration_date TEXT NOT NULL
//! );
//! ```
//!
//! # Example
//!
//! ```
//! use taskboard_shared::models::user::{Role, User};
//!
//! let mut user = User::new("  alice ", "alice@example.com", "developer").unwrap();
//! assert_eq!(user.username(), "alice");
//! assert_eq!(user.role(), Role::Developer);
//!
//! user.update_info(None, None, Some("manager")).unwrap();
//! assert_eq!(user.role(), Role::Manager);
//! assert!(user.update_info(None, Some("not-an-email"), None).is_err());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

use super::id::UserId;
use crate::db::fields::{FieldValue, UpdateFields};
use crate::error::ValidationError;
use crate::timestamp;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Developer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::Developer];

    /// Converts role to its stored string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Developer => "developer",
        }
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "developer" => Ok(Role::Developer),
            _ => Err(ValidationError::InvalidRole(s.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Role> for FieldValue {
    fn from(role: Role) -> Self {
        FieldValue::Text(role.as_str().to_string())
    }
}

/// Checks the email shape: exactly one `@`, not first or last, no spaces,
/// and a `.` somewhere after the `@`
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidEmail(email.to_string());

    if email.contains(' ') || email.starts_with('@') || email.ends_with('@') {
        return Err(invalid());
    }

    match email.split_once('@') {
        Some((_, domain)) if !domain.contains('@') && domain.contains('.') => Ok(()),
        _ => Err(invalid()),
    }
}

/// Normalizes and validates an email, returning the trimmed form
fn normalize_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim();
    validate_email(email)?;
    Ok(email.to_string())
}

/// A validated user
///
/// The identity is absent until the store inserts the user.
#[derive(Debug, Clone)]
pub struct User {
    id: Option<UserId>,
    username: String,
    email: String,
    role: Role,
    registration_date: DateTime<Utc>,
}

impl User {
    /// Creates an unsaved user registered now
    ///
    /// # Errors
    ///
    /// - `InvalidEmail` if the email shape is wrong
    /// - `InvalidRole` if the role is not admin, manager or developer
    pub fn new(username: &str, email: &str, role: &str) -> Result<Self, ValidationError> {
        let email = normalize_email(email)?;
        let role = role.parse::<Role>()?;

        Ok(Self {
            id: None,
            username: username.trim().to_string(),
            email,
            role,
            registration_date: timestamp::now(),
        })
    }

    pub fn id(&self) -> Option<UserId> {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn registration_date(&self) -> DateTime<Utc> {
        self.registration_date
    }

    pub(crate) fn assign_id(&mut self, id: UserId) {
        self.id = Some(id);
    }

    /// Updates any of username, email and role
    ///
    /// All supplied values are validated before any of them is applied, so a
    /// failed call leaves the user unchanged.
    pub fn update_info(
        &mut self,
        username: Option<&str>,
        email: Option<&str>,
        role: Option<&str>,
    ) -> Result<(), ValidationError> {
        let email = email.map(normalize_email).transpose()?;
        let role = role.map(str::parse::<Role>).transpose()?;

        if let Some(username) = username {
            self.username = username.trim().to_string();
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(role) = role {
            self.role = role;
        }

        Ok(())
    }

    /// Field mapping with the registration date as ISO-8601 text
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("id".into(), json!(self.id));
        map.insert("username".into(), json!(self.username));
        map.insert("email".into(), json!(self.email));
        map.insert("role".into(), json!(self.role.as_str()));
        map.insert(
            "registration_date".into(),
            json!(timestamp::format(&self.registration_date)),
        );
        map
    }
}

/// Persisted users compare by identity; unsaved users compare by value and
/// never equal a persisted one
impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => {
                self.username == other.username
                    && self.email == other.email
                    && self.role == other.role
                    && self.registration_date == other.registration_date
            }
            _ => false,
        }
    }
}

impl Eq for User {}

impl PartialEq<UserId> for User {
    fn eq(&self, other: &UserId) -> bool {
        self.id == Some(*other)
    }
}

impl PartialEq<User> for UserId {
    fn eq(&self, other: &User) -> bool {
        other == self
    }
}

/// A row of the `users` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    #[serde(with = "crate::timestamp::iso")]
    pub registration_date: DateTime<Utc>,
}

/// Rebuilds a user from its stored row without re-running validation
impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: Some(record.id),
            username: record.username,
            email: record.email,
            role: record.role,
            registration_date: record.registration_date,
        }
    }
}

/// Typed partial update for a user row
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub registration_date: Option<DateTime<Utc>>,
}

impl UserChanges {
    /// Converts into store fields, validating the email if one is set
    pub fn into_fields(self) -> Result<UpdateFields, ValidationError> {
        let mut fields = UpdateFields::new();

        if let Some(username) = self.username {
            fields.insert("username", username.trim());
        }
        if let Some(email) = self.email {
            fields.insert("email", normalize_email(&email)?);
        }
        if let Some(role) = self.role {
            fields.insert("role", role);
        }
        if let Some(registration_date) = self.registration_date {
            fields.insert("registration_date", registration_date);
        }

        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_strings() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert_eq!(" admin ".parse::<Role>().unwrap(), Role::Admin);
        assert!("Admin".parse::<Role>().is_err());
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_valid_emails() {
        for email in ["a@b.c", "dev.team@example.co.uk", "x+tag@sub.domain.org"] {
            assert!(validate_email(email).is_ok(), "{email} should be accepted");
        }
    }

    #[test]
    fn test_invalid_emails() {
        let cases = [
            "plainaddress",
            "@example.com",
            "user@",
            "user@@example.com",
            "a@b@c.com",
            "user name@example.com",
            "user@example",
            "user.name@localhost",
            "",
        ];
        for email in cases {
            assert_eq!(
                validate_email(email),
                Err(ValidationError::InvalidEmail(email.to_string())),
                "{email:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_new_trims_and_stamps() {
        let before = timestamp::now();
        let user = User::new("  bob  ", " bob@example.com ", "manager").unwrap();
        assert_eq!(user.id(), None);
        assert_eq!(user.username(), "bob");
        assert_eq!(user.email(), "bob@example.com");
        assert_eq!(user.role(), Role::Manager);
        assert!(user.registration_date() >= before);
    }

    #[test]
    fn test_new_rejects_bad_role() {
        let err = User::new("bob", "bob@example.com", "intern").unwrap_err();
        assert_eq!(err, ValidationError::InvalidRole("intern".to_string()));
    }

    #[test]
    fn test_new_rejects_bad_email() {
        assert!(User::new("bob", "bob.example.com", "developer").is_err());
    }

    #[test]
    fn test_update_info_is_all_or_nothing() {
        let mut user = User::new("bob", "bob@example.com", "developer").unwrap();
        let err = user
            .update_info(Some("robert"), Some("broken@"), Some("admin"))
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidEmail(_)));
        assert_eq!(user.username(), "bob");
        assert_eq!(user.role(), Role::Developer);

        user.update_info(Some(" robert "), Some("rob@example.org"), None)
            .unwrap();
        assert_eq!(user.username(), "robert");
        assert_eq!(user.email(), "rob@example.org");
    }

    #[test]
    fn test_to_map_renders_iso_date_and_null_id() {
        let user = User::new("bob", "bob@example.com", "admin").unwrap();
        let map = user.to_map();
        assert_eq!(map["id"], Value::Null);
        assert_eq!(map["role"], "admin");
        let date = map["registration_date"].as_str().unwrap();
        assert_eq!(timestamp::parse(date).unwrap(), user.registration_date());
    }

    #[test]
    fn test_equality_by_identity() {
        let mut a = User::new("a", "a@x.io", "admin").unwrap();
        let mut b = User::new("b", "b@x.io", "developer").unwrap();
        a.assign_id(UserId(1));
        b.assign_id(UserId(1));
        assert_eq!(a, b);
        assert!(a == UserId(1));
        assert!(UserId(1) == a);
        assert!(a != UserId(2));
    }

    #[test]
    fn test_unsaved_users_never_match_saved_or_zero() {
        let unsaved = User::new("a", "a@x.io", "admin").unwrap();
        let mut saved = unsaved.clone();
        saved.assign_id(UserId(0));

        assert_ne!(unsaved, saved);
        assert!(unsaved != UserId(0));
        assert_eq!(unsaved, unsaved.clone());
    }

    #[test]
    fn test_changes_validate_email() {
        let changes = UserChanges {
            email: Some("nope".to_string()),
            ..Default::default()
        };
        assert!(changes.into_fields().is_err());

        let fields = UserChanges {
            username: Some(" carol ".to_string()),
            role: Some(Role::Admin),
            ..Default::default()
        }
        .into_fields()
        .unwrap();
        assert_eq!(fields.get("username"), Some(&FieldValue::Text("carol".into())));
        assert_eq!(fields.get("role"), Some(&FieldValue::Text("admin".into())));
    }

    #[test]
    fn test_record_serializes_iso_date() {
        let record = UserRecord {
            id: UserId(3),
            username: "dana".to_string(),
            email: "dana@example.com".to_string(),
            role: Role::Developer,
            registration_date: timestamp::parse("2024-05-06T07:08:09").unwrap(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["role"], "developer");
        assert_eq!(value["registration_date"], "2024-05-06T07:08:09");

        let user = User::from(record);
        assert_eq!(user.id(), Some(UserId(3)));
    }
}

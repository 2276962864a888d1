//! Column/value pairs for partial updates
//!
//! [`UpdateFields`] is the untyped update payload accepted by the store. It
//! preserves insertion order (so generated SQL is deterministic) and keeps
//! one value per column; setting a column twice keeps the last value.
//!
//! ```
//! use taskboard_shared::db::fields::{FieldValue, UpdateFields};
//!
//! let fields = UpdateFields::new()
//!     .set("title", "Ship it")
//!     .set("priority", 1)
//!     .set("project_id", None::<i64>);
//!
//! assert_eq!(fields.len(), 3);
//! assert_eq!(fields.get("project_id"), Some(&FieldValue::Null));
//! ```

use chrono::{DateTime, Utc};

/// A single value to write into a column
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// SQL NULL (clears a nullable reference)
    Null,

    /// Integer column value
    Integer(i64),

    /// Text column value; timestamp columns parse it as ISO-8601
    Text(String),

    /// Structured timestamp, rendered in storage format when bound
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<u8> for FieldValue {
    fn from(value: u8) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl<T> From<Option<T>> for FieldValue
where
    T: Into<FieldValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// Ordered column → value mapping for one `UPDATE`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateFields {
    entries: Vec<(String, FieldValue)>,
}

impl UpdateFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`UpdateFields::insert`]
    pub fn set(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Sets a column, replacing any earlier value for it
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        let field = field.into();
        let value = value.into();

        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((field, value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Column names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for UpdateFields
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = UpdateFields::new();
        for (field, value) in iter {
            fields.insert(field, value);
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_existing_column() {
        let fields = UpdateFields::new()
            .set("status", "pending")
            .set("title", "a")
            .set("status", "completed");

        assert_eq!(fields.len(), 2);
        assert_eq!(fields.names().collect::<Vec<_>>(), vec!["status", "title"]);
        assert_eq!(
            fields.get("status"),
            Some(&FieldValue::Text("completed".to_string()))
        );
    }

    #[test]
    fn test_option_maps_to_null() {
        assert_eq!(FieldValue::from(None::<i64>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(3i64)), FieldValue::Integer(3));
        assert!(FieldValue::Null.is_null());
    }

    #[test]
    fn test_collect_from_pairs() {
        let fields: UpdateFields = vec![("name", "x"), ("description", "y")]
            .into_iter()
            .collect();
        assert!(fields.contains("name"));
        assert!(!fields.contains("status"));
        assert!(!fields.is_empty());
    }
}

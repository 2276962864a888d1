//! Column decoders shared by the row mappers
//!
//! Enumerations and timestamps are stored as text. These helpers turn that
//! text back into domain types and report failures as `ColumnDecode` errors
//! naming the column.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::models::task::Priority;
use crate::timestamp;

fn column_error(column: &str, source: ValidationError) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(source),
    }
}

/// Reads a text column into a closed enumeration
pub(crate) fn decode_enum<T>(row: &SqliteRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = ValidationError>,
{
    let text: String = row.try_get(column)?;
    text.parse().map_err(|e| column_error(column, e))
}

/// Reads an ISO-8601 text column
pub(crate) fn decode_timestamp(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    let text: String = row.try_get(column)?;
    timestamp::parse(&text).map_err(|e| column_error(column, e))
}

/// Reads the integer priority column
pub(crate) fn decode_priority(row: &SqliteRow, column: &str) -> Result<Priority, sqlx::Error> {
    let value: i64 = row.try_get(column)?;
    Priority::new(value).map_err(|e| column_error(column, e))
}

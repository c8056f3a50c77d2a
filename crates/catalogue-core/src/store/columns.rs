//! Column encodings shared by every table.
//!
//! Timestamps are stored as RFC 3339 UTC text with millisecond precision so
//! that text order is chronological order. Lists are stored as JSON arrays.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::{Type, Value as SqlValue};
use rusqlite::Row;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// `ts` cut to the millisecond precision timestamps are stored with.
pub fn stored_precision(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(3)
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn timestamp_value(ts: &DateTime<Utc>) -> SqlValue {
    SqlValue::Text(format_timestamp(ts))
}

pub fn optional_timestamp_value(ts: &Option<DateTime<Utc>>) -> SqlValue {
    match ts {
        Some(ts) => timestamp_value(ts),
        None => SqlValue::Null,
    }
}

pub fn json_value<T: Serialize + ?Sized>(value: &T) -> Result<SqlValue> {
    Ok(SqlValue::Text(serde_json::to_string(value)?))
}

fn conversion_error(
    row: &Row<'_>,
    column: &str,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    match row.as_ref().column_index(column) {
        Ok(idx) => rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)),
        Err(e) => e,
    }
}

pub fn timestamp_column(row: &Row<'_>, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(column)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(row, column, e))
}

pub fn optional_timestamp_column(
    row: &Row<'_>,
    column: &str,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let text: Option<String> = row.get(column)?;
    text.map(|text| {
        DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| conversion_error(row, column, e))
    })
    .transpose()
}

pub fn json_column<T: DeserializeOwned>(row: &Row<'_>, column: &str) -> rusqlite::Result<T> {
    let text: String = row.get(column)?;
    serde_json::from_str(&text).map_err(|e| conversion_error(row, column, e))
}

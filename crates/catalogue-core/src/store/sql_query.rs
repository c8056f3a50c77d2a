use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;

use crate::error::Result;
use crate::filters::Window;
use crate::store::columns::format_timestamp;
use crate::text::{CONTAINS_CI, FTS_MATCH};

/// One listing condition over a single column.
///
/// A predicate whose value is zero, empty or absent is inactive and filters
/// nothing. Column names are always `&'static str` owned by a resource
/// definition; caller text only ever reaches a query as a bound parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Exact equality.
    Equals(&'static str, SqlValue),
    /// Case-insensitive substring containment.
    Contains(&'static str, String),
    /// Every word of the query appears in the column.
    Matches(&'static str, String),
    /// The column's tag set is a superset of these tags.
    HasTags(&'static str, Vec<String>),
    /// The column is at or after this instant.
    NotBefore(&'static str, Option<DateTime<Utc>>),
}

impl Predicate {
    pub fn equals_int(column: &'static str, value: i64) -> Self {
        Predicate::Equals(column, SqlValue::Integer(value))
    }

    pub fn equals_text(column: &'static str, value: impl Into<String>) -> Self {
        Predicate::Equals(column, SqlValue::Text(value.into()))
    }

    /// False when the value is the "do not filter" sentinel.
    pub fn is_active(&self) -> bool {
        match self {
            Predicate::Equals(_, SqlValue::Integer(0)) => false,
            Predicate::Equals(_, SqlValue::Text(text)) => !text.is_empty(),
            Predicate::Equals(_, SqlValue::Null) => false,
            Predicate::Equals(_, _) => true,
            Predicate::Contains(_, text) | Predicate::Matches(_, text) => !text.is_empty(),
            Predicate::HasTags(_, tags) => !tags.is_empty(),
            Predicate::NotBefore(_, instant) => instant.is_some(),
        }
    }
}

/// WHERE clause plus its bound parameters.
#[derive(Debug, Default)]
pub(crate) struct CompiledFilter {
    pub where_clause: String,
    pub params: Vec<SqlValue>,
}

/// Translate active predicates into a WHERE clause for `table`.
pub(crate) fn compile_filter(table: &str, predicates: &[Predicate]) -> Result<CompiledFilter> {
    let mut params = Vec::new();
    let mut conditions = Vec::new();

    for pred in predicates.iter().filter(|p| p.is_active()) {
        let sql = match pred {
            Predicate::Equals(col, value) => {
                params.push(value.clone());
                format!("{} = ?", col)
            }
            Predicate::Contains(col, text) => {
                params.push(SqlValue::Text(text.clone()));
                format!("{}({}, ?)", CONTAINS_CI, col)
            }
            Predicate::Matches(col, text) => {
                params.push(SqlValue::Text(text.clone()));
                format!("{}({}, ?)", FTS_MATCH, col)
            }
            Predicate::HasTags(col, tags) => {
                params.push(SqlValue::Text(serde_json::to_string(tags)?));
                format!(
                    "NOT EXISTS (SELECT 1 FROM json_each(?) AS wanted \
                     WHERE wanted.value NOT IN (SELECT value FROM json_each({}.{})))",
                    table, col
                )
            }
            Predicate::NotBefore(col, instant) => {
                let Some(instant) = instant else { continue };
                params.push(SqlValue::Text(format_timestamp(instant)));
                format!("{} >= ?", col)
            }
        };
        conditions.push(sql);
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    Ok(CompiledFilter {
        where_clause,
        params,
    })
}

fn key_condition(key_columns: &[&str]) -> String {
    key_columns
        .iter()
        .map(|col| format!("{} = ?", col))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Insert the writable fields, reading back identity, creation time and version.
pub(crate) fn insert_statement(table: &str, fields: &[&str], key_columns: &[&str]) -> String {
    let placeholders = vec!["?"; fields.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}, created_at, version",
        table,
        fields.join(", "),
        placeholders,
        key_columns.join(", ")
    )
}

pub(crate) fn select_statement(table: &str, columns: &[&str], key_columns: &[&str]) -> String {
    format!(
        "SELECT {} FROM {} WHERE {}",
        columns.join(", "),
        table,
        key_condition(key_columns)
    )
}

/// Version-guarded replace. Binds fields, then the key, then the expected version.
pub(crate) fn update_statement(table: &str, fields: &[&str], key_columns: &[&str]) -> String {
    let assignments: Vec<String> = fields.iter().map(|f| format!("{} = ?", f)).collect();
    format!(
        "UPDATE {} SET {}, version = version + 1 WHERE {} AND version = ? RETURNING version",
        table,
        assignments.join(", "),
        key_condition(key_columns)
    )
}

pub(crate) fn delete_statement(table: &str, key_columns: &[&str]) -> String {
    format!("DELETE FROM {} WHERE {}", table, key_condition(key_columns))
}

/// One page of rows with the windowed total of all matching rows.
///
/// Rows are ordered by the resolved sort column, then by the identity
/// columns ascending. Binds the filter parameters, then LIMIT and OFFSET.
pub(crate) fn list_statement(
    table: &str,
    columns: &[&str],
    key_columns: &[&str],
    where_clause: &str,
    window: &Window,
) -> String {
    let mut order = vec![format!(
        "{} {}",
        window.order.column(),
        window.order.direction().as_sql()
    )];
    order.extend(
        key_columns
            .iter()
            .filter(|col| **col != window.order.column())
            .map(|col| format!("{} ASC", col)),
    );

    let mut sql = format!(
        "SELECT count(*) OVER () AS total_records, {} FROM {}",
        columns.join(", "),
        table
    );
    if !where_clause.is_empty() {
        sql.push(' ');
        sql.push_str(where_clause);
    }
    sql.push_str(&format!(" ORDER BY {} LIMIT ? OFFSET ?", order.join(", ")));
    sql
}

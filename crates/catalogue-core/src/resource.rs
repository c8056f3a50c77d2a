//! The record shape the generic repository engine works over
//!
//! A [`Resource`] describes one table: its identity, its readable and
//! writable columns, the columns a listing may sort by and how a typed
//! filter turns into query predicates. Everything else (statement text,
//! version guarding, pagination) lives once in [`crate::store`].

use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::Predicate;
use crate::validator::Validator;

/// The identity of a stored record.
pub trait RecordKey: Clone + std::fmt::Debug + PartialEq + Send + Sync + 'static {
    /// Identity columns, in bind order.
    const COLUMNS: &'static [&'static str];

    /// False for identities no row can have. Such keys never reach storage.
    fn is_valid(&self) -> bool;

    /// Values for [`Self::COLUMNS`], in the same order.
    fn to_sql(&self) -> Vec<SqlValue>;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

impl RecordKey for i64 {
    const COLUMNS: &'static [&'static str] = &["id"];

    fn is_valid(&self) -> bool {
        *self >= 1
    }

    fn to_sql(&self) -> Vec<SqlValue> {
        vec![SqlValue::Integer(*self)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        row.get("id")
    }
}

/// Composite identity of a recipe-ingredient link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkKey {
    pub recipe_id: i64,
    pub ingredient_id: i64,
}

impl LinkKey {
    pub fn new(recipe_id: i64, ingredient_id: i64) -> Self {
        Self {
            recipe_id,
            ingredient_id,
        }
    }
}

impl RecordKey for LinkKey {
    const COLUMNS: &'static [&'static str] = &["recipe_id", "ingredient_id"];

    fn is_valid(&self) -> bool {
        self.recipe_id >= 1 && self.ingredient_id >= 1
    }

    fn to_sql(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Integer(self.recipe_id),
            SqlValue::Integer(self.ingredient_id),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(LinkKey {
            recipe_id: row.get("recipe_id")?,
            ingredient_id: row.get("ingredient_id")?,
        })
    }
}

/// One catalogued resource kind.
pub trait Resource: Clone + Send + Sync + 'static {
    type Key: RecordKey;

    /// Typed listing predicates. Zero or empty fields do not filter.
    type Filter: Send + Sync;

    /// Human-readable name, e.g. `"known item"`.
    const NAME: &'static str;

    const TABLE: &'static str;

    /// Every column [`Resource::from_row`] reads.
    const COLUMNS: &'static [&'static str];

    /// Columns written by insert and update, in the order of
    /// [`Resource::field_values`].
    const FIELDS: &'static [&'static str];

    /// Columns a listing may sort by. `-` selects descending order.
    const SORT_SAFELIST: &'static [&'static str];

    fn key(&self) -> Self::Key;

    fn version(&self) -> i64;

    fn set_version(&mut self, version: i64);

    /// Record the store-assigned identity, creation time and version.
    fn stamp(&mut self, key: Self::Key, created_at: DateTime<Utc>, version: i64);

    /// Round field values to the precision the store keeps, so a written
    /// record equals the one read back.
    fn normalize(&mut self) {}

    /// Values for [`Resource::FIELDS`].
    fn field_values(&self) -> Result<Vec<SqlValue>>;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn predicates(filter: &Self::Filter) -> Vec<Predicate>;

    /// Record every constraint this record violates.
    fn validate(&self, v: &mut Validator);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_validity() {
        assert!(!0i64.is_valid());
        assert!(!(-4i64).is_valid());
        assert!(1i64.is_valid());
        assert!(LinkKey::new(1, 1).is_valid());
        assert!(!LinkKey::new(1, 0).is_valid());
        assert!(!LinkKey::new(0, 3).is_valid());
    }

    #[test]
    fn test_link_key_bind_order() {
        assert_eq!(
            LinkKey::new(7, 9).to_sql(),
            vec![SqlValue::Integer(7), SqlValue::Integer(9)]
        );
    }
}

use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::resource::Resource;
use crate::store::columns::timestamp_column;
use crate::store::Predicate;
use crate::validator::{self, Validator};

/// A named tag scoped to an item type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub itemtype: i64,
    pub name: String,
    pub version: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagFilter {
    pub itemtype: i64,
    pub name: String,
}

impl Resource for Tag {
    type Key = i64;
    type Filter = TagFilter;

    const NAME: &'static str = "tag";
    const TABLE: &'static str = "tags";
    const COLUMNS: &'static [&'static str] = &["id", "created_at", "itemtype", "name", "version"];
    const FIELDS: &'static [&'static str] = &["itemtype", "name"];
    const SORT_SAFELIST: &'static [&'static str] = &["id", "itemtype", "name"];

    fn key(&self) -> i64 {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }

    fn stamp(&mut self, key: i64, created_at: DateTime<Utc>, version: i64) {
        self.id = key;
        self.created_at = created_at;
        self.version = version;
    }

    fn field_values(&self) -> Result<Vec<SqlValue>> {
        Ok(vec![self.itemtype.into(), self.name.clone().into()])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Tag {
            id: row.get("id")?,
            created_at: timestamp_column(row, "created_at")?,
            itemtype: row.get("itemtype")?,
            name: row.get("name")?,
            version: row.get("version")?,
        })
    }

    fn predicates(filter: &TagFilter) -> Vec<Predicate> {
        vec![
            Predicate::equals_int("itemtype", filter.itemtype),
            Predicate::equals_text("name", filter.name.clone()),
        ]
    }

    fn validate(&self, v: &mut Validator) {
        validator::code(v, "itemtype", self.itemtype);
        validator::required_text(v, "name", &self.name, 500);
    }
}

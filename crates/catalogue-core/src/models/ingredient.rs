use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::resource::Resource;
use crate::store::columns::{json_column, json_value, timestamp_column};
use crate::store::Predicate;
use crate::validator::{self, Validator};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub tags: Vec<String>,
    pub version: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngredientFilter {
    pub name: String,
    pub tags: Vec<String>,
}

impl Resource for Ingredient {
    type Key = i64;
    type Filter = IngredientFilter;

    const NAME: &'static str = "ingredient";
    const TABLE: &'static str = "ingredients";
    const COLUMNS: &'static [&'static str] = &["id", "created_at", "name", "tags", "version"];
    const FIELDS: &'static [&'static str] = &["name", "tags"];
    const SORT_SAFELIST: &'static [&'static str] = &["id", "name"];

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
        Ok(vec![self.name.clone().into(), json_value(&self.tags)?])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Ingredient {
            id: row.get("id")?,
            created_at: timestamp_column(row, "created_at")?,
            name: row.get("name")?,
            tags: json_column(row, "tags")?,
            version: row.get("version")?,
        })
    }

    fn predicates(filter: &IngredientFilter) -> Vec<Predicate> {
        vec![
            Predicate::equals_text("name", filter.name.clone()),
            Predicate::HasTags("tags", filter.tags.clone()),
        ]
    }

    fn validate(&self, v: &mut Validator) {
        validator::required_text(v, "name", &self.name, 500);
        validator::tag_set(v, "tags", &self.tags);
    }
}

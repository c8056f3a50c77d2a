use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::resource::Resource;
use crate::store::columns::{json_column, json_value, timestamp_column};
use crate::store::Predicate;
use crate::validator::{self, Validator};

/// Most steps a recipe may list.
pub const MAX_COOKING_STEPS: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub description: String,
    pub cooking_steps: Vec<String>,
    pub cook_time_minutes: i32,
    pub portions: i32,
    pub tags: Vec<String>,
    pub version: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeFilter {
    /// Full-text match
    pub name: String,
    pub cook_time_minutes: i32,
    pub portions: i32,
    pub tags: Vec<String>,
}

impl Resource for Recipe {
    type Key = i64;
    type Filter = RecipeFilter;

    const NAME: &'static str = "recipe";
    const TABLE: &'static str = "recipies";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "created_at",
        "name",
        "description",
        "cooking_steps",
        "cook_time_minutes",
        "portions",
        "tags",
        "version",
    ];
    const FIELDS: &'static [&'static str] = &[
        "name",
        "description",
        "cooking_steps",
        "cook_time_minutes",
        "portions",
        "tags",
    ];
    const SORT_SAFELIST: &'static [&'static str] =
        &["id", "name", "description", "cook_time_minutes", "portions"];

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
        Ok(vec![
            self.name.clone().into(),
            self.description.clone().into(),
            json_value(&self.cooking_steps)?,
            self.cook_time_minutes.into(),
            self.portions.into(),
            json_value(&self.tags)?,
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Recipe {
            id: row.get("id")?,
            created_at: timestamp_column(row, "created_at")?,
            name: row.get("name")?,
            description: row.get("description")?,
            cooking_steps: json_column(row, "cooking_steps")?,
            cook_time_minutes: row.get("cook_time_minutes")?,
            portions: row.get("portions")?,
            tags: json_column(row, "tags")?,
            version: row.get("version")?,
        })
    }

    fn predicates(filter: &RecipeFilter) -> Vec<Predicate> {
        vec![
            Predicate::Matches("name", filter.name.clone()),
            Predicate::equals_int("cook_time_minutes", filter.cook_time_minutes.into()),
            Predicate::equals_int("portions", filter.portions.into()),
            Predicate::HasTags("tags", filter.tags.clone()),
        ]
    }

    fn validate(&self, v: &mut Validator) {
        validator::required_text(v, "name", &self.name, 500);
        validator::required_text(v, "description", &self.description, 5000);
        v.check(
            self.cooking_steps.len() <= MAX_COOKING_STEPS,
            "cooking_steps",
            format!(
                "must not contain more than {} cooking steps",
                MAX_COOKING_STEPS
            ),
        );
        validator::positive(v, "cook_time_minutes", self.cook_time_minutes.into(), 10_000);
        validator::positive(v, "portions", self.portions.into(), 10_000);
        validator::tag_set(v, "tags", &self.tags);
    }
}

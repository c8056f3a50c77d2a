use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::resource::{LinkKey, Resource};
use crate::store::columns::timestamp_column;
use crate::store::Predicate;
use crate::validator::{Validator, MAX_CODE};

/// Largest amount of one ingredient in a recipe.
pub const MAX_AMOUNT: i32 = 100_000;

/// How much of an ingredient a recipe uses.
///
/// Identified by the `(recipe_id, ingredient_id)` pair rather than an id of
/// its own. Both halves of the key are ordinary writable fields, so an update
/// can move the link to a different pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub recipe_id: i64,
    pub ingredient_id: i64,
    pub created_at: DateTime<Utc>,
    pub amount: i32,
    pub measurement: i64,
    pub version: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeIngredientFilter {
    pub amount: i32,
    pub measurement: i64,
}

impl Resource for RecipeIngredient {
    type Key = LinkKey;
    type Filter = RecipeIngredientFilter;

    const NAME: &'static str = "recipe ingredient";
    const TABLE: &'static str = "recipe_ingredients";
    const COLUMNS: &'static [&'static str] = &[
        "recipe_id",
        "ingredient_id",
        "created_at",
        "amount",
        "measurement",
        "version",
    ];
    const FIELDS: &'static [&'static str] = &["recipe_id", "ingredient_id", "amount", "measurement"];
    const SORT_SAFELIST: &'static [&'static str] =
        &["recipe_id", "ingredient_id", "amount", "measurement"];

    fn key(&self) -> LinkKey {
        LinkKey::new(self.recipe_id, self.ingredient_id)
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }

    fn stamp(&mut self, key: LinkKey, created_at: DateTime<Utc>, version: i64) {
        self.recipe_id = key.recipe_id;
        self.ingredient_id = key.ingredient_id;
        self.created_at = created_at;
        self.version = version;
    }

    fn field_values(&self) -> Result<Vec<SqlValue>> {
        Ok(vec![
            self.recipe_id.into(),
            self.ingredient_id.into(),
            self.amount.into(),
            self.measurement.into(),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(RecipeIngredient {
            recipe_id: row.get("recipe_id")?,
            ingredient_id: row.get("ingredient_id")?,
            created_at: timestamp_column(row, "created_at")?,
            amount: row.get("amount")?,
            measurement: row.get("measurement")?,
            version: row.get("version")?,
        })
    }

    fn predicates(filter: &RecipeIngredientFilter) -> Vec<Predicate> {
        vec![
            Predicate::equals_int("amount", filter.amount.into()),
            Predicate::equals_int("measurement", filter.measurement),
        ]
    }

    fn validate(&self, v: &mut Validator) {
        v.check(self.recipe_id != 0, "recipe_id", "must be provided");
        v.check(self.recipe_id >= 1, "recipe_id", "must be at least 1");

        v.check(self.ingredient_id != 0, "ingredient_id", "must be provided");
        v.check(self.ingredient_id >= 1, "ingredient_id", "must be at least 1");

        v.check(self.amount != 0, "amount", "must be provided");
        v.check(self.amount >= 1, "amount", "must be at least 1");
        v.check(
            self.amount <= MAX_AMOUNT,
            "amount",
            format!("must not be larger than {}", MAX_AMOUNT),
        );

        v.check(self.measurement != 0, "measurement", "must be provided");
        v.check(self.measurement >= 1, "measurement", "must be at least 1");
        v.check(
            self.measurement <= MAX_CODE,
            "measurement",
            format!("must not be greater than {}", MAX_CODE),
        );
    }
}

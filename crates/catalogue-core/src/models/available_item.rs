use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::validate_item;
use crate::resource::Resource;
use crate::store::columns::{
    optional_timestamp_column, optional_timestamp_value, stored_precision, timestamp_column,
};
use crate::store::Predicate;
use crate::validator::Validator;

/// An item currently in stock.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailableItem {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_at: Option<DateTime<Utc>>,
    pub long_name: String,
    pub short_name: String,
    pub item_type: i64,
    pub measurement: i64,
    pub container_size: i32,
    pub version: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvailableItemFilter {
    /// Only items that are still good at this instant
    pub expiration_at: Option<DateTime<Utc>>,
    pub long_name: String,
    pub short_name: String,
    pub item_type: i64,
    pub measurement: i64,
    pub container_size: i32,
}

impl Resource for AvailableItem {
    type Key = i64;
    type Filter = AvailableItemFilter;

    const NAME: &'static str = "available item";
    const TABLE: &'static str = "availableitems";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "created_at",
        "expiration_at",
        "long_name",
        "short_name",
        "item_type",
        "measurement",
        "container_size",
        "version",
    ];
    const FIELDS: &'static [&'static str] = &[
        "expiration_at",
        "long_name",
        "short_name",
        "item_type",
        "measurement",
        "container_size",
    ];
    const SORT_SAFELIST: &'static [&'static str] = &[
        "id",
        "expiration_at",
        "long_name",
        "short_name",
        "item_type",
        "measurement",
        "container_size",
    ];

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

    fn normalize(&mut self) {
        self.expiration_at = self.expiration_at.map(stored_precision);
    }

    fn field_values(&self) -> Result<Vec<SqlValue>> {
        Ok(vec![
            optional_timestamp_value(&self.expiration_at),
            self.long_name.clone().into(),
            self.short_name.clone().into(),
            self.item_type.into(),
            self.measurement.into(),
            self.container_size.into(),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(AvailableItem {
            id: row.get("id")?,
            created_at: timestamp_column(row, "created_at")?,
            expiration_at: optional_timestamp_column(row, "expiration_at")?,
            long_name: row.get("long_name")?,
            short_name: row.get("short_name")?,
            item_type: row.get("item_type")?,
            measurement: row.get("measurement")?,
            container_size: row.get("container_size")?,
            version: row.get("version")?,
        })
    }

    fn predicates(filter: &AvailableItemFilter) -> Vec<Predicate> {
        vec![
            Predicate::NotBefore("expiration_at", filter.expiration_at),
            Predicate::Matches("long_name", filter.long_name.clone()),
            Predicate::Contains("short_name", filter.short_name.clone()),
            Predicate::equals_int("item_type", filter.item_type),
            Predicate::equals_int("measurement", filter.measurement),
            Predicate::equals_int("container_size", filter.container_size.into()),
        ]
    }

    fn validate(&self, v: &mut Validator) {
        validate_item(
            v,
            &self.long_name,
            &self.short_name,
            self.item_type,
            self.measurement,
            self.container_size,
        );
    }
}

use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::validate_item;
use crate::resource::Resource;
use crate::store::columns::{json_column, json_value, timestamp_column};
use crate::store::Predicate;
use crate::validator::{self, Validator};

/// A product definition: what an item is, independent of stock.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnownItem {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub serial_number: i64,
    pub long_name: String,
    pub short_name: String,
    pub tags: Vec<String>,
    pub item_type: i64,
    pub measurement: i64,
    pub container_size: i32,
    pub version: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnownItemFilter {
    pub serial_number: i64,
    /// Full-text match
    pub long_name: String,
    /// Case-insensitive substring
    pub short_name: String,
    /// Items must carry all of these
    pub tags: Vec<String>,
    pub item_type: i64,
    pub measurement: i64,
    pub container_size: i32,
}

impl Resource for KnownItem {
    type Key = i64;
    type Filter = KnownItemFilter;

    const NAME: &'static str = "known item";
    const TABLE: &'static str = "knownitems";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "created_at",
        "serial_number",
        "long_name",
        "short_name",
        "tags",
        "item_type",
        "measurement",
        "container_size",
        "version",
    ];
    const FIELDS: &'static [&'static str] = &[
        "serial_number",
        "long_name",
        "short_name",
        "tags",
        "item_type",
        "measurement",
        "container_size",
    ];
    const SORT_SAFELIST: &'static [&'static str] = &[
        "id",
        "serial_number",
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

    fn field_values(&self) -> Result<Vec<SqlValue>> {
        Ok(vec![
            self.serial_number.into(),
            self.long_name.clone().into(),
            self.short_name.clone().into(),
            json_value(&self.tags)?,
            self.item_type.into(),
            self.measurement.into(),
            self.container_size.into(),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(KnownItem {
            id: row.get("id")?,
            created_at: timestamp_column(row, "created_at")?,
            serial_number: row.get("serial_number")?,
            long_name: row.get("long_name")?,
            short_name: row.get("short_name")?,
            tags: json_column(row, "tags")?,
            item_type: row.get("item_type")?,
            measurement: row.get("measurement")?,
            container_size: row.get("container_size")?,
            version: row.get("version")?,
        })
    }

    fn predicates(filter: &KnownItemFilter) -> Vec<Predicate> {
        vec![
            Predicate::equals_int("serial_number", filter.serial_number),
            Predicate::Matches("long_name", filter.long_name.clone()),
            Predicate::Contains("short_name", filter.short_name.clone()),
            Predicate::HasTags("tags", filter.tags.clone()),
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
        validator::tag_set(v, "tags", &self.tags);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lettuce() -> KnownItem {
        KnownItem {
            long_name: "Iceberg Lettuce".into(),
            short_name: "Lettuce".into(),
            item_type: 1,
            measurement: 2,
            container_size: 440,
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_item() {
        let mut v = Validator::new();
        lettuce().validate(&mut v);
        assert!(v.valid());
    }

    #[test]
    fn test_invalid_item_reports_every_field() {
        let item = KnownItem {
            short_name: "x".repeat(101),
            container_size: -1,
            tags: vec!["fresh".into(), "fresh".into()],
            ..lettuce()
        };
        let item = KnownItem {
            long_name: String::new(),
            item_type: 0,
            measurement: 7,
            ..item
        };
        let mut v = Validator::new();
        item.validate(&mut v);
        let errors = v.finish().unwrap_err();

        assert_eq!(errors.get("long_name"), Some("must be provided"));
        assert_eq!(errors.get("short_name"), Some("must not be more than 100 bytes long"));
        assert_eq!(errors.get("item_type"), Some("must be provided"));
        assert_eq!(errors.get("measurement"), Some("must not be greater than 6"));
        assert_eq!(errors.get("container_size"), Some("must be at least 0"));
        assert_eq!(errors.get("tags"), Some("must not contain duplicate values"));
    }

    #[test]
    fn test_empty_filter_is_inactive() {
        let predicates = KnownItem::predicates(&KnownItemFilter::default());
        assert_eq!(predicates.len(), 7);
        assert!(predicates.iter().all(|p| !p.is_active()));
    }
}

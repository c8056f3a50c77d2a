//! Query-string decoding for listings
//!
//! Values that fail to parse are recorded in the request's [`Validator`] and
//! replaced by their "do not filter" default, so every bad parameter is
//! reported in one response.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use catalogue_core::{Filters, Validator};

#[derive(Debug, Clone, Default)]
pub struct QueryParams(HashMap<String, String>);

impl From<HashMap<String, String>> for QueryParams {
    fn from(params: HashMap<String, String>) -> Self {
        QueryParams(params)
    }
}

impl QueryParams {
    /// The raw value, or an empty string.
    pub fn string(&self, key: &str) -> String {
        self.0.get(key).cloned().unwrap_or_default()
    }

    /// An integer, or `default` when absent.
    pub fn int<T: FromStr>(&self, key: &str, default: T, v: &mut Validator) -> T {
        match self.0.get(key).filter(|s| !s.is_empty()) {
            None => default,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                v.add_error(key, "must be an integer value");
                default
            }),
        }
    }

    /// A comma-separated list. Empty items are dropped.
    pub fn csv(&self, key: &str) -> Vec<String> {
        self.0
            .get(key)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// An RFC 3339 instant.
    pub fn timestamp(&self, key: &str, v: &mut Validator) -> Option<DateTime<Utc>> {
        let raw = self.0.get(key).filter(|s| !s.is_empty())?;
        match DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => Some(dt.with_timezone(&Utc)),
            Err(_) => {
                v.add_error(key, "must be an RFC 3339 timestamp");
                None
            }
        }
    }

    /// `page`, `page_size` and `sort`.
    pub fn filters(&self, default_sort: &str, default_page_size: i64, v: &mut Validator) -> Filters {
        let sort = match self.string("sort") {
            s if s.is_empty() => default_sort.to_string(),
            s => s,
        };
        Filters::new(
            self.int("page", 1, v),
            self.int("page_size", default_page_size, v),
            sort,
        )
    }
}

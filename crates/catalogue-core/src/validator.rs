//! Field-level validation
//!
//! Checks are pure and run before any storage call. Failures accumulate into a
//! field → reason map so one round trip reports every problem at once. The first
//! failure recorded for a field wins.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Upper bound for item-type and measurement codes.
pub const MAX_CODE: i64 = 6;

/// Maximum number of entries in a tag set.
pub const MAX_TAGS: usize = 100;

/// Accumulated validation failures, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, reason)| format!("{}: {}", field, reason))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Collects field failures.
#[derive(Debug, Default)]
pub struct Validator {
    errors: BTreeMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no failure has been recorded.
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record a failure unless the field already has one.
    pub fn add_error(&mut self, field: &str, reason: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| reason.into());
    }

    /// Record `reason` against `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: &str, reason: impl Into<String>) {
        if !ok {
            self.add_error(field, reason);
        }
    }

    /// Consume the validator, yielding the accumulated failures if there are any.
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }

    /// Consume the validator, yielding whatever failures were recorded.
    pub fn into_errors(self) -> ValidationErrors {
        ValidationErrors(self.errors)
    }
}

/// True when every value in the slice is distinct.
pub fn unique<T: Eq + Hash>(values: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|v| seen.insert(v))
}

/// A required string bounded to `max_bytes`.
pub fn required_text(v: &mut Validator, field: &str, value: &str, max_bytes: usize) {
    v.check(!value.is_empty(), field, "must be provided");
    v.check(
        value.len() <= max_bytes,
        field,
        format!("must not be more than {} bytes long", max_bytes),
    );
}

/// A required small enumeration code in `1..=MAX_CODE`.
pub fn code(v: &mut Validator, field: &str, value: i64) {
    v.check(value != 0, field, "must be provided");
    v.check(value >= 1, field, "must be greater than 0");
    v.check(
        value <= MAX_CODE,
        field,
        format!("must not be greater than {}", MAX_CODE),
    );
}

/// A required positive integer bounded to `max`.
pub fn positive(v: &mut Validator, field: &str, value: i64, max: i64) {
    v.check(value != 0, field, "must be provided");
    v.check(value >= 1, field, "must be greater than 0");
    v.check(
        value <= max,
        field,
        format!("must not be greater than {}", max),
    );
}

/// A bounded, duplicate-free tag set.
pub fn tag_set(v: &mut Validator, field: &str, tags: &[String]) {
    v.check(
        tags.len() <= MAX_TAGS,
        field,
        format!("must not contain more than {} tags", MAX_TAGS),
    );
    v.check(unique(tags), field, "must not contain duplicate values");
}

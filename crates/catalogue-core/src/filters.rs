//! Listing controls: sort resolution, page bounds and pagination metadata.

use serde::{Deserialize, Serialize};

use crate::error::{CatalogueError, Result};
use crate::validator::Validator;

/// Highest page number a listing may request.
pub const MAX_PAGE: i64 = 10_000_000;

/// Largest page a listing may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Caller-requested sort, page and page size for a listing.
///
/// `sort` is a column token, optionally prefixed with `-` for descending order.
/// It only reaches a query after [`SortOrder::resolve`] has matched it against
/// the resource's safelist. An empty `sort` (the default) selects the first
/// safelisted column ascending, which is the resource's identity column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort: String::new(),
        }
    }
}

impl Filters {
    pub fn new(page: i64, page_size: i64, sort: impl Into<String>) -> Self {
        Self {
            page,
            page_size,
            sort: sort.into(),
        }
    }

    /// Record every bound or safelist violation in `v`.
    pub fn validate(&self, safelist: &'static [&'static str], v: &mut Validator) {
        self.validate_bounds(v);
        v.check(
            self.sort_order(safelist).is_some(),
            "sort",
            "invalid sort value",
        );
    }

    fn validate_bounds(&self, v: &mut Validator) {
        v.check(self.page > 0, "page", "must be greater than zero");
        v.check(self.page <= MAX_PAGE, "page", "must be a maximum of 10 million");
        v.check(self.page_size > 0, "page_size", "must be greater than zero");
        v.check(
            self.page_size <= MAX_PAGE_SIZE,
            "page_size",
            "must be a maximum of 100",
        );
    }

    fn sort_order(&self, safelist: &'static [&'static str]) -> Option<SortOrder> {
        if self.sort.is_empty() {
            return safelist.first().map(|&column| SortOrder {
                column,
                direction: Direction::Asc,
            });
        }
        SortOrder::resolve(&self.sort, safelist)
    }

    /// Validate against `safelist` and produce the window a query may use.
    pub fn resolve(&self, safelist: &'static [&'static str]) -> Result<Window> {
        let mut v = Validator::new();
        self.validate_bounds(&mut v);

        let Some(order) = self.sort_order(safelist) else {
            v.add_error("sort", "invalid sort value");
            return Err(CatalogueError::Validation(v.into_errors()));
        };
        v.finish()?;

        Ok(Window {
            order,
            page: self.page,
            page_size: self.page_size,
        })
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// A sort column proven to belong to a safelist.
///
/// The column is the safelist's own `&'static str`, never caller text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortOrder {
    column: &'static str,
    direction: Direction,
}

impl SortOrder {
    /// Match `token` (optionally `-`-prefixed) against `safelist`.
    pub fn resolve(token: &str, safelist: &'static [&'static str]) -> Option<Self> {
        let (name, direction) = match token.strip_prefix('-') {
            Some(rest) => (rest, Direction::Desc),
            None => (token, Direction::Asc),
        };
        safelist
            .iter()
            .find(|column| **column == name)
            .map(|&column| SortOrder { column, direction })
    }

    pub fn column(&self) -> &'static str {
        self.column
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

/// A validated listing window: resolved sort plus page bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub order: SortOrder,
    pub page: i64,
    pub page_size: i64,
}

impl Window {
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

/// Navigation data for one page of a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "is_zero")]
    pub current_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub page_size: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub first_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub last_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub total_records: i64,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

impl Metadata {
    /// Derive metadata from a total row count.
    ///
    /// Returns the all-zero value when `total_records` is zero. `page` and
    /// `page_size` must already be validated as positive.
    pub fn calculate(total_records: i64, page: i64, page_size: i64) -> Self {
        if total_records == 0 {
            return Metadata::default();
        }
        Metadata {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: (total_records + page_size - 1) / page_size,
            total_records,
        }
    }
}

/// One page of records with its navigation metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<R> {
    pub records: Vec<R>,
    pub metadata: Metadata,
}

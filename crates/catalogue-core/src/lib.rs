//! catalogue-core: household catalogue repositories
//!
//! A single generic [`Repository`] provides filtered, paginated listing and
//! version-checked updates for every catalogued resource kind:
//!
//! - **Filters**: sort tokens resolved against a per-resource safelist, bounded
//!   page and page size, and [`Metadata`] derived from a windowed row count
//! - **Validation**: field rules that accumulate into a field → reason map
//!   before any storage call
//! - **Store**: a pool of SQLite connections where every call runs under a
//!   deadline and is interrupted if its caller goes away
//! - **Models**: known items, available items, item types, measurements,
//!   ingredients, recipes, tags and recipe-ingredient links

pub mod catalogue;
pub mod config;
pub mod error;
pub mod filters;
pub mod models;
pub mod resource;
pub mod store;
pub mod text;
pub mod validator;

pub use catalogue::Catalogue;
pub use config::DatabaseConfig;
pub use error::{CatalogueError, Result};
pub use filters::{Direction, Filters, Metadata, Page, SortOrder, Window};
pub use models::{
    AvailableItem, AvailableItemFilter, Ingredient, IngredientFilter, ItemType, ItemTypeFilter,
    KnownItem, KnownItemFilter, Measurement, MeasurementFilter, Recipe, RecipeFilter,
    RecipeIngredient, RecipeIngredientFilter, Tag, TagFilter,
};
pub use resource::{LinkKey, RecordKey, Resource};
pub use store::{Database, Predicate, Repository};
pub use validator::{ValidationErrors, Validator};

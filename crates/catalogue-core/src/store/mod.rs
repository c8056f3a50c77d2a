//! SQLite persistence: the pooled storage handle, schema bootstrap and the
//! generic repository engine.

pub mod columns;
mod database;
mod repository;
mod schema;
mod sql_query;

pub use database::Database;
pub use repository::Repository;
pub use schema::{Schema, SCHEMA_VERSION};
pub use sql_query::Predicate;

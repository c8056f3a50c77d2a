//! Word matching for full-text predicates
//!
//! Documents and queries are lower-cased and split on anything that is not a
//! letter or digit. A document matches when it contains every query word.
//! This is registered with SQLite as the scalar function `fts_match`, next
//! to `contains_ci` for case-insensitive substring search. SQLite's own
//! `lower()` folds ASCII only, so both fold with Rust's Unicode case mapping.

use std::collections::HashSet;

use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::Connection;

/// Names of the SQL functions installed by [`register`].
pub const FTS_MATCH: &str = "fts_match";
pub const CONTAINS_CI: &str = "contains_ci";

/// Split text into lower-cased words.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}

/// True when every word of `query` appears in `document`.
///
/// A query with no words matches nothing.
pub fn matches(document: &str, query: &str) -> bool {
    let wanted: Vec<String> = tokenize(query).collect();
    if wanted.is_empty() {
        return false;
    }
    let words: HashSet<String> = tokenize(document).collect();
    wanted.iter().all(|word| words.contains(word))
}

/// True when `needle` occurs in `haystack`, ignoring case.
///
/// An empty needle matches everything.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Install `fts_match(document, query)` and `contains_ci(haystack, needle)`
/// on a connection.
pub fn register(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        CONTAINS_CI,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx: &Context<'_>| {
            let haystack: Option<String> = ctx.get(0)?;
            let needle: Option<String> = ctx.get(1)?;
            Ok(match (haystack, needle) {
                (Some(haystack), Some(needle)) => contains_ignore_case(&haystack, &needle),
                _ => false,
            })
        },
    )?;
    conn.create_scalar_function(
        FTS_MATCH,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx: &Context<'_>| {
            let document: Option<String> = ctx.get(0)?;
            let query: Option<String> = ctx.get(1)?;
            Ok(match (document, query) {
                (Some(document), Some(query)) => matches(&document, &query),
                _ => false,
            })
        },
    )
}

//! SQLite schema for the catalogue

use rusqlite::{Connection, OptionalExtension};

use crate::error::Result;

/// Schema version recorded in `schema_version`
pub const SCHEMA_VERSION: u32 = 1;

/// SQLite schema definition
pub struct Schema;

impl Schema {
    /// Get the complete schema SQL
    pub fn create_tables() -> &'static str {
        r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

-- Lookup tables
CREATE TABLE IF NOT EXISTS itemtypes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    name TEXT NOT NULL,
    version INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS measurements (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    name TEXT NOT NULL,
    version INTEGER NOT NULL DEFAULT 1
);

-- Item definitions
CREATE TABLE IF NOT EXISTS knownitems (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    serial_number INTEGER NOT NULL DEFAULT 0,
    long_name TEXT NOT NULL,
    short_name TEXT NOT NULL,
    tags TEXT NOT NULL DEFAULT '[]',
    item_type INTEGER NOT NULL REFERENCES itemtypes(id),
    measurement INTEGER NOT NULL REFERENCES measurements(id),
    container_size INTEGER NOT NULL DEFAULT 0,
    version INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX IF NOT EXISTS idx_knownitems_serial ON knownitems(serial_number);
CREATE INDEX IF NOT EXISTS idx_knownitems_item_type ON knownitems(item_type);

-- Items currently in stock
CREATE TABLE IF NOT EXISTS availableitems (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    expiration_at TEXT,
    long_name TEXT NOT NULL,
    short_name TEXT NOT NULL,
    item_type INTEGER NOT NULL REFERENCES itemtypes(id),
    measurement INTEGER NOT NULL REFERENCES measurements(id),
    container_size INTEGER NOT NULL DEFAULT 0,
    version INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX IF NOT EXISTS idx_availableitems_expiration ON availableitems(expiration_at);

CREATE TABLE IF NOT EXISTS ingredients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    name TEXT NOT NULL,
    tags TEXT NOT NULL DEFAULT '[]',
    version INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS recipies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    cooking_steps TEXT NOT NULL DEFAULT '[]',
    cook_time_minutes INTEGER NOT NULL,
    portions INTEGER NOT NULL,
    tags TEXT NOT NULL DEFAULT '[]',
    version INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    itemtype INTEGER NOT NULL REFERENCES itemtypes(id),
    name TEXT NOT NULL,
    version INTEGER NOT NULL DEFAULT 1
);

-- Recipe to ingredient links
CREATE TABLE IF NOT EXISTS recipe_ingredients (
    recipe_id INTEGER NOT NULL REFERENCES recipies(id) ON DELETE CASCADE,
    ingredient_id INTEGER NOT NULL REFERENCES ingredients(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    amount INTEGER NOT NULL,
    measurement INTEGER NOT NULL REFERENCES measurements(id),
    version INTEGER NOT NULL DEFAULT 1,
    PRIMARY KEY (recipe_id, ingredient_id)
);

CREATE INDEX IF NOT EXISTS idx_recipe_ingredients_ingredient ON recipe_ingredients(ingredient_id);
"#
    }

    /// Create missing tables and record the schema version once.
    pub fn initialize(conn: &Connection) -> Result<()> {
        conn.execute_batch(Self::create_tables())?;

        let current: Option<u32> = conn
            .query_row(
                "SELECT version FROM schema_version ORDER BY applied_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        if current.is_none() {
            conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                [SCHEMA_VERSION],
            )?;
        }
        Ok(())
    }
}

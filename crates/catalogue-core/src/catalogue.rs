//! The set of repositories a process shares.

use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::error::Result;
use crate::models::{
    AvailableItem, Ingredient, ItemType, KnownItem, Measurement, Recipe, RecipeIngredient, Tag,
};
use crate::store::{Database, Repository};

/// One repository per resource kind, all backed by the same [`Database`].
///
/// Built once at start-up and shared read-only across request handlers.
#[derive(Clone)]
pub struct Catalogue {
    pub known_items: Repository<KnownItem>,
    pub available_items: Repository<AvailableItem>,
    pub item_types: Repository<ItemType>,
    pub measurements: Repository<Measurement>,
    pub ingredients: Repository<Ingredient>,
    pub recipes: Repository<Recipe>,
    pub tags: Repository<Tag>,
    pub recipe_ingredients: Repository<RecipeIngredient>,
    db: Arc<Database>,
}

impl Catalogue {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            known_items: Repository::new(Arc::clone(&db)),
            available_items: Repository::new(Arc::clone(&db)),
            item_types: Repository::new(Arc::clone(&db)),
            measurements: Repository::new(Arc::clone(&db)),
            ingredients: Repository::new(Arc::clone(&db)),
            recipes: Repository::new(Arc::clone(&db)),
            tags: Repository::new(Arc::clone(&db)),
            recipe_ingredients: Repository::new(Arc::clone(&db)),
            db,
        }
    }

    /// Open the database described by `config` and build every repository over it.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(Database::open(config)?)))
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }
}

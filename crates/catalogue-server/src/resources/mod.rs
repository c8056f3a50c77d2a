//! HTTP bindings for each catalogued resource kind.

mod items;
mod lookups;
mod recipes;

pub use items::{AvailableItemPatch, KnownItemPatch};
pub use lookups::{ItemTypePatch, MeasurementPatch, TagPatch};
pub use recipes::{IngredientPatch, RecipeIngredientPatch, RecipePatch};

use serde::de::DeserializeOwned;
use serde::Serialize;

use catalogue_core::{Catalogue, LinkKey, RecordKey, Repository, Resource, Validator};

use crate::query::QueryParams;

/// How a resource is exposed under `/v1`.
pub trait RestResource: Resource + Serialize + Default {
    /// Path segment, permission prefix and list envelope key.
    const COLLECTION: &'static str;

    /// Envelope key for a single record.
    const ENVELOPE: &'static str;

    const DEFAULT_SORT: &'static str = "id";

    /// Body accepted by create and partial update.
    type Patch: DeserializeOwned + Send + 'static;

    fn apply_patch(&mut self, patch: Self::Patch);

    /// Build a new record from a create body.
    fn from_patch(patch: Self::Patch) -> Self {
        let mut record = Self::default();
        record.apply_patch(patch);
        record
    }

    fn filter_from_query(query: &QueryParams, v: &mut Validator) -> Self::Filter;

    fn repository(catalogue: &Catalogue) -> &Repository<Self>;
}

/// A record identity as it appears in an item path.
pub trait PathKey: RecordKey {
    /// Route suffix below the collection path.
    const ROUTE: &'static str;

    type Params: DeserializeOwned + Send + 'static;

    fn from_params(params: Self::Params) -> Self;

    /// The identity rendered back into a path, for `Location` headers.
    fn segment(&self) -> String;
}

impl PathKey for i64 {
    const ROUTE: &'static str = "/{id}";
    type Params = i64;

    fn from_params(id: i64) -> Self {
        id
    }

    fn segment(&self) -> String {
        self.to_string()
    }
}

impl PathKey for LinkKey {
    const ROUTE: &'static str = "/{recipe_id}/{ingredient_id}";
    type Params = (i64, i64);

    fn from_params((recipe_id, ingredient_id): (i64, i64)) -> Self {
        LinkKey::new(recipe_id, ingredient_id)
    }

    fn segment(&self) -> String {
        format!("{}/{}", self.recipe_id, self.ingredient_id)
    }
}

//! The eight catalogued resource kinds.

mod available_item;
mod ingredient;
mod item_type;
mod known_item;
mod measurement;
mod recipe;
mod recipe_ingredient;
mod tag;

pub use available_item::{AvailableItem, AvailableItemFilter};
pub use ingredient::{Ingredient, IngredientFilter};
pub use item_type::{ItemType, ItemTypeFilter};
pub use known_item::{KnownItem, KnownItemFilter};
pub use measurement::{Measurement, MeasurementFilter};
pub use recipe::{Recipe, RecipeFilter};
pub use recipe_ingredient::{RecipeIngredient, RecipeIngredientFilter};
pub use tag::{Tag, TagFilter};

use crate::validator::{self, Validator};

/// Largest container size, in measurement units.
pub const MAX_CONTAINER_SIZE: i32 = 100_000;

/// Rules shared by item definitions and stocked items.
fn validate_item(
    v: &mut Validator,
    long_name: &str,
    short_name: &str,
    item_type: i64,
    measurement: i64,
    container_size: i32,
) {
    validator::required_text(v, "long_name", long_name, 500);
    validator::required_text(v, "short_name", short_name, 100);
    validator::code(v, "item_type", item_type);
    validator::code(v, "measurement", measurement);
    v.check(container_size >= 0, "container_size", "must be at least 0");
    v.check(
        container_size <= MAX_CONTAINER_SIZE,
        "container_size",
        format!("must not be more than {} units", MAX_CONTAINER_SIZE),
    );
}

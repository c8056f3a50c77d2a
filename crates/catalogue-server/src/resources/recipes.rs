use serde::Deserialize;

use catalogue_core::{
    Catalogue, Ingredient, IngredientFilter, Recipe, RecipeFilter, RecipeIngredient,
    RecipeIngredientFilter, Repository, Validator,
};

use crate::patch::PatchField;
use crate::query::QueryParams;
use crate::resources::RestResource;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngredientPatch {
    pub name: PatchField<String>,
    pub tags: PatchField<Vec<String>>,
}

impl RestResource for Ingredient {
    const COLLECTION: &'static str = "ingredients";
    const ENVELOPE: &'static str = "ingredient";

    type Patch = IngredientPatch;

    fn apply_patch(&mut self, patch: IngredientPatch) {
        patch.name.apply_to(&mut self.name);
        patch.tags.apply_to(&mut self.tags);
    }

    fn filter_from_query(query: &QueryParams, _: &mut Validator) -> IngredientFilter {
        IngredientFilter {
            name: query.string("name"),
            tags: query.csv("tags"),
        }
    }

    fn repository(catalogue: &Catalogue) -> &Repository<Self> {
        &catalogue.ingredients
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecipePatch {
    pub name: PatchField<String>,
    pub description: PatchField<String>,
    pub cooking_steps: PatchField<Vec<String>>,
    pub cook_time_minutes: PatchField<i32>,
    pub portions: PatchField<i32>,
    pub tags: PatchField<Vec<String>>,
}

impl RestResource for Recipe {
    const COLLECTION: &'static str = "recipies";
    const ENVELOPE: &'static str = "recipe";

    type Patch = RecipePatch;

    fn apply_patch(&mut self, patch: RecipePatch) {
        patch.name.apply_to(&mut self.name);
        patch.description.apply_to(&mut self.description);
        patch.cooking_steps.apply_to(&mut self.cooking_steps);
        patch.cook_time_minutes.apply_to(&mut self.cook_time_minutes);
        patch.portions.apply_to(&mut self.portions);
        patch.tags.apply_to(&mut self.tags);
    }

    fn filter_from_query(query: &QueryParams, v: &mut Validator) -> RecipeFilter {
        RecipeFilter {
            name: query.string("name"),
            cook_time_minutes: query.int("cook_time_minutes", 0, v),
            portions: query.int("portions", 0, v),
            tags: query.csv("tags"),
        }
    }

    fn repository(catalogue: &Catalogue) -> &Repository<Self> {
        &catalogue.recipes
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecipeIngredientPatch {
    pub recipe_id: PatchField<i64>,
    pub ingredient_id: PatchField<i64>,
    pub amount: PatchField<i32>,
    pub measurement: PatchField<i64>,
}

impl RestResource for RecipeIngredient {
    const COLLECTION: &'static str = "recipeingredients";
    const ENVELOPE: &'static str = "recipeingredient";
    const DEFAULT_SORT: &'static str = "recipe_id";

    type Patch = RecipeIngredientPatch;

    fn apply_patch(&mut self, patch: RecipeIngredientPatch) {
        patch.recipe_id.apply_to(&mut self.recipe_id);
        patch.ingredient_id.apply_to(&mut self.ingredient_id);
        patch.amount.apply_to(&mut self.amount);
        patch.measurement.apply_to(&mut self.measurement);
    }

    fn filter_from_query(query: &QueryParams, v: &mut Validator) -> RecipeIngredientFilter {
        RecipeIngredientFilter {
            amount: query.int("amount", 0, v),
            measurement: query.int("measurement", 0, v),
        }
    }

    fn repository(catalogue: &Catalogue) -> &Repository<Self> {
        &catalogue.recipe_ingredients
    }
}

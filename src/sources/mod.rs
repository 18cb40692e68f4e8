/// Recipe source adapters
///
/// One adapter per origin of recipe data. Raw records are wrapped in a
/// closed `SourceRecord` enum and normalized into the common `Recipe`, so
/// nothing downstream sniffs payload shapes at runtime.

pub mod fixtures;
pub mod instructions;
pub mod local;
pub mod mealdb;
pub mod spoonacular;

pub use fixtures::{FixtureRecipe, Fixtures};
pub use local::LocalSource;
pub use mealdb::{MealDbClient, MealDbMeal};
pub use spoonacular::{SpoonacularClient, SpoonacularRecipe};

use crate::core::recipe::Recipe;
use crate::db::StoredRecipe;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const LOCAL_ID_LEN: usize = 24;

/// A source that degrades to "no results" instead of failing
///
/// Implementations log their own failures. Nothing here ever returns an
/// error to the caller.
#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// Search by free text
    async fn fetch(&self, query: &str) -> Vec<Recipe>;

    /// Look up one recipe by the id this source issued
    async fn lookup(&self, id: &str) -> Option<Recipe>;

    fn name(&self) -> &'static str;
}

/// The paid API. Its failures are visible so the aggregator can fall back.
#[async_trait]
pub trait PaidRecipeSource: Send + Sync {
    /// One pre-ranked page of results
    async fn search(&self, query: &str, offset: u32, number: u32) -> Result<PaidPage>;

    async fn information(&self, id: &str) -> Result<Recipe>;

    fn name(&self) -> &'static str;
}

/// A page as returned by the paid API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaidPage {
    pub results: Vec<Recipe>,
    pub offset: u32,
    pub total_results: u32,
}

/// A raw record tagged with the source that produced it
#[derive(Debug, Clone)]
pub enum SourceRecord {
    Local(StoredRecipe),
    FreeApi(MealDbMeal),
    PaidApi(SpoonacularRecipe),
    Synthetic(&'static FixtureRecipe),
}

impl SourceRecord {
    /// Map into the common shape, dropping records with a blank title
    pub fn normalize(self) -> Option<Recipe> {
        let recipe = match self {
            SourceRecord::Local(stored) => local::normalize(stored),
            SourceRecord::FreeApi(meal) => mealdb::normalize(meal),
            SourceRecord::PaidApi(recipe) => spoonacular::normalize(recipe),
            SourceRecord::Synthetic(fixture) => fixtures::normalize(fixture),
        };

        if recipe.title.is_empty() {
            debug!(id = %recipe.id, source = ?recipe.source, "Dropping untitled record");
            return None;
        }
        Some(recipe)
    }
}

/// Local store ids are 24 hex characters, unlike any external id
pub fn is_local_id(id: &str) -> bool {
    id.len() == LOCAL_ID_LEN && id.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::recipe::Provenance;

    #[test]
    fn test_is_local_id() {
        assert!(is_local_id("65a1f0c2e4b0a1b2c3d4e5f6"));
        assert!(is_local_id("65A1F0C2E4B0A1B2C3D4E5F6"));
        assert!(!is_local_id("101"));
        assert!(!is_local_id("52772"));
        assert!(!is_local_id("65a1f0c2e4b0a1b2c3d4e5fz"));
        assert!(!is_local_id("65a1f0c2e4b0a1b2c3d4e5f6a"));
    }

    #[test]
    fn test_every_variant_normalizes_to_the_same_shape() {
        let fixture = Fixtures::new().records().next().unwrap();
        let synthetic = fixture.normalize().unwrap();
        assert_eq!(synthetic.source, Provenance::Synthetic);

        let meal: MealDbMeal = serde_json::from_value(serde_json::json!({
            "idMeal": "52772",
            "strMeal": "Teriyaki Chicken Casserole",
            "strInstructions": "Preheat oven to 350. Mix everything together.",
            "strIngredient1": "soy sauce",
            "strMeasure1": "3/4 cup"
        }))
        .unwrap();
        let free = SourceRecord::FreeApi(meal).normalize().unwrap();
        assert_eq!(free.source, Provenance::FreeApi);

        for recipe in [synthetic, free] {
            assert!(!recipe.title.is_empty());
            assert!(recipe.ready_in_minutes > 0);
            assert!(recipe.servings > 0);
            assert!(!recipe.ingredients.is_empty());
        }
    }

    #[test]
    fn test_blank_titles_are_dropped_for_every_source() {
        let meal: MealDbMeal = serde_json::from_value(serde_json::json!({
            "idMeal": "9",
            "strMeal": "  "
        }))
        .unwrap();
        assert!(SourceRecord::FreeApi(meal).normalize().is_none());

        let paid = SpoonacularRecipe {
            id: 7,
            title: "   ".to_string(),
            ..Default::default()
        };
        assert!(SourceRecord::PaidApi(paid).normalize().is_none());
    }
}

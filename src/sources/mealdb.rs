// TheMealDB adapter - the free external source
//
// Meals come back with up to 20 numbered strIngredientN / strMeasureN
// fields and one narrative instruction blob, so both need reshaping.

use crate::core::recipe::{
    non_blank, Amount, Ingredient, Instructions, Provenance, Recipe, DEFAULT_READY_IN_MINUTES,
    DEFAULT_SERVINGS,
};
use crate::error::Result;
use crate::sources::instructions;
use crate::sources::{RecipeSource, SourceRecord};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

// TheMealDB never numbers ingredients past this
const MAX_INGREDIENTS: usize = 20;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MealDbMeal {
    #[serde(rename = "idMeal")]
    pub id_meal: String,
    #[serde(rename = "strMeal")]
    pub str_meal: String,
    #[serde(rename = "strMealThumb", default)]
    pub str_meal_thumb: Option<String>,
    #[serde(rename = "strInstructions", default)]
    pub str_instructions: Option<String>,
    // strIngredientN, strMeasureN and everything else we don't model
    #[serde(flatten)]
    pub fields: HashMap<String, serde_json::Value>,
}

impl MealDbMeal {
    fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_str())
    }

    /// Scan the indexed ingredient/measure pairs, skipping blank names
    pub fn ingredients(&self) -> Vec<Ingredient> {
        (1..=MAX_INGREDIENTS)
            .filter_map(|i| {
                let name = self.field(&format!("strIngredient{}", i))?.trim();
                if name.is_empty() {
                    return None;
                }
                let measure = self
                    .field(&format!("strMeasure{}", i))
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                Some(Ingredient::new(name, Amount::Text(measure), ""))
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct MealDbResponse {
    meals: Option<Vec<MealDbMeal>>,
}

/// Map a meal into the common shape
///
/// TheMealDB has no duration or servings, so those always take the defaults.
pub fn normalize(meal: MealDbMeal) -> Recipe {
    let ingredients = meal.ingredients();
    let instructions = match meal.str_instructions.as_deref() {
        Some(text) if !text.trim().is_empty() => instructions::to_steps(text),
        _ => Instructions::Steps(Vec::new()),
    };

    Recipe {
        id: meal.id_meal.trim().to_string(),
        title: meal.str_meal.trim().to_string(),
        image: non_blank(meal.str_meal_thumb),
        ready_in_minutes: DEFAULT_READY_IN_MINUTES,
        servings: DEFAULT_SERVINGS,
        ingredients,
        instructions,
        source: Provenance::FreeApi,
    }
}

pub struct MealDbClient {
    client: reqwest::Client,
    base_url: String,
}

impl MealDbClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get_meals(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Vec<MealDbMeal>> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response: MealDbResponse = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.meals.unwrap_or_default())
    }
}

fn to_recipes(meals: Vec<MealDbMeal>) -> Vec<Recipe> {
    meals
        .into_iter()
        .filter_map(|meal| SourceRecord::FreeApi(meal).normalize())
        .collect()
}

// lookup.php answers with a one-element list
fn first_recipe(meals: Vec<MealDbMeal>) -> Option<Recipe> {
    meals
        .into_iter()
        .next()
        .and_then(|meal| SourceRecord::FreeApi(meal).normalize())
}

#[async_trait]
impl RecipeSource for MealDbClient {
    async fn fetch(&self, query: &str) -> Vec<Recipe> {
        match self.get_meals("search.php", &[("s", query.trim())]).await {
            Ok(meals) => {
                debug!(count = meals.len(), query, "TheMealDB results");
                to_recipes(meals)
            }
            Err(e) => {
                warn!(error = %e, "TheMealDB search failed");
                Vec::new()
            }
        }
    }

    async fn lookup(&self, id: &str) -> Option<Recipe> {
        match self.get_meals("lookup.php", &[("i", id)]).await {
            Ok(meals) => first_recipe(meals),
            Err(e) => {
                warn!(error = %e, id, "TheMealDB lookup failed");
                None
            }
        }
    }

    fn name(&self) -> &'static str {
        "TheMealDB"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn teriyaki() -> MealDbMeal {
        serde_json::from_value(json!({
            "idMeal": "52772",
            "strMeal": "Teriyaki Chicken Casserole",
            "strMealThumb": "https://www.themealdb.com/images/media/meals/wvpsxx1468256321.jpg",
            "strInstructions": "Preheat oven to 350 F.\r\nCombine soy sauce, water and brown sugar. Pour over chicken.",
            "strIngredient1": "soy sauce",
            "strMeasure1": "3/4 cup",
            "strIngredient2": "water",
            "strMeasure2": "1/2 cup",
            "strIngredient3": "",
            "strMeasure3": " ",
            "strIngredient4": null,
            "strMeasure4": null,
            "strIngredient21": "ignored past the limit"
        }))
        .unwrap()
    }

    #[test]
    fn test_normalize_meal() {
        let recipe = normalize(teriyaki());

        assert_eq!(recipe.id, "52772");
        assert_eq!(recipe.title, "Teriyaki Chicken Casserole");
        assert_eq!(recipe.ready_in_minutes, DEFAULT_READY_IN_MINUTES);
        assert_eq!(recipe.servings, DEFAULT_SERVINGS);
        assert_eq!(recipe.source, Provenance::FreeApi);

        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.ingredients[0].name, "soy sauce");
        assert_eq!(recipe.ingredients[0].amount, Amount::Text("3/4 cup".to_string()));
        assert_eq!(recipe.ingredients[0].unit, "");
        assert_eq!(recipe.ingredients[0].original, "3/4 cup soy sauce");

        let Instructions::Steps(steps) = recipe.instructions else {
            panic!("Expected steps");
        };
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].text, "Preheat oven to 350 F");
        assert_eq!(steps[2].number, 3);
    }

    #[test]
    fn test_missing_optional_fields_get_defaults() {
        let meal: MealDbMeal = serde_json::from_value(json!({
            "idMeal": "1",
            "strMeal": "Mystery Stew",
        }))
        .unwrap();

        let recipe = normalize(meal);
        assert!(recipe.image.is_none());
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.instructions.is_empty());
        assert_eq!(recipe.servings, 2);
    }

    #[test]
    fn test_search_results_skip_untitled_meals() {
        let response: MealDbResponse = serde_json::from_value(json!({
            "meals": [
                { "idMeal": "9", "strMeal": " " },
                { "idMeal": "52772", "strMeal": "Teriyaki Chicken Casserole" }
            ]
        }))
        .unwrap();

        let recipes = to_recipes(response.meals.unwrap_or_default());
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].id, "52772");
    }

    #[test]
    fn test_lookup_of_untitled_meal_is_none() {
        let untitled: MealDbMeal = serde_json::from_value(json!({
            "idMeal": "9",
            "strMeal": ""
        }))
        .unwrap();

        assert!(first_recipe(vec![untitled]).is_none());
        assert!(first_recipe(Vec::new()).is_none());
        assert_eq!(first_recipe(vec![teriyaki()]).unwrap().id, "52772");
    }

    #[test]
    fn test_null_meals_payload() {
        let response: MealDbResponse = serde_json::from_value(json!({ "meals": null })).unwrap();
        assert!(response.meals.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_source_yields_nothing() {
        let client = MealDbClient::new(reqwest::Client::new(), "http://127.0.0.1:9/api/json/v1/1/");

        assert!(client.fetch("chicken").await.is_empty());
        assert!(client.lookup("52772").await.is_none());
    }
}

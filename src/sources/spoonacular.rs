// Spoonacular adapter - the paid external source
//
// Only used when an API key is configured. Results arrive pre-ranked and
// pre-paginated, and unlike the free source its failures are reported so
// the aggregator knows to fall back.

use crate::core::recipe::{
    minutes_or_default, non_blank, servings_or_default, Amount, Ingredient, Instructions,
    Provenance, Recipe,
};
use crate::error::{RecipeError, Result};
use crate::sources::instructions;
use crate::sources::{PaidPage, PaidRecipeSource, SourceRecord};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpoonacularRecipe {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub ready_in_minutes: Option<i64>,
    #[serde(default)]
    pub servings: Option<i64>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub analyzed_instructions: Vec<AnalyzedInstruction>,
    #[serde(default)]
    pub extended_ingredients: Vec<ExtendedIngredient>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzedInstruction {
    #[serde(default)]
    pub steps: Vec<AnalyzedStep>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzedStep {
    pub number: i64,
    pub step: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtendedIngredient {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub original: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComplexSearchResponse {
    #[serde(default)]
    results: Vec<SpoonacularRecipe>,
    #[serde(default)]
    offset: u32,
    #[serde(default)]
    total_results: u32,
}

/// Map a Spoonacular recipe into the common shape
///
/// Prefers the analyzed steps; falls back to the narrative text, split the
/// same way as the free source.
pub fn normalize(recipe: SpoonacularRecipe) -> Recipe {
    let analyzed: Vec<String> = recipe
        .analyzed_instructions
        .into_iter()
        .next()
        .map(|block| block.steps)
        .unwrap_or_default()
        .into_iter()
        .map(|step| step.step.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();

    let instructions = if !analyzed.is_empty() {
        // Renumber so steps stay contiguous even if the API skipped some
        Instructions::from_texts(analyzed)
    } else {
        match recipe.instructions.as_deref() {
            Some(text) if !text.trim().is_empty() => instructions::to_steps(text),
            _ => Instructions::Steps(Vec::new()),
        }
    };

    let ingredients = recipe
        .extended_ingredients
        .into_iter()
        .filter(|i| !i.name.trim().is_empty())
        .map(|i| {
            let amount = i.amount.map(Amount::Numeric).unwrap_or_default();
            let mut ingredient = Ingredient::new(i.name, amount, i.unit.unwrap_or_default());
            if let Some(original) = non_blank(i.original) {
                ingredient.original = original;
            }
            ingredient
        })
        .collect();

    Recipe {
        id: recipe.id.to_string(),
        title: recipe.title.trim().to_string(),
        image: non_blank(recipe.image),
        ready_in_minutes: minutes_or_default(recipe.ready_in_minutes),
        servings: servings_or_default(recipe.servings),
        ingredients,
        instructions,
        source: Provenance::PaidApi,
    }
}

fn to_page(response: ComplexSearchResponse) -> PaidPage {
    PaidPage {
        results: response
            .results
            .into_iter()
            .filter_map(|recipe| SourceRecord::PaidApi(recipe).normalize())
            .collect(),
        offset: response.offset,
        total_results: response.total_results,
    }
}

// An untitled record is as good as missing
fn to_information(id: &str, recipe: SpoonacularRecipe) -> Result<Recipe> {
    SourceRecord::PaidApi(recipe)
        .normalize()
        .ok_or_else(|| RecipeError::RecipeNotFound(id.to_string()))
}

pub struct SpoonacularClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SpoonacularClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl PaidRecipeSource for SpoonacularClient {
    async fn search(&self, query: &str, offset: u32, number: u32) -> Result<PaidPage> {
        let url = format!("{}/complexSearch", self.base_url);
        let offset_param = offset.to_string();
        let number_param = number.to_string();

        let response: ComplexSearchResponse = self
            .client
            .get(&url)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("query", query.trim()),
                ("number", number_param.as_str()),
                ("offset", offset_param.as_str()),
                ("addRecipeInformation", "true"),
                ("fillIngredients", "true"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!(
            count = response.results.len(),
            total = response.total_results,
            "Spoonacular results"
        );

        Ok(to_page(response))
    }

    async fn information(&self, id: &str) -> Result<Recipe> {
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
            return Err(RecipeError::RecipeNotFound(id.to_string()));
        }

        let url = format!("{}/{}/information", self.base_url, id);
        let recipe: SpoonacularRecipe = self
            .client
            .get(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        to_information(id, recipe)
    }

    fn name(&self) -> &'static str {
        "Spoonacular"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_with_analyzed_steps() {
        let recipe: SpoonacularRecipe = serde_json::from_value(json!({
            "id": 716429,
            "title": "Pasta with Garlic, Scallions, Cauliflower & Breadcrumbs",
            "image": "https://img.spoonacular.com/recipes/716429-312x231.jpg",
            "readyInMinutes": 45,
            "servings": 2,
            "analyzedInstructions": [{
                "name": "",
                "steps": [
                    { "number": 1, "step": "Bring a pot of water to a boil." },
                    { "number": 3, "step": "Toss the pasta with the sauce." }
                ]
            }],
            "extendedIngredients": [
                { "name": "cauliflower", "amount": 1.5, "unit": "cups", "original": "1.5 cups cauliflower florets" },
                { "name": "garlic", "amount": 5, "unit": "" }
            ]
        }))
        .unwrap();

        let normalized = normalize(recipe);
        assert_eq!(normalized.id, "716429");
        assert_eq!(normalized.ready_in_minutes, 45);
        assert_eq!(normalized.source, Provenance::PaidApi);

        let Instructions::Steps(steps) = &normalized.instructions else {
            panic!("Expected steps");
        };
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].number, 2);

        assert_eq!(normalized.ingredients[0].original, "1.5 cups cauliflower florets");
        assert_eq!(normalized.ingredients[1].amount, Amount::Numeric(5.0));
        assert_eq!(normalized.ingredients[1].original, "5 garlic");
    }

    #[test]
    fn test_normalize_falls_back_to_narrative_and_defaults() {
        let recipe: SpoonacularRecipe = serde_json::from_value(json!({
            "id": 1,
            "title": "Simple Rice",
            "instructions": "Rinse the rice. Simmer for 18 minutes."
        }))
        .unwrap();

        let normalized = normalize(recipe);
        assert_eq!(normalized.ready_in_minutes, 30);
        assert_eq!(normalized.servings, 2);
        let Instructions::Steps(steps) = normalized.instructions else {
            panic!("Expected steps");
        };
        assert_eq!(steps.len(), 2);
    }

    #[test]
    fn test_complex_search_payload() {
        let response: ComplexSearchResponse = serde_json::from_value(json!({
            "results": [{ "id": 1, "title": "Simple Rice" }],
            "offset": 20,
            "number": 20,
            "totalResults": 86
        }))
        .unwrap();

        assert_eq!(response.results.len(), 1);
        assert_eq!(response.offset, 20);
        assert_eq!(response.total_results, 86);
    }

    #[test]
    fn test_page_skips_untitled_recipes() {
        let response: ComplexSearchResponse = serde_json::from_value(json!({
            "results": [
                { "id": 7, "title": "   " },
                { "id": 1, "title": "Simple Rice" }
            ],
            "offset": 0,
            "totalResults": 2
        }))
        .unwrap();

        let page = to_page(response);
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].id, "1");
        assert_eq!(page.total_results, 2);
    }

    #[test]
    fn test_untitled_information_is_not_found() {
        let untitled = SpoonacularRecipe {
            id: 7,
            title: "   ".to_string(),
            ..Default::default()
        };

        match to_information("7", untitled) {
            Err(RecipeError::RecipeNotFound(id)) => assert_eq!(id, "7"),
            other => panic!("Expected RecipeNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_source_is_an_error() {
        let client = SpoonacularClient::new(reqwest::Client::new(), "http://127.0.0.1:9/recipes", "key");

        assert!(client.search("pasta", 0, 20).await.is_err());
        assert!(client.information("716429").await.is_err());
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_not_found() {
        let client = SpoonacularClient::new(reqwest::Client::new(), "http://127.0.0.1:9/recipes", "key");

        match client.information("abc").await {
            Err(RecipeError::RecipeNotFound(id)) => assert_eq!(id, "abc"),
            other => panic!("Expected RecipeNotFound, got {:?}", other),
        }
    }
}

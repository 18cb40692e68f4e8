/// Relevance scoring for interpreted searches
///
/// Plain lexical matching of an interpretation against the lowercase title
/// and ingredient names of each recipe.

use crate::core::recipe::Recipe;
use crate::intelligence::QueryInterpretation;

pub const CUISINE_WEIGHT: u32 = 5;
pub const DIET_WEIGHT: u32 = 3;
pub const KEYWORD_WEIGHT: u32 = 2;

/// Scorer for ranking recipes against an interpretation
pub struct RelevanceScorer;

impl RelevanceScorer {
    /// Score one recipe
    ///
    /// # Arguments
    /// * `recipe` - Candidate recipe
    /// * `interpretation` - What the user asked for
    ///
    /// # Returns
    /// * +5 for a cuisine match, +3 for a diet match, +2 per keyword match
    pub fn score(recipe: &Recipe, interpretation: &QueryInterpretation) -> u32 {
        let text = recipe.searchable_text();
        let contains = |needle: &str| {
            let needle = needle.trim().to_lowercase();
            !needle.is_empty() && text.contains(&needle)
        };

        let mut score = 0;
        if interpretation.cuisine.as_deref().is_some_and(contains) {
            score += CUISINE_WEIGHT;
        }
        if interpretation.diet.as_deref().is_some_and(contains) {
            score += DIET_WEIGHT;
        }
        score += interpretation
            .keywords
            .iter()
            .filter(|k| contains(k))
            .count() as u32
            * KEYWORD_WEIGHT;

        score
    }

    /// Sort recipes by descending score. Ties keep their input order.
    pub fn rank(recipes: Vec<Recipe>, interpretation: &QueryInterpretation) -> Vec<Recipe> {
        let mut scored: Vec<(u32, Recipe)> = recipes
            .into_iter()
            .map(|recipe| (Self::score(&recipe, interpretation), recipe))
            .collect();

        // sort_by is stable
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, recipe)| recipe).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::recipe::{Amount, Ingredient, Instructions, Provenance};

    fn recipe(id: &str, title: &str, ingredients: &[&str]) -> Recipe {
        Recipe {
            id: id.to_string(),
            title: title.to_string(),
            image: None,
            ready_in_minutes: 30,
            servings: 2,
            ingredients: ingredients
                .iter()
                .map(|name| Ingredient::new(*name, Amount::default(), ""))
                .collect(),
            instructions: Instructions::default(),
            source: Provenance::Synthetic,
        }
    }

    fn curry_interpretation() -> QueryInterpretation {
        QueryInterpretation {
            keywords: vec!["chicken".to_string(), "curry".to_string()],
            min_protein_grams: 30,
            ..Default::default()
        }
    }

    #[test]
    fn test_score_weights() {
        let interpretation = QueryInterpretation {
            keywords: vec!["paneer".to_string()],
            cuisine: Some("North Indian".to_string()),
            diet: Some("Vegetarian".to_string()),
            ..Default::default()
        };

        let full = recipe("1", "North Indian Vegetarian Paneer", &[]);
        assert_eq!(RelevanceScorer::score(&full, &interpretation), 10);

        let keyword_only = recipe("2", "Grilled Cheese", &["Paneer"]);
        assert_eq!(RelevanceScorer::score(&keyword_only, &interpretation), 2);

        let nothing = recipe("3", "Beef Tacos", &["Ground Beef"]);
        assert_eq!(RelevanceScorer::score(&nothing, &interpretation), 0);
    }

    #[test]
    fn test_matching_candidate_sorts_first() {
        let candidates = vec![
            recipe("1", "Berry Smoothie Bowl", &["Mixed Berries", "Yogurt"]),
            recipe("2", "Creamy Chicken Curry", &["Chicken", "Coconut Milk"]),
        ];

        let ranked = RelevanceScorer::rank(candidates, &curry_interpretation());
        assert_eq!(ranked[0].id, "2");
        assert_eq!(ranked[1].id, "1");
    }

    #[test]
    fn test_ties_keep_input_order() {
        let candidates = vec![
            recipe("a", "Tacos", &[]),
            recipe("b", "Chicken Soup", &[]),
            recipe("c", "Salad", &[]),
            recipe("d", "Chicken Wings", &[]),
        ];

        let ids: Vec<String> = RelevanceScorer::rank(candidates, &curry_interpretation())
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_blank_terms_never_match() {
        let interpretation = QueryInterpretation {
            keywords: vec!["  ".to_string()],
            cuisine: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(RelevanceScorer::score(&recipe("1", "Anything", &[]), &interpretation), 0);
    }
}

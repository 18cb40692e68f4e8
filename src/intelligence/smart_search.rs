/// AI-assisted search over the local store
///
/// Interprets the query, turns the interpretation into a structured store
/// query (time limit plus keyword match), then ranks what comes back.

use crate::core::recipe::Recipe;
use crate::db::Database;
use crate::error::{RecipeError, Result};
use crate::intelligence::{QueryInterpretation, QueryInterpreter, RelevanceScorer};
use crate::sources::SourceRecord;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

const SMART_SEARCH_LIMIT: i64 = 20;

#[derive(Debug, Clone, Serialize)]
pub struct SmartSearchResponse {
    pub interpretation: QueryInterpretation,
    pub results: Vec<Recipe>,
}

pub struct SmartSearch {
    db: Arc<Database>,
    interpreter: Option<Arc<dyn QueryInterpreter>>,
}

impl SmartSearch {
    pub fn new(db: Arc<Database>, interpreter: Option<Arc<dyn QueryInterpreter>>) -> Self {
        Self { db, interpreter }
    }

    /// Interpret, query, rank
    ///
    /// Unlike the aggregator this path has nothing to fall back to, so a
    /// missing interpreter or a failed interpretation is an error.
    pub async fn search(&self, query: &str) -> Result<SmartSearchResponse> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RecipeError::InvalidQuery("Query is required".to_string()));
        }

        let interpreter = self.interpreter.as_ref().ok_or_else(|| {
            RecipeError::InterpretationUnavailable("no interpreter configured".to_string())
        })?;
        let interpretation = interpreter.interpret(query).await.ok_or_else(|| {
            RecipeError::InterpretationUnavailable("the model gave no usable answer".to_string())
        })?;

        let rows = self
            .db
            .search_recipes_filtered(
                i64::from(interpretation.max_time_minutes),
                &interpretation.keywords,
                SMART_SEARCH_LIMIT,
            )
            .await?;
        let recipes: Vec<Recipe> = rows
            .into_iter()
            .filter_map(|row| SourceRecord::Local(row).normalize())
            .collect();

        info!(
            query,
            candidates = recipes.len(),
            mood = %interpretation.mood,
            "Smart search"
        );

        let results = RelevanceScorer::rank(recipes, &interpretation);
        Ok(SmartSearchResponse {
            interpretation,
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewRecipe, StoredIngredient};
    use async_trait::async_trait;

    struct FixedInterpreter(Option<QueryInterpretation>);

    #[async_trait]
    impl QueryInterpreter for FixedInterpreter {
        async fn interpret(&self, _query: &str) -> Option<QueryInterpretation> {
            self.0.clone()
        }
    }

    async fn setup(interpretation: Option<QueryInterpretation>) -> SmartSearch {
        let db = Arc::new(Database::new_test().await.unwrap());

        let recipes = [
            ("65a1f0c2e4b0a1b2c3d4e5f1", "Paneer Butter Masala", "Paneer", Some(40)),
            ("65a1f0c2e4b0a1b2c3d4e5f2", "North Indian Paneer Tikka", "Paneer", Some(25)),
            ("65a1f0c2e4b0a1b2c3d4e5f3", "Slow Roast Paneer", "Paneer", Some(240)),
            ("65a1f0c2e4b0a1b2c3d4e5f4", "Beef Stew", "Beef", None),
        ];
        for (id, title, ingredient, minutes) in recipes {
            db.insert_recipe(
                id,
                "alice",
                &NewRecipe {
                    title: title.to_string(),
                    ingredients: vec![StoredIngredient {
                        name: ingredient.to_string(),
                        ..Default::default()
                    }],
                    instructions: "Cook it well.".to_string(),
                    ready_in_minutes: minutes,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }

        let interpreter: Arc<dyn QueryInterpreter> = Arc::new(FixedInterpreter(interpretation));
        SmartSearch::new(db, Some(interpreter))
    }

    fn paneer() -> QueryInterpretation {
        QueryInterpretation {
            keywords: vec!["paneer".to_string()],
            cuisine: Some("North Indian".to_string()),
            max_time_minutes: 60,
            mood: "Cozy Winter Night".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_filters_by_time_and_keyword_then_ranks() {
        let search = setup(Some(paneer())).await;

        let response = search.search("quick north indian paneer").await.unwrap();
        let titles: Vec<&str> = response.results.iter().map(|r| r.title.as_str()).collect();

        // The 240 minute roast and the beef stew are filtered out
        assert_eq!(titles.len(), 2);
        assert_eq!(titles[0], "North Indian Paneer Tikka");
        assert_eq!(response.interpretation.mood, "Cozy Winter Night");
    }

    #[tokio::test]
    async fn test_no_keywords_only_limits_time() {
        let search = setup(Some(QueryInterpretation {
            max_time_minutes: 30,
            ..Default::default()
        }))
        .await;

        let response = search.search("something fast").await.unwrap();
        // Tikka at 25 and the stew with no time (counted as 30)
        assert_eq!(response.results.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_query_is_invalid() {
        let search = setup(Some(paneer())).await;

        assert!(matches!(
            search.search("   ").await,
            Err(RecipeError::InvalidQuery(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_interpretation_is_unavailable() {
        let search = setup(None).await;
        assert!(matches!(
            search.search("paneer").await,
            Err(RecipeError::InterpretationUnavailable(_))
        ));

        let db = Arc::new(Database::new_test().await.unwrap());
        let search = SmartSearch::new(db, None);
        assert!(matches!(
            search.search("paneer").await,
            Err(RecipeError::InterpretationUnavailable(_))
        ));
    }
}

/// Local store adapter
///
/// Wraps the SQLite recipe store as a recipe source. User-authored recipes
/// keep their narrative instructions as written.

use crate::core::recipe::{
    minutes_or_default, non_blank, servings_or_default, Amount, Ingredient, Instructions,
    Provenance, Recipe,
};
use crate::db::{Database, StoredRecipe};
use crate::sources::{is_local_id, RecipeSource, SourceRecord};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Cap on local matches merged into one search
const LOCAL_SEARCH_LIMIT: i64 = 50;

/// Map a stored recipe into the common shape
pub fn normalize(stored: StoredRecipe) -> Recipe {
    let ingredients = stored
        .get_ingredients()
        .into_iter()
        .filter(|i| !i.name.trim().is_empty())
        .map(|i| {
            let amount = i.amount.map(Amount::Numeric).unwrap_or_default();
            Ingredient::new(i.name, amount, i.unit.unwrap_or_default())
        })
        .collect();

    Recipe {
        id: stored.id,
        title: stored.title,
        image: non_blank(stored.image),
        ready_in_minutes: minutes_or_default(stored.ready_in_minutes),
        servings: servings_or_default(stored.servings),
        ingredients,
        instructions: Instructions::Narrative(stored.instructions),
        source: Provenance::Local,
    }
}

pub struct LocalSource {
    db: Arc<Database>,
}

impl LocalSource {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecipeSource for LocalSource {
    async fn fetch(&self, query: &str) -> Vec<Recipe> {
        match self.db.search_recipes(query, LOCAL_SEARCH_LIMIT).await {
            Ok(rows) => {
                debug!(count = rows.len(), query, "local store results");
                rows.into_iter()
                    .filter_map(|row| SourceRecord::Local(row).normalize())
                    .collect()
            }
            Err(e) => {
                warn!(error = %e, "local store search failed");
                Vec::new()
            }
        }
    }

    async fn lookup(&self, id: &str) -> Option<Recipe> {
        if !is_local_id(id) {
            return None;
        }

        match self.db.get_recipe(id).await {
            Ok(row) => row.and_then(|row| SourceRecord::Local(row).normalize()),
            Err(e) => {
                warn!(error = %e, id, "local store lookup failed");
                None
            }
        }
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

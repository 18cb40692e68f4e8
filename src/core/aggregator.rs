/// Multi-source search aggregation
///
/// Fans a query out to the configured sources, merges what comes back,
/// removes duplicate ids, tops thin results up with the built-in fixtures,
/// and ranks everything when the query could be interpreted.
///
/// Source order matters. The paid API, when configured and healthy, answers
/// alone with its own pagination. Otherwise the free API and the local store
/// are queried together on the first page only.

use crate::config::Config;
use crate::core::recipe::Recipe;
use crate::db::Database;
use crate::error::{RecipeError, Result};
use crate::intelligence::{GeminiInterpreter, QueryInterpretation, QueryInterpreter, RelevanceScorer};
use crate::sources::{
    is_local_id, Fixtures, LocalSource, MealDbClient, PaidPage, PaidRecipeSource, RecipeSource,
    SpoonacularClient,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Results requested from the paid API per page
pub const PAID_PAGE_SIZE: u32 = 20;

/// Below this many merged results, fixtures are mixed in
pub const MIN_RESULTS: usize = 5;

// Queries this short are too vague to interpret
const MIN_INTERPRET_CHARS: usize = 3;

const DEFAULT_INTERPRET_TIMEOUT: Duration = Duration::from_secs(15);

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub results: Vec<Recipe>,
    pub total_count: usize,
    pub offset: u32,
    /// The interpretation, when the query got one
    pub insight: Option<QueryInterpretation>,
}

pub struct Aggregator {
    free: Arc<dyn RecipeSource>,
    local: Arc<dyn RecipeSource>,
    paid: Option<Arc<dyn PaidRecipeSource>>,
    interpreter: Option<Arc<dyn QueryInterpreter>>,
    interpret_timeout: Duration,
    fixtures: Fixtures,
}

impl Aggregator {
    pub fn new(free: Arc<dyn RecipeSource>, local: Arc<dyn RecipeSource>) -> Self {
        Self {
            free,
            local,
            paid: None,
            interpreter: None,
            interpret_timeout: DEFAULT_INTERPRET_TIMEOUT,
            fixtures: Fixtures::new(),
        }
    }

    pub fn with_paid(mut self, paid: Arc<dyn PaidRecipeSource>) -> Self {
        self.paid = Some(paid);
        self
    }

    pub fn with_interpreter(mut self, interpreter: Arc<dyn QueryInterpreter>) -> Self {
        self.interpreter = Some(interpreter);
        self
    }

    pub fn with_interpret_timeout(mut self, timeout: Duration) -> Self {
        self.interpret_timeout = timeout;
        self
    }

    /// Wire up every source the config has credentials for
    pub fn from_config(config: &Config, db: Arc<Database>) -> Result<Self> {
        let client = config.http_client()?;

        let free = Arc::new(MealDbClient::new(client.clone(), &config.mealdb_base_url));
        let local = Arc::new(LocalSource::new(db));
        let mut aggregator =
            Self::new(free, local).with_interpret_timeout(config.http_timeout);

        if let Some(key) = &config.spoonacular_key {
            aggregator = aggregator.with_paid(Arc::new(SpoonacularClient::new(
                client.clone(),
                &config.spoonacular_base_url,
                key,
            )));
        }
        if let Some(interpreter) = GeminiInterpreter::from_config(config, client) {
            aggregator = aggregator.with_interpreter(Arc::new(interpreter));
        }

        info!(
            paid = aggregator.paid.is_some(),
            interpreter = aggregator.interpreter.is_some(),
            "Aggregator ready"
        );
        Ok(aggregator)
    }

    pub fn interpreter(&self) -> Option<Arc<dyn QueryInterpreter>> {
        self.interpreter.clone()
    }

    /// Search every applicable source
    ///
    /// Never fails. Sources that are down contribute nothing, and the
    /// fixtures guarantee a non-empty first page.
    ///
    /// # Arguments
    /// * `query` - Raw search text
    /// * `offset` - Pagination offset. Only the paid API pages past 0.
    pub async fn search(&self, query: &str, offset: u32) -> SearchPage {
        let query = query.trim();

        let (insight, paid_page) =
            tokio::join!(self.interpret(query, offset), self.search_paid(query, offset));

        // Paid results are already ranked and paginated
        if let Some(page) = paid_page {
            let results = dedup_by_id(page.results);
            return SearchPage {
                results,
                total_count: page.total_results as usize,
                offset: page.offset,
                insight,
            };
        }

        let mut results = Vec::new();
        if offset == 0 {
            let (free, local) = tokio::join!(self.free.fetch(query), self.local.fetch(query));
            debug!(free = free.len(), local = local.len(), query, "Merged sources");
            results.extend(free);
            results.extend(local);
        }

        let topped_up = results.len() < MIN_RESULTS;
        if topped_up {
            let fixtures = self.fixtures.matching(query);
            debug!(fixtures = fixtures.len(), "Topping up with fixtures");
            results.extend(fixtures);
        }

        let mut results = dedup_by_id(results);
        if let Some(interpretation) = &insight {
            results = RelevanceScorer::rank(results, interpretation);
        }

        SearchPage {
            total_count: results.len(),
            results,
            offset: if topped_up { 0 } else { offset },
            insight,
        }
    }

    /// Find one recipe by id, whatever source issued it
    ///
    /// Local ids go to the store first. Then fixtures, the free API and the
    /// paid API in that order.
    pub async fn find(&self, id: &str) -> Result<Recipe> {
        let id = id.trim();

        if is_local_id(id) {
            if let Some(recipe) = self.local.lookup(id).await {
                return Ok(recipe);
            }
        }
        if let Some(recipe) = self.fixtures.find(id) {
            return Ok(recipe);
        }
        if let Some(recipe) = self.free.lookup(id).await {
            return Ok(recipe);
        }
        if let Some(paid) = &self.paid {
            match paid.information(id).await {
                Ok(recipe) => return Ok(recipe),
                Err(e) => debug!(error = %e, id, "{} lookup failed", paid.name()),
            }
        }

        Err(RecipeError::RecipeNotFound(id.to_string()))
    }

    async fn interpret(&self, query: &str, offset: u32) -> Option<QueryInterpretation> {
        if offset != 0 || query.chars().count() <= MIN_INTERPRET_CHARS {
            return None;
        }
        let interpreter = self.interpreter.as_ref()?;

        match tokio::time::timeout(self.interpret_timeout, interpreter.interpret(query)).await {
            Ok(interpretation) => interpretation,
            Err(_) => {
                warn!(query, "Query interpretation timed out");
                None
            }
        }
    }

    async fn search_paid(&self, query: &str, offset: u32) -> Option<PaidPage> {
        let paid = self.paid.as_ref()?;

        match paid.search(query, offset, PAID_PAGE_SIZE).await {
            Ok(page) => Some(page),
            Err(e) => {
                warn!(error = %e, "{} failed, falling back", paid.name());
                None
            }
        }
    }
}

/// Remove duplicate ids
///
/// A later duplicate replaces the earlier value but keeps the earlier
/// position.
pub fn dedup_by_id(recipes: Vec<Recipe>) -> Vec<Recipe> {
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(recipes.len());
    let mut unique: Vec<Recipe> = Vec::with_capacity(recipes.len());

    for recipe in recipes {
        match positions.get(&recipe.id) {
            Some(&i) => unique[i] = recipe,
            None => {
                positions.insert(recipe.id.clone(), unique.len());
                unique.push(recipe);
            }
        }
    }

    unique
}

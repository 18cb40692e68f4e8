/// SQL query functions for database operations
///
/// Recipes, likes, favorites and reviews. Ownership rules live one layer up
/// in `core::social`; these functions just read and write rows.

use crate::db::models::*;
use crate::db::Database;
use crate::error::Result;
use sqlx::sqlite::SqliteArguments;
use sqlx::query::QueryAs;
use sqlx::Sqlite;

// Local recipes without a stored time count as this many minutes in filters
const UNSET_MINUTES: i64 = 30;

impl Database {
    /// Insert a freshly published recipe
    ///
    /// # Arguments
    /// * `id` - New 24-hex recipe id
    /// * `user_id` - Authoring identity
    /// * `input` - Validated recipe payload
    pub async fn insert_recipe(
        &self,
        id: &str,
        user_id: &str,
        input: &NewRecipe,
    ) -> Result<StoredRecipe> {
        let ingredients_json = serde_json::to_string(&input.ingredients)?;

        let recipe = sqlx::query_as::<_, StoredRecipe>(
            r#"
            INSERT INTO recipes (id, user_id, title, image, ingredients, instructions,
                                 ready_in_minutes, servings, calories, protein)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&input.title)
        .bind(&input.image)
        .bind(ingredients_json)
        .bind(&input.instructions)
        .bind(input.ready_in_minutes)
        .bind(input.servings)
        .bind(input.calories)
        .bind(&input.protein)
        .fetch_one(self.pool())
        .await?;

        Ok(recipe)
    }

    /// Get a local recipe by id
    pub async fn get_recipe(&self, id: &str) -> Result<Option<StoredRecipe>> {
        let recipe = sqlx::query_as::<_, StoredRecipe>("SELECT * FROM recipes WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(recipe)
    }

    /// Recipes authored by one user, newest first
    pub async fn get_recipes_by_user(&self, user_id: &str) -> Result<Vec<StoredRecipe>> {
        let recipes = sqlx::query_as::<_, StoredRecipe>(
            "SELECT * FROM recipes WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        Ok(recipes)
    }

    /// Newest recipes across all users
    pub async fn get_recent_recipes(&self, limit: i64) -> Result<Vec<StoredRecipe>> {
        let recipes = sqlx::query_as::<_, StoredRecipe>(
            "SELECT * FROM recipes ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(recipes)
    }

    /// Free-text search over title, ingredients and instructions
    ///
    /// Any query term may match. Results are ranked by how many distinct
    /// terms matched, then newest first. An empty query lists the newest
    /// recipes.
    ///
    /// # Arguments
    /// * `query` - Raw search text
    /// * `limit` - Maximum results
    pub async fn search_recipes(&self, query: &str, limit: i64) -> Result<Vec<StoredRecipe>> {
        let terms = search_terms(query);
        if terms.is_empty() {
            return self.get_recent_recipes(limit).await;
        }

        let clause = vec![TEXT_MATCH_CLAUSE; terms.len()].join(" OR ");
        let sql = format!(
            "SELECT * FROM recipes WHERE {} ORDER BY created_at DESC, rowid DESC",
            clause
        );

        let mut statement = sqlx::query_as::<_, StoredRecipe>(&sql);
        for term in &terms {
            statement = bind_text_match(statement, term);
        }
        let candidates = statement.fetch_all(self.pool()).await?;

        let mut ranked: Vec<(usize, StoredRecipe)> = candidates
            .into_iter()
            .map(|recipe| (matched_terms(&recipe, &terms), recipe))
            .collect();

        // Stable, so equal matches keep newest-first order
        ranked.sort_by(|a, b| b.0.cmp(&a.0));
        ranked.truncate(limit.max(0) as usize);

        Ok(ranked.into_iter().map(|(_, recipe)| recipe).collect())
    }

    /// Structured search used by the AI-assisted path
    ///
    /// # Arguments
    /// * `max_minutes` - Upper bound on cooking time (unset times count as 30)
    /// * `keywords` - At least one must appear in the title, an ingredient name or the instructions
    /// * `limit` - Maximum results
    pub async fn search_recipes_filtered(
        &self,
        max_minutes: i64,
        keywords: &[String],
        limit: i64,
    ) -> Result<Vec<StoredRecipe>> {
        let keywords: Vec<&str> = keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .collect();

        let mut sql =
            "SELECT * FROM recipes WHERE COALESCE(ready_in_minutes, ?) <= ?".to_string();
        if !keywords.is_empty() {
            let clause = vec![TEXT_MATCH_CLAUSE; keywords.len()].join(" OR ");
            sql.push_str(&format!(" AND ({})", clause));
        }
        sql.push_str(" ORDER BY created_at DESC, rowid DESC LIMIT ?");

        let mut statement = sqlx::query_as::<_, StoredRecipe>(&sql)
            .bind(UNSET_MINUTES)
            .bind(max_minutes);
        for keyword in &keywords {
            statement = bind_text_match(statement, keyword);
        }
        let recipes = statement.bind(limit).fetch_all(self.pool()).await?;

        Ok(recipes)
    }

    /// Delete a recipe (likes cascade)
    pub async fn delete_recipe(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM recipes WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(())
    }

    /// Like the recipe, or unlike it if this user already liked it
    ///
    /// # Returns
    /// * `Ok(Vec<String>)` - Ids of every user who now likes the recipe
    pub async fn toggle_like(&self, recipe_id: &str, user_id: &str) -> Result<Vec<String>> {
        let removed = sqlx::query("DELETE FROM recipe_likes WHERE recipe_id = ? AND user_id = ?")
            .bind(recipe_id)
            .bind(user_id)
            .execute(self.pool())
            .await?;

        if removed.rows_affected() == 0 {
            sqlx::query("INSERT INTO recipe_likes (recipe_id, user_id) VALUES (?, ?)")
                .bind(recipe_id)
                .bind(user_id)
                .execute(self.pool())
                .await?;
        }

        self.get_likes(recipe_id).await
    }

    /// Users who like a recipe, in the order they liked it
    pub async fn get_likes(&self, recipe_id: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT user_id FROM recipe_likes WHERE recipe_id = ? ORDER BY created_at, rowid",
        )
        .bind(recipe_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(|(user_id,)| user_id).collect())
    }

    /// Add the favorite, or remove it if already saved
    ///
    /// # Returns
    /// * `Ok(Vec<Favorite>)` - The user's favorites after the change
    pub async fn toggle_favorite(&self, user_id: &str, stub: &FavoriteStub) -> Result<Vec<Favorite>> {
        let removed = sqlx::query("DELETE FROM favorites WHERE user_id = ? AND recipe_id = ?")
            .bind(user_id)
            .bind(&stub.recipe_id)
            .execute(self.pool())
            .await?;

        if removed.rows_affected() == 0 {
            sqlx::query(
                "INSERT INTO favorites (user_id, recipe_id, title, image, is_custom) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(user_id)
            .bind(&stub.recipe_id)
            .bind(&stub.title)
            .bind(&stub.image)
            .bind(stub.is_custom)
            .execute(self.pool())
            .await?;
        }

        self.get_favorites(user_id).await
    }

    /// A user's favorites in the order they were saved
    pub async fn get_favorites(&self, user_id: &str) -> Result<Vec<Favorite>> {
        let favorites = sqlx::query_as::<_, Favorite>(
            "SELECT * FROM favorites WHERE user_id = ? ORDER BY created_at, rowid",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        Ok(favorites)
    }

    /// Store a review
    pub async fn insert_review(&self, user_id: &str, input: &NewReview) -> Result<Review> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (user_id, recipe_id, rating, comment)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&input.recipe_id)
        .bind(input.rating)
        .bind(&input.comment)
        .fetch_one(self.pool())
        .await?;

        Ok(review)
    }

    /// The review a user left on a recipe, if any
    pub async fn find_review(&self, user_id: &str, recipe_id: &str) -> Result<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE user_id = ? AND recipe_id = ?",
        )
        .bind(user_id)
        .bind(recipe_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(review)
    }

    /// Reviews for a recipe, newest first
    pub async fn get_reviews(&self, recipe_id: &str) -> Result<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE recipe_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(recipe_id)
        .fetch_all(self.pool())
        .await?;

        Ok(reviews)
    }
}

// Ingredients are matched by name only, never by the JSON around them
const TEXT_MATCH_CLAUSE: &str = "(recipes.title LIKE ? ESCAPE '\\' \
     OR EXISTS (SELECT 1 FROM json_each(recipes.ingredients) \
                WHERE json_extract(json_each.value, '$.name') LIKE ? ESCAPE '\\') \
     OR recipes.instructions LIKE ? ESCAPE '\\')";

type RecipeQuery<'q> = QueryAs<'q, Sqlite, StoredRecipe, SqliteArguments<'q>>;

fn bind_text_match<'q>(statement: RecipeQuery<'q>, term: &str) -> RecipeQuery<'q> {
    let pattern = format!("%{}%", escape_like(term));
    statement
        .bind(pattern.clone())
        .bind(pattern.clone())
        .bind(pattern)
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Lowercased, deduplicated query words
fn search_terms(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for word in query.split_whitespace() {
        let word = word.to_lowercase();
        if !terms.contains(&word) {
            terms.push(word);
        }
    }
    terms
}

fn matched_terms(recipe: &StoredRecipe, terms: &[String]) -> usize {
    let names: Vec<String> = recipe
        .get_ingredients()
        .into_iter()
        .map(|ingredient| ingredient.name)
        .collect();
    let haystack = format!(
        "{} {} {}",
        recipe.title,
        names.join(" "),
        recipe.instructions
    )
    .to_lowercase();

    terms.iter().filter(|term| haystack.contains(term.as_str())).count()
}

// The social side: publishing recipes, likes, reviews, favorites
//
// Everything that changes data takes the caller's Session. Ownership is
// checked here, not in the store.

use crate::core::recipe::{
    Instructions, Provenance, Recipe, DEFAULT_READY_IN_MINUTES, DEFAULT_SERVINGS,
};
use crate::core::session::Session;
use crate::db::{Database, Favorite, FavoriteStub, NewRecipe, NewReview, Review};
use crate::error::{RecipeError, Result};
use crate::sources::{SourceRecord, LOCAL_ID_LEN};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

// Long enough for any real recipe name
const MAX_TITLE_LENGTH: usize = 200;

const MAX_COMMENT_LENGTH: usize = 2_000;

// Favorites saved without a title still need something to show
const UNTITLED: &str = "Untitled recipe";

pub struct SocialService {
    db: Arc<Database>,
}

impl SocialService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    // Checks the recipe, cleans it up, gives it an id, saves it.
    pub async fn publish(&self, session: &Session, input: NewRecipe) -> Result<Recipe> {
        let input = sanitize_recipe(input);
        validate_recipe(&input)?;

        let id = new_recipe_id();
        let stored = self.db.insert_recipe(&id, session.user_id(), &input).await?;
        info!(id = %stored.id, user = session.user_id(), "Recipe published");

        SourceRecord::Local(stored)
            .normalize()
            .ok_or_else(|| RecipeError::InvalidRecipe("title is required".to_string()))
    }

    /// The session user's own recipes, newest first
    pub async fn my_recipes(&self, session: &Session) -> Result<Vec<Recipe>> {
        let rows = self.db.get_recipes_by_user(session.user_id()).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| SourceRecord::Local(row).normalize())
            .collect())
    }

    pub async fn get_local(&self, id: &str) -> Result<Recipe> {
        self.db
            .get_recipe(id)
            .await?
            .and_then(|row| SourceRecord::Local(row).normalize())
            .ok_or_else(|| RecipeError::RecipeNotFound(id.to_string()))
    }

    /// Delete a recipe. Only its author may.
    pub async fn delete(&self, session: &Session, id: &str) -> Result<()> {
        let recipe = self
            .db
            .get_recipe(id)
            .await?
            .ok_or_else(|| RecipeError::RecipeNotFound(id.to_string()))?;

        if recipe.user_id != session.user_id() {
            return Err(RecipeError::NotAuthorized {
                user: session.user_id().to_string(),
                recipe: id.to_string(),
            });
        }

        self.db.delete_recipe(id).await?;
        info!(id, user = session.user_id(), "Recipe deleted");
        Ok(())
    }

    /// Like or unlike a local recipe
    ///
    /// # Returns
    /// * Ids of every user who likes it after the toggle
    pub async fn toggle_like(&self, session: &Session, id: &str) -> Result<Vec<String>> {
        if self.db.get_recipe(id).await?.is_none() {
            return Err(RecipeError::RecipeNotFound(id.to_string()));
        }

        self.db.toggle_like(id, session.user_id()).await
    }

    /// Review any recipe, from any source. One review per user and recipe.
    pub async fn add_review(
        &self,
        session: &Session,
        recipe_id: &str,
        rating: i64,
        comment: &str,
    ) -> Result<Review> {
        let recipe_id = recipe_id.trim();
        if recipe_id.is_empty() {
            return Err(RecipeError::InvalidReview("recipe id is required".to_string()));
        }
        if !(1..=5).contains(&rating) {
            return Err(RecipeError::InvalidReview(format!(
                "rating must be between 1 and 5, got {}",
                rating
            )));
        }
        let comment = comment.replace('\0', "").trim().to_string();
        if comment.is_empty() {
            return Err(RecipeError::InvalidReview("comment is required".to_string()));
        }
        if comment.chars().count() > MAX_COMMENT_LENGTH {
            return Err(RecipeError::InvalidReview(format!(
                "comment is longer than {} characters",
                MAX_COMMENT_LENGTH
            )));
        }

        if self
            .db
            .find_review(session.user_id(), recipe_id)
            .await?
            .is_some()
        {
            return Err(RecipeError::AlreadyReviewed(recipe_id.to_string()));
        }

        let review = self
            .db
            .insert_review(
                session.user_id(),
                &NewReview {
                    recipe_id: recipe_id.to_string(),
                    rating,
                    comment,
                },
            )
            .await?;

        info!(recipe_id, rating, user = session.user_id(), "Review added");
        Ok(review)
    }

    pub async fn reviews(&self, recipe_id: &str) -> Result<Vec<Review>> {
        self.db.get_reviews(recipe_id.trim()).await
    }

    /// Save or unsave a recipe from any source
    pub async fn toggle_favorite(&self, session: &Session, stub: &FavoriteStub) -> Result<Vec<Favorite>> {
        if stub.recipe_id.trim().is_empty() {
            return Err(RecipeError::InvalidRecipe("recipe id is required".to_string()));
        }

        self.db.toggle_favorite(session.user_id(), stub).await
    }

    /// The session user's favorites, shaped like any other recipe
    pub async fn favorites(&self, session: &Session) -> Result<Vec<Recipe>> {
        let favorites = self.db.get_favorites(session.user_id()).await?;
        Ok(favorites.into_iter().map(favorite_to_recipe).collect())
    }
}

/// Merge a favorite stub back into the common recipe shape
///
/// Stubs only carry id, title and image. The rest takes the usual defaults.
pub fn favorite_to_recipe(favorite: Favorite) -> Recipe {
    Recipe {
        id: favorite.recipe_id,
        title: favorite
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string()),
        image: favorite.image.filter(|url| !url.trim().is_empty()),
        ready_in_minutes: DEFAULT_READY_IN_MINUTES,
        servings: DEFAULT_SERVINGS,
        ingredients: Vec::new(),
        instructions: Instructions::default(),
        source: if favorite.is_custom {
            Provenance::Local
        } else {
            Provenance::FreeApi
        },
    }
}

fn new_recipe_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(LOCAL_ID_LEN);
    id
}

/// Sanitize user text
///
/// - Removes null bytes
/// - Trims whitespace
/// - Collapses runs of whitespace to one space
fn sanitize_line(text: &str) -> String {
    text.replace('\0', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn sanitize_recipe(mut input: NewRecipe) -> NewRecipe {
    input.title = sanitize_line(&input.title);
    // Keep line breaks, they separate steps
    input.instructions = input.instructions.replace('\0', "").trim().to_string();
    input.image = input
        .image
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty());
    for ingredient in &mut input.ingredients {
        ingredient.name = sanitize_line(&ingredient.name);
        ingredient.unit = ingredient
            .unit
            .take()
            .map(|unit| sanitize_line(&unit))
            .filter(|unit| !unit.is_empty());
    }
    input
}

fn validate_recipe(input: &NewRecipe) -> Result<()> {
    if input.title.is_empty() {
        return Err(RecipeError::InvalidRecipe("title is required".to_string()));
    }
    if input.title.chars().count() > MAX_TITLE_LENGTH {
        return Err(RecipeError::InvalidRecipe(format!(
            "title is longer than {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    if input.instructions.is_empty() {
        return Err(RecipeError::InvalidRecipe("instructions are required".to_string()));
    }
    if input.ingredients.iter().any(|i| i.name.is_empty()) {
        return Err(RecipeError::InvalidRecipe("every ingredient needs a name".to_string()));
    }
    if input.ready_in_minutes.is_some_and(|m| m <= 0) {
        return Err(RecipeError::InvalidRecipe("cooking time must be positive".to_string()));
    }
    if input.servings.is_some_and(|s| s <= 0) {
        return Err(RecipeError::InvalidRecipe("servings must be positive".to_string()));
    }
    if input.calories.is_some_and(|c| c < 0) {
        return Err(RecipeError::InvalidRecipe("calories can't be negative".to_string()));
    }

    Ok(())
}

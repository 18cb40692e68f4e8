/// Data models for database entities
///
/// All models map to database tables and use sqlx for type-safe queries.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Parse the `created_at` format SQLite writes (UTC, millisecond precision)
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%dT%H:%M:%S%.f").ok()
}

/// A user-authored recipe as stored locally
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredRecipe {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub image: Option<String>,
    pub ingredients: String, // JSON array of StoredIngredient
    pub instructions: String,
    pub ready_in_minutes: Option<i64>,
    pub servings: Option<i64>,
    pub calories: Option<i64>,
    pub protein: Option<String>,
    pub created_at: String, // ISO 8601 format from SQLite
}

impl StoredRecipe {
    /// Parse ingredients from JSON
    pub fn get_ingredients(&self) -> Vec<StoredIngredient> {
        serde_json::from_str(&self.ingredients).unwrap_or_default()
    }

    pub fn created(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.created_at)
    }
}

/// Ingredient as authored by a user; everything but the name is optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StoredIngredient {
    pub name: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

/// Input for publishing a new recipe
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewRecipe {
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<StoredIngredient>,
    pub instructions: String,
    #[serde(default)]
    pub ready_in_minutes: Option<i64>,
    #[serde(default)]
    pub servings: Option<i64>,
    #[serde(default)]
    pub calories: Option<i64>,
    #[serde(default)]
    pub protein: Option<String>,
}

/// A saved recipe stub. The recipe itself may live in any source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Favorite {
    pub user_id: String,
    pub recipe_id: String,
    pub title: Option<String>,
    pub image: Option<String>,
    pub is_custom: bool,
    pub created_at: String,
}

/// What a client sends to save a favorite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteStub {
    pub recipe_id: String,
    pub title: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub is_custom: bool,
}

/// A rating plus comment left on any recipe
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: i64,
    pub user_id: String,
    pub recipe_id: String,
    pub rating: i64,
    pub comment: String,
    pub created_at: String,
}

impl Review {
    pub fn created(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.created_at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReview {
    pub recipe_id: String,
    pub rating: i64,
    pub comment: String,
}

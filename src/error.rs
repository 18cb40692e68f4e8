/// Error types for recipe-finder
///
/// This module defines all possible errors that can occur in the application.
/// Uses thiserror for ergonomic error handling.

use thiserror::Error;

/// Main error type for recipe-finder operations
#[derive(Error, Debug)]
pub enum RecipeError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O errors (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport errors talking to an external recipe or AI service
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No source, fixtures included, knows this recipe id
    #[error("Recipe not found: {0}")]
    RecipeNotFound(String),

    /// Requesting identity does not own the resource
    #[error("User {user} is not authorized to modify recipe {recipe}")]
    NotAuthorized { user: String, recipe: String },

    /// Operation needs a logged-in user
    #[error("No user is logged in")]
    NotAuthenticated,

    /// The user already left a review for this recipe
    #[error("Recipe {0} already reviewed")]
    AlreadyReviewed(String),

    /// Recipe payload failed validation
    #[error("Invalid recipe: {0}")]
    InvalidRecipe(String),

    /// Review payload failed validation
    #[error("Invalid review: {0}")]
    InvalidReview(String),

    /// Query is empty or otherwise unusable
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// AI interpretation could not be produced
    #[error("Query interpretation unavailable: {0}")]
    InterpretationUnavailable(String),

    /// A single recipe source failed
    #[error("Source {source_name} unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for recipe-finder operations
pub type Result<T> = std::result::Result<T, RecipeError>;

/// Convert RecipeError to a user-friendly error message
impl RecipeError {
    pub fn user_message(&self) -> String {
        match self {
            RecipeError::Database(e) => {
                format!("Database error occurred. Please try again. Details: {}", e)
            }
            RecipeError::Io(e) => {
                format!("File system error. Check permissions. Details: {}", e)
            }
            RecipeError::Http(e) => {
                format!("Could not reach a recipe service. Details: {}", e)
            }
            RecipeError::Serialization(e) => {
                format!("Data format error: {}", e)
            }
            RecipeError::RecipeNotFound(id) => {
                format!("Recipe '{}' not found", id)
            }
            RecipeError::NotAuthorized { .. } => "User not authorized".to_string(),
            RecipeError::NotAuthenticated => "Please log in first".to_string(),
            RecipeError::AlreadyReviewed(_) => "You already reviewed this recipe".to_string(),
            RecipeError::InvalidRecipe(reason) => {
                format!("Invalid recipe data: {}", reason)
            }
            RecipeError::InvalidReview(reason) => {
                format!("Invalid review: {}", reason)
            }
            RecipeError::InvalidQuery(reason) => {
                format!("Invalid search: {}", reason)
            }
            RecipeError::InterpretationUnavailable(reason) => {
                format!("AI search unavailable: {}", reason)
            }
            RecipeError::SourceUnavailable {
                source_name,
                reason,
            } => {
                format!("{} is unavailable right now ({})", source_name, reason)
            }
            RecipeError::Config(msg) => {
                format!("Configuration issue: {}", msg)
            }
        }
    }
}

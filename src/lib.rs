/// recipe-finder library
///
/// Multi-source recipe search with AI-assisted ranking, plus the social
/// features around it: publishing, likes, reviews and favorites.

pub mod config;
pub mod core;
pub mod db;
pub mod error;
pub mod intelligence;
pub mod sources;

// Re-exports for convenience
pub use config::Config;
pub use core::{Aggregator, AppContext, Recipe, SearchPage, Session};
pub use db::Database;
pub use error::{RecipeError, Result};

/// Database module for recipe-finder
///
/// The local recipe store: user-authored recipes, likes, favorites and
/// reviews, kept in SQLite through sqlx.

pub mod connection;
pub mod models;
pub mod queries;

pub use connection::{Database, DatabaseStats};
pub use models::*;

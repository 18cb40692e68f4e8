/// Runtime configuration
///
/// Everything comes from environment variables. Missing values fall back to
/// defaults, and credentials that are blank or still hold the sample
/// placeholder count as "not configured".

use crate::error::{RecipeError, Result};
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_MEALDB_BASE_URL: &str = "https://www.themealdb.com/api/json/v1/1";
pub const DEFAULT_SPOONACULAR_BASE_URL: &str = "https://api.spoonacular.com/recipes";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

// Sample values shipped in .env templates. Treat them as unset.
const KEY_PLACEHOLDERS: &[&str] = &["your_api_key_here", "YOUR_GEMINI_API_KEY_HERE", "YOUR_API_KEY"];

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub mealdb_base_url: String,
    pub spoonacular_key: Option<String>,
    pub spoonacular_base_url: String,
    pub gemini_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub http_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        let db_path = match env::var("RECIPE_FINDER_DB") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path.trim()),
            _ => default_db_path()?,
        };

        Ok(Self {
            db_path,
            mealdb_base_url: try_load("MEALDB_BASE_URL", DEFAULT_MEALDB_BASE_URL.to_string()),
            spoonacular_key: load_secret("SPOONACULAR_API_KEY"),
            spoonacular_base_url: try_load(
                "SPOONACULAR_BASE_URL",
                DEFAULT_SPOONACULAR_BASE_URL.to_string(),
            ),
            gemini_key: load_secret("GEMINI_API_KEY"),
            gemini_model: try_load("GEMINI_MODEL", DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: try_load("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL.to_string()),
            http_timeout: Duration::from_secs(try_load(
                "RECIPE_FINDER_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )),
        })
    }

    /// Build the shared HTTP client every external source uses
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let client = reqwest::Client::builder()
            .timeout(self.http_timeout)
            .user_agent(concat!("recipe-finder/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(client)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("recipes.db"),
            mealdb_base_url: DEFAULT_MEALDB_BASE_URL.to_string(),
            spoonacular_key: None,
            spoonacular_base_url: DEFAULT_SPOONACULAR_BASE_URL.to_string(),
            gemini_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

fn default_db_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| RecipeError::Config("Could not determine home directory".to_string()))?;
    Ok(home.join(".recipe-finder").join("recipes.db"))
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Ok(raw) = env::var(key) else {
        info!("{key} not set, using default: {default}");
        return default;
    };

    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value: {e}, using default: {default}");
        default
    })
}

fn load_secret(key: &str) -> Option<String> {
    let value = env::var(key).ok().and_then(|raw| normalize_secret(&raw));
    if value.is_none() {
        info!("{key} not configured");
    }
    value
}

/// Strip quoting and reject blank or placeholder credentials
pub(crate) fn normalize_secret(raw: &str) -> Option<String> {
    let cleaned = raw.replace('"', "");
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || KEY_PLACEHOLDERS.contains(&cleaned) {
        return None;
    }

    Some(cleaned.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_secret() {
        assert_eq!(normalize_secret("\"abc123\""), Some("abc123".to_string()));
        assert_eq!(normalize_secret("  key  "), Some("key".to_string()));
        assert_eq!(normalize_secret(""), None);
        assert_eq!(normalize_secret("your_api_key_here"), None);
        assert_eq!(normalize_secret("YOUR_GEMINI_API_KEY_HERE"), None);
    }

    #[test]
    fn test_try_load_uses_default_when_unset() {
        let value: u64 = try_load("RECIPE_FINDER_TEST_UNSET_TIMEOUT", 15);
        assert_eq!(value, 15);
    }

    #[test]
    fn test_default_config_has_no_credentials() {
        let config = Config::default();
        assert!(config.spoonacular_key.is_none());
        assert!(config.gemini_key.is_none());
        assert_eq!(config.http_timeout, Duration::from_secs(15));
    }
}

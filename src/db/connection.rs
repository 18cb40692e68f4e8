// The recipe store's SQLite handle
//
// One pool per process, shared by the social service, the local source and
// smart search through `Arc<Database>`. Likes cascade with their recipe, so
// foreign keys are switched on for every connection.

use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

const MAX_CONNECTIONS: u32 = 5;

const SCHEMA: &str = include_str!("../../database/schema.sql");

#[derive(Clone)]
pub struct Database {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

impl Database {
    /// Open (or create) the recipe store at `db_path`
    ///
    /// Missing parent directories are created and the schema is applied, so
    /// a fresh path gives an empty, usable store.
    ///
    /// # Examples
    /// ```no_run
    /// use recipe_finder_lib::db::Database;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let db = Database::new("/tmp/recipe-finder/recipes.db").await?;
    /// println!("{} recipes", db.stats().await?.total_recipes);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
            .create_if_missing(true)
            .disable_statement_logging();

        let db = Self::open(options, MAX_CONNECTIONS, db_path).await?;
        info!(path = %db.db_path.display(), "Recipe store ready");
        Ok(db)
    }

    /// Empty in-memory store for tests
    ///
    /// Each in-memory connection is a separate database, hence one connection.
    #[cfg(test)]
    pub async fn new_test() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        Self::open(options, 1, PathBuf::from(":memory:")).await
    }

    async fn open(options: SqliteConnectOptions, max_connections: u32, db_path: PathBuf) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options.foreign_keys(true))
            .await?;

        let db = Self {
            pool: Arc::new(pool),
            db_path,
        };
        db.apply_schema().await?;
        Ok(db)
    }

    // Every statement is CREATE ... IF NOT EXISTS, so reopening is harmless
    async fn apply_schema(&self) -> Result<()> {
        let statements: Vec<&str> = SCHEMA
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        for statement in &statements {
            sqlx::query(statement).execute(self.pool()).await?;
        }
        debug!(statements = statements.len(), "Schema applied");

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Row counts, shown by the `status` command
    pub async fn stats(&self) -> Result<DatabaseStats> {
        let (total_recipes, total_likes, total_favorites, total_reviews): (i64, i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT (SELECT COUNT(*) FROM recipes),
                       (SELECT COUNT(*) FROM recipe_likes),
                       (SELECT COUNT(*) FROM favorites),
                       (SELECT COUNT(*) FROM reviews)
                "#,
            )
            .fetch_one(self.pool())
            .await?;

        Ok(DatabaseStats {
            total_recipes,
            total_likes,
            total_favorites,
            total_reviews,
            pool_size: self.pool.size(),
            idle_connections: self.pool.num_idle(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub total_recipes: i64,
    pub total_likes: i64,
    pub total_favorites: i64,
    pub total_reviews: i64,
    pub pool_size: u32,
    pub idle_connections: usize,
}

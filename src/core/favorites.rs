// Client-side view of the user's favorites
//
// Toggling is optimistic: the view flips right away, then the remote
// mutation runs. If that fails the view flips back and the user gets told.

use crate::core::session::Session;
use crate::core::social::SocialService;
use crate::db::{Favorite, FavoriteStub};
use crate::error::Result;
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::warn;

/// What to show the user after a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Saved,
    Removed,
    Failed,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::Saved => "Saved to Favorites",
            Notice::Removed => "Removed from Favorites",
            Notice::Failed => "Failed to update favorites",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Failed)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Default)]
pub struct FavoritesView {
    saved: Mutex<HashSet<String>>,
}

impl FavoritesView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_favorites(favorites: &[Favorite]) -> Self {
        let view = Self::new();
        view.adopt(favorites);
        view
    }

    pub fn is_saved(&self, recipe_id: &str) -> bool {
        self.saved().contains(recipe_id)
    }

    pub fn len(&self) -> usize {
        self.saved().len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved().is_empty()
    }

    /// Optimistically flip one recipe, then run the mutation
    ///
    /// # Arguments
    /// * `recipe_id` - The recipe being toggled
    /// * `mutation` - Remote toggle, resolving to the server's favorites
    ///
    /// # Returns
    /// * The notice for the user. On failure the view is back where it was.
    pub async fn toggle<Fut>(&self, recipe_id: &str, mutation: Fut) -> Notice
    where
        Fut: Future<Output = Result<Vec<Favorite>>>,
    {
        let was_saved = self.flip(recipe_id);

        match mutation.await {
            Ok(favorites) => {
                self.adopt(&favorites);
                if was_saved {
                    Notice::Removed
                } else {
                    Notice::Saved
                }
            }
            Err(e) => {
                warn!(error = %e, recipe_id, "Favorite toggle failed, reverting");
                self.set(recipe_id, was_saved);
                Notice::Failed
            }
        }
    }

    /// Toggle through the social service
    pub async fn toggle_via(
        &self,
        social: &SocialService,
        session: &Session,
        stub: &FavoriteStub,
    ) -> Notice {
        self.toggle(&stub.recipe_id, social.toggle_favorite(session, stub))
            .await
    }

    // Returns whether the recipe was saved before the flip
    fn flip(&self, recipe_id: &str) -> bool {
        let mut saved = self.saved();
        let was_saved = saved.remove(recipe_id);
        if !was_saved {
            saved.insert(recipe_id.to_string());
        }
        was_saved
    }

    fn set(&self, recipe_id: &str, is_saved: bool) {
        let mut saved = self.saved();
        if is_saved {
            saved.insert(recipe_id.to_string());
        } else {
            saved.remove(recipe_id);
        }
    }

    fn adopt(&self, favorites: &[Favorite]) {
        *self.saved() = favorites.iter().map(|f| f.recipe_id.clone()).collect();
    }

    fn saved(&self) -> MutexGuard<'_, HashSet<String>> {
        // A set of ids can't be left half-updated, so a poisoned lock is still usable
        self.saved.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::AppContext;
    use crate::db::Database;
    use crate::error::RecipeError;
    use std::sync::Arc;

    fn favorite(recipe_id: &str) -> Favorite {
        Favorite {
            user_id: "alice".to_string(),
            recipe_id: recipe_id.to_string(),
            title: None,
            image: None,
            is_custom: false,
            created_at: "2025-11-25T00:00:00.000".to_string(),
        }
    }

    #[tokio::test]
    async fn test_successful_toggle_adopts_server_list() {
        let view = FavoritesView::new();

        let notice = view
            .toggle("101", async { Ok(vec![favorite("101"), favorite("52772")]) })
            .await;

        assert_eq!(notice, Notice::Saved);
        assert_eq!(notice.to_string(), "Saved to Favorites");
        assert!(view.is_saved("101"));
        assert!(view.is_saved("52772"));
        assert_eq!(view.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_toggle_reverts() {
        let view = FavoritesView::from_favorites(&[favorite("101")]);

        let notice = view
            .toggle("101", async {
                // The optimistic flip is visible while the request is in flight
                assert!(!view.is_saved("101"));
                Err(RecipeError::NotAuthenticated)
            })
            .await;

        assert_eq!(notice, Notice::Failed);
        assert!(notice.is_error());
        assert_eq!(notice.message(), "Failed to update favorites");
        assert!(view.is_saved("101"));
    }

    #[tokio::test]
    async fn test_failed_add_reverts_to_unsaved() {
        let view = FavoritesView::new();

        let notice = view
            .toggle("52772", async {
                assert!(view.is_saved("52772"));
                Err(RecipeError::NotAuthenticated)
            })
            .await;

        assert_eq!(notice, Notice::Failed);
        assert!(view.is_empty());
    }

    #[tokio::test]
    async fn test_toggle_through_social_service() {
        let db = Arc::new(Database::new_test().await.unwrap());
        let social = SocialService::new(db);
        let mut ctx = AppContext::new();
        let session = ctx.login("alice").unwrap().clone();

        let view = FavoritesView::new();
        let stub = FavoriteStub {
            recipe_id: "101".to_string(),
            title: Some("Classic Spaghetti Carbonara".to_string()),
            image: None,
            is_custom: false,
        };

        assert_eq!(view.toggle_via(&social, &session, &stub).await, Notice::Saved);
        assert!(view.is_saved("101"));

        assert_eq!(view.toggle_via(&social, &session, &stub).await, Notice::Removed);
        assert!(!view.is_saved("101"));
    }
}

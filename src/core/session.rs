// Who is using the app right now
//
// Identity comes from outside (an auth provider, a CLI flag). It is taken
// once at the application root and handed down as `&Session` to whatever
// needs it.

use crate::error::{RecipeError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: String,
}

impl Session {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

#[derive(Debug, Default)]
pub struct AppContext {
    session: Option<Session>,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session for an opaque user identity
    pub fn login(&mut self, user_id: &str) -> Result<&Session> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(RecipeError::NotAuthenticated);
        }

        let session: &Session = self.session.insert(Session {
            user_id: user_id.to_string(),
        });
        Ok(session)
    }

    pub fn logout(&mut self) {
        self.session = None;
    }

    pub fn session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(RecipeError::NotAuthenticated)
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_logout() {
        let mut ctx = AppContext::new();
        assert!(matches!(ctx.session(), Err(RecipeError::NotAuthenticated)));

        ctx.login(" alice ").unwrap();
        assert_eq!(ctx.session().unwrap().user_id(), "alice");

        ctx.logout();
        assert!(!ctx.is_logged_in());
        assert!(ctx.session().is_err());
    }

    #[test]
    fn test_relogin_replaces_identity() {
        let mut ctx = AppContext::new();
        ctx.login("alice").unwrap();
        ctx.login("bob").unwrap();
        assert_eq!(ctx.session().unwrap().user_id(), "bob");
    }

    #[test]
    fn test_blank_identity_rejected() {
        let mut ctx = AppContext::new();
        assert!(ctx.login("   ").is_err());
        assert!(!ctx.is_logged_in());
    }
}

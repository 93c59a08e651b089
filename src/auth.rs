//! Authentication state shared by the HTTP client and services

use std::sync::RwLock;

/// Holds the bearer token, if any, for outgoing API requests.
///
/// Token issuance happens elsewhere; this only records what the user
/// supplied so the client can attach it and services can tell whether the
/// current context is authenticated.
#[derive(Debug, Default)]
pub struct AuthContext {
    token: RwLock<Option<String>>,
}

impl AuthContext {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token.filter(|t| !t.trim().is_empty())),
        }
    }

    /// Current bearer token.
    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Replace the token. Returns whether it changed.
    pub fn set_token(&self, token: Option<String>) -> bool {
        let token = token.filter(|t| !t.trim().is_empty());
        let mut current = self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let changed = *current != token;
        *current = token;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_token_is_anonymous() {
        let auth = AuthContext::new(Some("  ".to_string()));
        assert!(!auth.is_authenticated());
        assert!(auth.token().is_none());
    }

    #[test]
    fn test_set_token_reports_change() {
        let auth = AuthContext::default();
        assert!(auth.set_token(Some("t1".to_string())));
        assert!(auth.set_token(Some("t2".to_string())));
        assert!(!auth.set_token(Some("t2".to_string())));
        assert_eq!(auth.token().as_deref(), Some("t2"));
        assert!(auth.set_token(None));
        assert!(!auth.is_authenticated());
    }
}

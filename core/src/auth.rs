//! Bearer token source for outgoing requests.
//!
//! The client never looks tokens up on its own; it asks the injected
//! `TokenProvider`. `TokenStore` is the stock provider: the login flow calls
//! `set`, logout calls `clear`.

use std::sync::{Arc, RwLock};

pub trait TokenProvider: Send + Sync {
    /// Current bearer token, if a user is signed in.
    fn bearer_token(&self) -> Option<String>;
}

/// Shared, cloneable token holder. Clones observe the same token.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<Option<String>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set(token);
        store
    }

    pub fn set(&self, token: impl Into<String>) {
        let token = token.into();
        let mut slot = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(token).filter(|t| !t.is_empty());
        tracing::debug!(signed_in = slot.is_some(), "bearer token updated");
    }

    pub fn clear(&self) {
        let mut slot = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = None;
        tracing::debug!("bearer token cleared");
    }
}

impl TokenProvider for TokenStore {
    fn bearer_token(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// Provider for anonymous clients.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoToken;

impl TokenProvider for NoToken {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}

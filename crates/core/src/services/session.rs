//! Session identity and per-session wishlist state.
//!
//! Sessions live in process memory: a token handed out at login maps to the
//! user id and a [`Wishlist`]. Nothing here is persisted; restarting the
//! server ends every session.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use rentora_common::{AppError, AppResult, IdGenerator};
use serde::{Deserialize, Serialize};

/// Maximum number of property ids a wishlist may hold.
pub const MAX_WISHLIST_ENTRIES: usize = 128;

/// Ordered, duplicate-free list of wishlisted property ids.
///
/// An explicit value type rather than ambient session state: services take
/// it (via the session token) as a parameter, and it has a defined
/// serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wishlist {
    ids: Vec<String>,
}

impl Wishlist {
    /// Create an empty wishlist.
    #[must_use]
    pub const fn new() -> Self {
        Self { ids: Vec::new() }
    }

    /// Append a property id. Returns `false` (no-op) if already present.
    pub fn add(&mut self, property_id: &str) -> AppResult<bool> {
        if self.ids.iter().any(|id| id == property_id) {
            return Ok(false);
        }
        if self.ids.len() >= MAX_WISHLIST_ENTRIES {
            return Err(AppError::Validation(format!(
                "Wishlist is full (limit {MAX_WISHLIST_ENTRIES})"
            )));
        }
        self.ids.push(property_id.to_string());
        Ok(true)
    }

    /// Remove a property id. Returns `false` (no-op) if not present.
    pub fn remove(&mut self, property_id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| id != property_id);
        self.ids.len() != before
    }

    /// The wishlisted ids, in insertion order.
    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the wishlist is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// An authenticated session.
#[derive(Debug, Clone)]
pub struct Session {
    /// The authenticated user id.
    pub user_id: String,
    /// Per-session wishlist.
    pub wishlist: Wishlist,
    /// When the session was established.
    pub created_at: DateTime<Utc>,
}

/// In-memory session store keyed by token.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Session>>>,
    id_gen: IdGenerator,
}

impl SessionStore {
    /// Create an empty session store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Establish a session for a user and return its token.
    pub fn create(&self, user_id: &str) -> AppResult<String> {
        let token = self.id_gen.generate_token();
        let session = Session {
            user_id: user_id.to_string(),
            wishlist: Wishlist::new(),
            created_at: Utc::now(),
        };

        let mut sessions = self
            .inner
            .write()
            .map_err(|_| AppError::Internal("Session store lock poisoned".to_string()))?;
        sessions.insert(token.clone(), session);

        Ok(token)
    }

    /// Look up a session by token.
    #[must_use]
    pub fn get(&self, token: &str) -> Option<Session> {
        self.inner.read().ok()?.get(token).cloned()
    }

    /// Tear down a session. Idempotent: a missing token is fine.
    pub fn destroy(&self, token: &str) {
        if let Ok(mut sessions) = self.inner.write() {
            sessions.remove(token);
        }
    }

    /// Mutate the wishlist of a session under the store lock.
    ///
    /// Fails with `Unauthorized` if the token has no session.
    pub fn with_wishlist<F, T>(&self, token: &str, f: F) -> AppResult<T>
    where
        F: FnOnce(&mut Wishlist) -> AppResult<T>,
    {
        let mut sessions = self
            .inner
            .write()
            .map_err(|_| AppError::Internal("Session store lock poisoned".to_string()))?;

        let session = sessions.get_mut(token).ok_or(AppError::Unauthorized)?;
        f(&mut session.wishlist)
    }
}

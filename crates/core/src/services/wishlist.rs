//! Wishlist service: session-scoped saved properties.

use std::collections::HashMap;

use rentora_common::AppResult;
use rentora_db::{entities::property, repositories::PropertyRepository};

use crate::services::session::SessionStore;

/// Wishlist operations over the session store.
#[derive(Clone)]
pub struct WishlistService {
    sessions: SessionStore,
    property_repo: PropertyRepository,
}

impl WishlistService {
    /// Create a new wishlist service.
    #[must_use]
    pub const fn new(sessions: SessionStore, property_repo: PropertyRepository) -> Self {
        Self {
            sessions,
            property_repo,
        }
    }

    /// Add a property to the session's wishlist.
    ///
    /// The property must exist at add time. Returns `false` if it was
    /// already wishlisted.
    pub async fn add(&self, token: &str, property_id: &str) -> AppResult<bool> {
        // Existence check first so a bad id fails with PropertyNotFound
        // rather than silently entering the list.
        let property = self.property_repo.get_by_id(property_id).await?;
        self.sessions.with_wishlist(token, |w| w.add(&property.id))
    }

    /// Remove a property from the session's wishlist. Returns `false` if it
    /// was not present.
    pub fn remove(&self, token: &str, property_id: &str) -> AppResult<bool> {
        self.sessions.with_wishlist(token, |w| Ok(w.remove(property_id)))
    }

    /// Resolve the session's wishlist to property records, in wishlist
    /// order.
    ///
    /// Ids whose property has been deleted since they were added are
    /// dropped from both the result and the stored wishlist.
    pub async fn list(&self, token: &str) -> AppResult<Vec<property::Model>> {
        let ids = self
            .sessions
            .with_wishlist(token, |w| Ok(w.ids().to_vec()))?;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let found = self.property_repo.find_by_ids(&ids).await?;
        let mut by_id: HashMap<String, property::Model> =
            found.into_iter().map(|p| (p.id.clone(), p)).collect();

        let mut resolved = Vec::with_capacity(ids.len());
        let mut dangling = Vec::new();
        for id in &ids {
            match by_id.remove(id) {
                Some(p) => resolved.push(p),
                None => dangling.push(id.clone()),
            }
        }

        if !dangling.is_empty() {
            self.sessions.with_wishlist(token, |w| {
                for id in &dangling {
                    w.remove(id);
                }
                Ok(())
            })?;
        }

        Ok(resolved)
    }
}

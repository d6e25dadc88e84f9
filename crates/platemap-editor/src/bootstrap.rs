//! Resolves which restaurant the signed-in owner edits.
//!
//! Lookup order: the id already known to this process, then the on-disk
//! cache from a previous session, then the backend's owner listing. Only the
//! last step touches the network, and nothing here mutates server state.

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use platemap_backend::BackendError;

use crate::backend::RestaurantBackend;
use crate::id_cache::IdCache;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("session expired, sign in again")]
    SessionInvalid,

    #[error("could not look up the restaurant for this account: {0}")]
    Lookup(#[source] BackendError),
}

impl From<BackendError> for BootstrapError {
    fn from(err: BackendError) -> Self {
        if err.is_unauthorized() {
            BootstrapError::SessionInvalid
        } else {
            BootstrapError::Lookup(err)
        }
    }
}

pub struct RestaurantIdResolver<B, C> {
    backend: Arc<B>,
    cache: C,
    /// `(owner_id, restaurant_id)` resolved earlier in this process.
    known: Mutex<Option<(String, String)>>,
}

impl<B: RestaurantBackend, C: IdCache> RestaurantIdResolver<B, C> {
    #[must_use]
    pub fn new(backend: Arc<B>, cache: C) -> Self {
        Self {
            backend,
            cache,
            known: Mutex::new(None),
        }
    }

    /// Seeds the in-process id, e.g. from the sign-in response.
    pub fn remember(&self, owner_id: &str, restaurant_id: &str) {
        *self.known.lock() = Some((owner_id.to_owned(), restaurant_id.to_owned()));
    }

    /// Returns the owner's restaurant id, or `None` if they have none yet.
    ///
    /// When the owner has several restaurants the first one the backend
    /// lists is used.
    ///
    /// # Errors
    ///
    /// - [`BootstrapError::SessionInvalid`] if the backend rejects the token.
    /// - [`BootstrapError::Lookup`] for any other backend failure.
    pub async fn resolve_owned_restaurant_id(
        &self,
        owner_id: &str,
    ) -> Result<Option<String>, BootstrapError> {
        if let Some(id) = self.known_for(owner_id) {
            return Ok(Some(id));
        }

        if let Some(id) = self.cache.load(owner_id).await {
            tracing::debug!(owner = owner_id, restaurant = %id, "restaurant id from local cache");
            self.remember(owner_id, &id);
            return Ok(Some(id));
        }

        self.lookup(owner_id).await
    }

    /// Drops any remembered or cached id for `owner_id` and asks the backend
    /// again. Used when a cached id turns out to point at a missing record.
    ///
    /// # Errors
    ///
    /// Same as [`Self::resolve_owned_restaurant_id`].
    pub async fn refresh(&self, owner_id: &str) -> Result<Option<String>, BootstrapError> {
        self.forget(owner_id).await;
        self.lookup(owner_id).await
    }

    pub async fn forget(&self, owner_id: &str) {
        {
            let mut known = self.known.lock();
            if known.as_ref().is_some_and(|(owner, _)| owner == owner_id) {
                *known = None;
            }
        }
        self.cache.forget(owner_id).await;
    }

    fn known_for(&self, owner_id: &str) -> Option<String> {
        self.known
            .lock()
            .as_ref()
            .filter(|(owner, _)| owner == owner_id)
            .map(|(_, id)| id.clone())
    }

    async fn lookup(&self, owner_id: &str) -> Result<Option<String>, BootstrapError> {
        let restaurants = self.backend.restaurants_by_owner(owner_id).await?;
        if restaurants.len() > 1 {
            tracing::warn!(
                owner = owner_id,
                count = restaurants.len(),
                "owner has several restaurants, editing the first"
            );
        }
        let Some(first) = restaurants.into_iter().next() else {
            tracing::info!(owner = owner_id, "owner has no restaurant yet");
            return Ok(None);
        };
        self.remember(owner_id, &first.id);
        self.cache.store(owner_id, &first.id).await;
        Ok(Some(first.id))
    }
}

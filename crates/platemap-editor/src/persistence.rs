//! Two-step save of the restaurant profile.
//!
//! Step one overwrites the linked location record (only when the profile
//! already references one; a record is never created here). Step two sends
//! the restaurant's own fields and optional image. The steps are strictly
//! sequential and not atomic: if step one fails, step two is never sent; if
//! step two fails, step one is not rolled back.

use std::sync::Arc;

use thiserror::Error;

use platemap_backend::BackendError;
use platemap_core::{
    CoreError, ImageUpload, LocationUpdate, Position, ProfileDraft, RestaurantProfile,
};

use crate::backend::RestaurantBackend;

/// Which commit a save failed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStep {
    Location,
    Profile,
}

impl std::fmt::Display for SaveStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveStep::Location => write!(f, "location"),
            SaveStep::Profile => write!(f, "restaurant details"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PersistError {
    /// The draft failed validation; nothing was sent.
    #[error("cannot save: {0}")]
    Invalid(#[from] CoreError),

    /// There is no loaded profile to save into.
    #[error("cannot save: no restaurant profile is loaded")]
    NoProfile,

    /// The location commit failed; restaurant fields were not sent.
    #[error("could not save the location: {0}")]
    Location(#[source] BackendError),

    /// The restaurant-field commit failed. The location may already have
    /// been updated.
    #[error("could not save the restaurant details: {0}")]
    Profile(#[source] BackendError),

    /// The backend rejected the session during the given step.
    #[error("session expired while saving the {step}; sign in again and retry")]
    SessionInvalid { step: SaveStep },
}

impl PersistError {
    fn from_backend(step: SaveStep, err: BackendError) -> Self {
        if err.is_unauthorized() {
            return PersistError::SessionInvalid { step };
        }
        match step {
            SaveStep::Location => PersistError::Location(err),
            SaveStep::Profile => PersistError::Profile(err),
        }
    }
}

pub struct ProfilePersistence<B> {
    backend: Arc<B>,
}

impl<B: RestaurantBackend> ProfilePersistence<B> {
    #[must_use]
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Saves `position`/`address` and the draft fields for `profile`.
    ///
    /// On success returns the profile as the backend now has it.
    ///
    /// # Errors
    ///
    /// - [`PersistError::Invalid`] if the draft fails validation.
    /// - [`PersistError::Location`] if the location commit fails.
    /// - [`PersistError::Profile`] if the restaurant commit fails.
    /// - [`PersistError::SessionInvalid`] on 401/403 from either commit.
    pub async fn save(
        &self,
        profile: &RestaurantProfile,
        draft: &ProfileDraft,
        position: Position,
        address: &str,
        image: Option<&ImageUpload>,
    ) -> Result<RestaurantProfile, PersistError> {
        draft.validate()?;

        let saved_location = match &profile.location {
            Some(location) => {
                let update = LocationUpdate {
                    position,
                    address: address.to_owned(),
                };
                let saved = self
                    .backend
                    .update_location(&location.id, &update)
                    .await
                    .map_err(|e| {
                        tracing::warn!(restaurant = %profile.id, location = %location.id, error = %e, "location commit failed");
                        PersistError::from_backend(SaveStep::Location, e)
                    })?;
                Some(saved)
            }
            None => {
                tracing::debug!(restaurant = %profile.id, "no linked location record, skipping location commit");
                None
            }
        };

        let mut updated = self
            .backend
            .update_restaurant(&profile.id, draft, address, image)
            .await
            .map_err(|e| {
                tracing::warn!(restaurant = %profile.id, error = %e, "restaurant commit failed");
                PersistError::from_backend(SaveStep::Profile, e)
            })?;

        // The restaurant endpoint may return `locationId` unpopulated; fill it
        // from the location endpoint's own response.
        if let (Some(saved), Some(current)) = (saved_location, updated.location.as_mut()) {
            if current.id == saved.id && current.position.is_none() {
                current.position = saved.position;
            }
        }

        tracing::info!(restaurant = %updated.id, "restaurant profile saved");
        Ok(updated)
    }
}

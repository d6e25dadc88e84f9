//! One restaurant-profile editing session: bootstrap, the three location
//! input channels, form edits, and save.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use platemap_backend::BackendError;
use platemap_core::{
    CoreError, ImageUpload, Notice, Position, ProfileDraft, RestaurantProfile, Suggestion,
};

use crate::backend::RestaurantBackend;
use crate::bootstrap::{BootstrapError, RestaurantIdResolver};
use crate::geocoder::{ForwardGeocoder, ReverseGeocoder};
use crate::id_cache::IdCache;
use crate::map::MapInteractionAdapter;
use crate::persistence::{PersistError, ProfilePersistence};
use crate::resolver::ResolveOutcome;
use crate::search::{SearchOutcome, SuggestionSearch};
use crate::store::{LocationState, PositionStore};

/// Shared collaborators and settings for [`ProfileEditor::open`].
pub struct EditorDeps<G, B> {
    pub geocoder: Arc<G>,
    pub backend: Arc<B>,
    pub debounce: Duration,
    /// Where the map opens when nothing better is known.
    pub default_position: Position,
}

pub struct ProfileEditor<G, B> {
    store: PositionStore,
    search: SuggestionSearch<G>,
    map: MapInteractionAdapter<G>,
    persistence: ProfilePersistence<B>,
    profile: Option<RestaurantProfile>,
    draft: ProfileDraft,
    image: Option<ImageUpload>,
}

impl<G, B> ProfileEditor<G, B>
where
    G: ForwardGeocoder + ReverseGeocoder,
    B: RestaurantBackend,
{
    /// Resolves the owner's restaurant and loads it into a new session.
    ///
    /// An owner without a restaurant gets an empty session at the default
    /// position and a [`Notice::NoRestaurant`]. A cached id that no longer
    /// exists on the server is dropped and resolved again once.
    ///
    /// # Errors
    ///
    /// - [`BootstrapError::SessionInvalid`] if the backend rejects the token.
    /// - [`BootstrapError::Lookup`] on any other backend failure.
    pub async fn open<C: IdCache>(
        deps: EditorDeps<G, B>,
        resolver: &RestaurantIdResolver<B, C>,
        owner_id: &str,
    ) -> Result<Self, BootstrapError> {
        let profile = match resolver.resolve_owned_restaurant_id(owner_id).await? {
            None => None,
            Some(id) => match deps.backend.restaurant(&id).await {
                Ok(profile) => Some(profile),
                Err(BackendError::NotFound { .. }) => {
                    tracing::warn!(owner = owner_id, restaurant = %id, "remembered restaurant is gone, looking up again");
                    match resolver.refresh(owner_id).await? {
                        Some(fresh) => Some(deps.backend.restaurant(&fresh).await?),
                        None => None,
                    }
                }
                Err(e) => return Err(e.into()),
            },
        };

        Ok(Self::with_profile(deps, profile))
    }

    /// Builds a session around an already-fetched profile (or none).
    #[must_use]
    pub fn with_profile(deps: EditorDeps<G, B>, profile: Option<RestaurantProfile>) -> Self {
        let (position, address, draft) = match &profile {
            Some(p) => (
                p.stored_position().unwrap_or(deps.default_position),
                p.address.clone(),
                ProfileDraft::from_profile(p),
            ),
            None => (deps.default_position, String::new(), ProfileDraft::default()),
        };

        let store = PositionStore::new(position, address);
        if profile.is_none() {
            store.report(Notice::NoRestaurant);
        }

        Self {
            search: SuggestionSearch::new(store.clone(), Arc::clone(&deps.geocoder), deps.debounce),
            map: MapInteractionAdapter::new(store.clone(), deps.geocoder),
            persistence: ProfilePersistence::new(deps.backend),
            store,
            profile,
            draft,
            image: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> LocationState {
        self.store.state()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LocationState> {
        self.store.subscribe()
    }

    #[must_use]
    pub fn profile(&self) -> Option<&RestaurantProfile> {
        self.profile.as_ref()
    }

    #[must_use]
    pub fn draft(&self) -> &ProfileDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ProfileDraft {
        &mut self.draft
    }

    pub fn attach_image(&mut self, image: ImageUpload) {
        self.image = Some(image);
    }

    /// The operator typed into the address box: the text becomes the address
    /// and feeds the suggestion search.
    pub fn type_address(&self, text: &str) -> Option<JoinHandle<SearchOutcome>> {
        self.store.edit_address(text);
        self.search.search(text)
    }

    /// Runs a suggestion search without touching the address text.
    pub fn search(&self, text: &str) -> Option<JoinHandle<SearchOutcome>> {
        self.search.search(text)
    }

    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinate`] for an out-of-range click.
    pub fn click(&self, lat: f64, lng: f64) -> Result<JoinHandle<ResolveOutcome>, CoreError> {
        self.map.on_click(lat, lng)
    }

    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinate`] for an out-of-range drop.
    pub fn drag_marker(&self, lat: f64, lng: f64) -> Result<JoinHandle<ResolveOutcome>, CoreError> {
        self.map.on_marker_drag_end(lat, lng)
    }

    pub fn select_suggestion(&self, candidate: &Suggestion) {
        self.map.on_select_suggestion(candidate);
    }

    pub fn select_index(&self, index: usize) -> Option<Suggestion> {
        self.map.on_select_index(index)
    }

    /// Saves the current position, address, draft and image.
    ///
    /// On success the session's profile, draft, position and address are
    /// replaced by the backend's copy and the pending image is cleared. On failure nothing
    /// local changes, so the operator can fix things and retry.
    ///
    /// # Errors
    ///
    /// See [`PersistError`].
    pub async fn save(&mut self) -> Result<&RestaurantProfile, PersistError> {
        let profile = self.profile.as_ref().ok_or(PersistError::NoProfile)?;
        let state = self.store.state();

        let result = self
            .persistence
            .save(
                profile,
                &self.draft,
                state.position(),
                state.address(),
                self.image.as_ref(),
            )
            .await;

        match result {
            Ok(updated) => {
                self.store
                    .adopt_saved(updated.stored_position(), updated.address.clone());
                self.draft = ProfileDraft::from_profile(&updated);
                self.image = None;
                self.store.clear_notice();
                Ok(&*self.profile.insert(updated))
            }
            Err(e) => {
                if matches!(e, PersistError::SessionInvalid { .. }) {
                    self.store.report(Notice::SessionInvalid);
                }
                Err(e)
            }
        }
    }
}

//! Translates raw map gestures into store writes and reverse lookups.

use std::sync::Arc;

use tokio::task::JoinHandle;

use platemap_core::{CoreError, Position, Suggestion};

use crate::geocoder::ReverseGeocoder;
use crate::resolver::{ResolveOutcome, ReverseResolver};
use crate::store::PositionStore;

pub struct MapInteractionAdapter<R> {
    store: PositionStore,
    resolver: ReverseResolver<R>,
}

impl<R: ReverseGeocoder> MapInteractionAdapter<R> {
    #[must_use]
    pub fn new(store: PositionStore, geocoder: Arc<R>) -> Self {
        let resolver = ReverseResolver::new(store.clone(), geocoder);
        Self { store, resolver }
    }

    /// A click on the map. The marker moves before this returns; the address
    /// follows when the returned lookup completes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinate`] for an out-of-range gesture.
    /// State is not touched in that case.
    pub fn on_click(&self, lat: f64, lng: f64) -> Result<JoinHandle<ResolveOutcome>, CoreError> {
        let position = Position::new(lat, lng)?;
        let ticket = self.store.place_marker(position);
        Ok(self.resolver.resolve(ticket))
    }

    /// The marker was dragged and released. Same contract as [`Self::on_click`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinate`] for an out-of-range gesture.
    pub fn on_marker_drag_end(
        &self,
        lat: f64,
        lng: f64,
    ) -> Result<JoinHandle<ResolveOutcome>, CoreError> {
        self.on_click(lat, lng)
    }

    /// Commits a suggestion as the new position and address.
    pub fn on_select_suggestion(&self, candidate: &Suggestion) {
        tracing::debug!(label = %candidate.label, position = %candidate.position, "suggestion selected");
        self.store.select(candidate);
    }

    /// Selects the `index`-th entry of the list currently shown. Returns the
    /// chosen candidate, or `None` if the index is out of range.
    pub fn on_select_index(&self, index: usize) -> Option<Suggestion> {
        let candidate = self.store.state().suggestions().get(index).cloned()?;
        self.on_select_suggestion(&candidate);
        Some(candidate)
    }
}

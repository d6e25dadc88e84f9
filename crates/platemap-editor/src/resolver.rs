//! Reverse geocoding for marker placements.
//!
//! Fire-and-forget: the caller gets a handle but the store is updated by the
//! task itself, and only if the marker is still where this lookup was asked
//! about when the answer lands.

use std::sync::Arc;

use tokio::task::JoinHandle;

use platemap_core::{LookupKind, Notice};

use crate::geocoder::ReverseGeocoder;
use crate::store::{PositionStore, ResolveTicket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The address field now shows this text.
    Applied(String),
    /// The marker moved (or a suggestion was picked) before the answer came back.
    Superseded,
    /// The lookup failed; the address was left as it was.
    Failed,
    SessionInvalid,
}

pub struct ReverseResolver<R> {
    store: PositionStore,
    geocoder: Arc<R>,
}

impl<R: ReverseGeocoder> ReverseResolver<R> {
    #[must_use]
    pub fn new(store: PositionStore, geocoder: Arc<R>) -> Self {
        Self { store, geocoder }
    }

    /// Starts resolving the position named by `ticket`.
    pub fn resolve(&self, ticket: ResolveTicket) -> JoinHandle<ResolveOutcome> {
        let store = self.store.clone();
        let geocoder = Arc::clone(&self.geocoder);
        tokio::spawn(async move { resolve_once(&store, geocoder.as_ref(), ticket).await })
    }
}

async fn resolve_once<R: ReverseGeocoder>(
    store: &PositionStore,
    geocoder: &R,
    ticket: ResolveTicket,
) -> ResolveOutcome {
    let position = ticket.position();
    match geocoder.reverse(position).await {
        Ok(address) => {
            if store.apply_resolved(ticket, address.clone()) {
                tracing::debug!(%position, %address, "marker address resolved");
                ResolveOutcome::Applied(address)
            } else {
                tracing::debug!(%position, "discarding address for superseded marker");
                ResolveOutcome::Superseded
            }
        }
        Err(e) if e.is_unauthorized() => {
            tracing::warn!(%position, error = %e, "geocoder rejected session");
            store.report(Notice::SessionInvalid);
            ResolveOutcome::SessionInvalid
        }
        Err(e) => {
            let notice = Notice::LookupFailed {
                lookup: LookupKind::Reverse,
                reason: e.to_string(),
            };
            if store.fail_resolve(ticket, notice) {
                tracing::warn!(%position, error = %e, "address lookup failed");
                ResolveOutcome::Failed
            } else {
                ResolveOutcome::Superseded
            }
        }
    }
}

//! Debounced forward-geocoding pipeline feeding the suggestion dropdown.
//!
//! Each keystroke takes a fresh [`SearchTicket`]. The spawned task sleeps
//! for the debounce window, gives up if another keystroke has taken a newer
//! ticket in the meantime, and otherwise queries the geocoder. The answer is
//! committed only if its ticket is still the latest when it arrives; late
//! answers for older text are dropped, never merged.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use platemap_core::{LookupKind, Notice};

use crate::geocoder::ForwardGeocoder;
use crate::store::{PositionStore, SearchTicket};

/// How a single search request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The list was replaced with `count` suggestions.
    Applied { count: usize },
    /// A newer keystroke or a selection made this request stale.
    Superseded,
    /// The lookup failed; the list was emptied and a notice published.
    Failed,
    /// The geocoder rejected the session credential.
    SessionInvalid,
}

pub struct SuggestionSearch<G> {
    store: PositionStore,
    geocoder: Arc<G>,
    debounce: Duration,
}

impl<G: ForwardGeocoder> SuggestionSearch<G> {
    #[must_use]
    pub fn new(store: PositionStore, geocoder: Arc<G>, debounce: Duration) -> Self {
        Self {
            store,
            geocoder,
            debounce,
        }
    }

    /// Feeds the current search text into the pipeline.
    ///
    /// Blank text empties the suggestion list synchronously and returns
    /// `None`; no request is made. Otherwise returns the handle of the
    /// debounced request, which callers may await or drop.
    pub fn search(&self, text: &str) -> Option<JoinHandle<SearchOutcome>> {
        let query = text.trim().to_owned();
        if query.is_empty() {
            self.store.clear_suggestions();
            return None;
        }

        let ticket = self.store.begin_search();
        let store = self.store.clone();
        let geocoder = Arc::clone(&self.geocoder);
        let debounce = self.debounce;

        Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if !store.is_current_search(ticket) {
                tracing::trace!(query, "search debounced away by newer input");
                return SearchOutcome::Superseded;
            }
            run_query(&store, geocoder.as_ref(), ticket, &query).await
        }))
    }
}

async fn run_query<G: ForwardGeocoder>(
    store: &PositionStore,
    geocoder: &G,
    ticket: SearchTicket,
    query: &str,
) -> SearchOutcome {
    match geocoder.search(query).await {
        Ok(suggestions) => {
            let count = suggestions.len();
            let notice = (count == 0).then(|| Notice::LookupFailed {
                lookup: LookupKind::Forward,
                reason: format!("no matches for \"{query}\""),
            });
            if store.commit_search(ticket, suggestions, notice) {
                tracing::debug!(query, count, "suggestions updated");
                SearchOutcome::Applied { count }
            } else {
                tracing::debug!(query, "discarding stale search response");
                SearchOutcome::Superseded
            }
        }
        Err(e) if e.is_unauthorized() => {
            tracing::warn!(query, error = %e, "geocoder rejected session");
            store.report(Notice::SessionInvalid);
            SearchOutcome::SessionInvalid
        }
        Err(e) => {
            let notice = Notice::LookupFailed {
                lookup: LookupKind::Forward,
                reason: e.to_string(),
            };
            if store.commit_search(ticket, Vec::new(), Some(notice)) {
                tracing::warn!(query, error = %e, "address search failed");
                SearchOutcome::Failed
            } else {
                tracing::debug!(query, error = %e, "ignoring failure of stale search");
                SearchOutcome::Superseded
            }
        }
    }
}

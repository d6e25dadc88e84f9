//! The single shared cell holding the editor's position, address text, and
//! suggestion list.
//!
//! Every writer goes through [`watch::Sender::send_if_modified`], so the
//! "is this result still current?" check and the write it guards run inside
//! one synchronous closure. No await can fall between them, which makes the
//! check-then-write atomic with respect to other completions.

use std::sync::Arc;

use tokio::sync::watch;

use platemap_core::{Notice, Position, Suggestion};

/// Identifies one forward-geocoding request.
///
/// Only the ticket from the latest [`PositionStore::begin_search`] may write
/// the suggestion list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

/// Identifies one reverse-geocoding request and the marker position it was
/// issued for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolveTicket {
    seq: u64,
    position: Position,
}

impl ResolveTicket {
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }
}

/// Everything a map/address UI renders from.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationState {
    position: Position,
    address: String,
    suggestions: Vec<Suggestion>,
    resolving: bool,
    notice: Option<Notice>,
    search_seq: u64,
    resolve_seq: u64,
}

impl LocationState {
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[must_use]
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    /// `true` while a reverse lookup for the current marker is outstanding.
    #[must_use]
    pub fn is_resolving(&self) -> bool {
        self.resolving
    }

    /// Most recent non-fatal notice, if not yet cleared.
    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    fn is_current_resolve(&self, ticket: &ResolveTicket) -> bool {
        ticket.seq == self.resolve_seq && ticket.position == self.position
    }
}

/// Cloneable handle to the shared location state.
#[derive(Clone)]
pub struct PositionStore {
    tx: Arc<watch::Sender<LocationState>>,
}

impl PositionStore {
    #[must_use]
    pub fn new(position: Position, address: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(LocationState {
            position,
            address: address.into(),
            suggestions: Vec::new(),
            resolving: false,
            notice: None,
            search_seq: 0,
            resolve_seq: 0,
        });
        Self { tx: Arc::new(tx) }
    }

    /// Clone of the current state.
    #[must_use]
    pub fn state(&self) -> LocationState {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.tx.borrow().position
    }

    #[must_use]
    pub fn address(&self) -> String {
        self.tx.borrow().address.clone()
    }

    /// Receiver that observes every committed change, newest value first.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LocationState> {
        self.tx.subscribe()
    }

    /// Adopts the backend's saved copy of the location.
    ///
    /// `position` is `None` when the saved record carries no coordinate, in
    /// which case the marker stays put. Every outstanding lookup becomes stale
    /// so none can overwrite the saved address.
    pub fn adopt_saved(&self, position: Option<Position>, address: impl Into<String>) {
        let address = address.into();
        self.tx.send_modify(|s| {
            if let Some(position) = position {
                s.position = position;
            }
            s.address = address;
            s.suggestions.clear();
            s.resolving = false;
            s.search_seq += 1;
            s.resolve_seq += 1;
        });
    }

    /// Moves the marker optimistically and returns the ticket a reverse
    /// lookup must present to write the address.
    ///
    /// The address text is left as it was until the lookup lands.
    pub fn place_marker(&self, position: Position) -> ResolveTicket {
        let mut seq = 0;
        self.tx.send_modify(|s| {
            s.resolve_seq += 1;
            s.position = position;
            s.resolving = true;
            seq = s.resolve_seq;
        });
        ResolveTicket { seq, position }
    }

    /// Writes a resolved address if `ticket` still names the current marker.
    ///
    /// Returns `false`, leaving state untouched, for a superseded lookup.
    pub fn apply_resolved(&self, ticket: ResolveTicket, address: String) -> bool {
        self.tx.send_if_modified(|s| {
            if !s.is_current_resolve(&ticket) {
                return false;
            }
            s.address = address;
            s.resolving = false;
            s.notice = None;
            true
        })
    }

    /// Records a failed reverse lookup if `ticket` is still current. The
    /// address keeps its previous value.
    pub fn fail_resolve(&self, ticket: ResolveTicket, notice: Notice) -> bool {
        self.tx.send_if_modified(|s| {
            if !s.is_current_resolve(&ticket) {
                return false;
            }
            s.resolving = false;
            s.notice = Some(notice);
            true
        })
    }

    /// Commits a chosen suggestion: position and address from the candidate,
    /// suggestions cleared, and every outstanding lookup made stale.
    pub fn select(&self, candidate: &Suggestion) {
        self.tx.send_modify(|s| {
            s.position = candidate.position;
            s.address.clone_from(&candidate.label);
            s.suggestions.clear();
            s.resolving = false;
            s.notice = None;
            s.search_seq += 1;
            s.resolve_seq += 1;
        });
    }

    /// Operator typed into the address field directly.
    ///
    /// Typed text wins over any reverse lookup still in flight.
    pub fn edit_address(&self, text: impl Into<String>) {
        let text = text.into();
        self.tx.send_modify(|s| {
            s.address = text;
            s.resolving = false;
            s.resolve_seq += 1;
        });
    }

    /// Issues a new search ticket, invalidating all earlier ones.
    pub fn begin_search(&self) -> SearchTicket {
        let mut seq = 0;
        self.tx.send_if_modified(|s| {
            s.search_seq += 1;
            seq = s.search_seq;
            false
        });
        SearchTicket(seq)
    }

    #[must_use]
    pub fn is_current_search(&self, ticket: SearchTicket) -> bool {
        self.tx.borrow().search_seq == ticket.0
    }

    /// Empties the suggestion list immediately and invalidates pending searches.
    pub fn clear_suggestions(&self) {
        self.tx.send_if_modified(|s| {
            s.search_seq += 1;
            if s.suggestions.is_empty() {
                return false;
            }
            s.suggestions.clear();
            true
        });
    }

    /// Replaces the suggestion list if `ticket` is the latest search.
    ///
    /// `notice` replaces the current notice when given; a non-empty list with
    /// no notice clears it. Returns `false` for a superseded search.
    pub fn commit_search(
        &self,
        ticket: SearchTicket,
        suggestions: Vec<Suggestion>,
        notice: Option<Notice>,
    ) -> bool {
        self.tx.send_if_modified(|s| {
            if s.search_seq != ticket.0 {
                return false;
            }
            if notice.is_some() || !suggestions.is_empty() {
                s.notice = notice;
            }
            s.suggestions = suggestions;
            true
        })
    }

    /// Publishes a notice unconditionally.
    pub fn report(&self, notice: Notice) {
        self.tx.send_modify(|s| s.notice = Some(notice));
    }

    pub fn clear_notice(&self) {
        self.tx.send_if_modified(|s| s.notice.take().is_some());
    }
}

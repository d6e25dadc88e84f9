//! Non-fatal, operator-facing notices emitted by the location editor.

use serde::Serialize;

/// Which geocoding direction a lookup failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupKind {
    Forward,
    Reverse,
}

impl std::fmt::Display for LookupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupKind::Forward => write!(f, "address search"),
            LookupKind::Reverse => write!(f, "address lookup"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// A geocoding call failed or came back empty. The editor keeps its
    /// last-known-good state.
    LookupFailed { lookup: LookupKind, reason: String },
    /// A collaborator rejected the bearer credential; the session owner must
    /// re-authenticate.
    SessionInvalid,
    /// The signed-in owner has no restaurant yet.
    NoRestaurant,
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::LookupFailed { lookup, reason } => write!(f, "{lookup} failed: {reason}"),
            Notice::SessionInvalid => write!(f, "session expired, please sign in again"),
            Notice::NoRestaurant => write!(f, "no restaurant registered for this account yet"),
        }
    }
}

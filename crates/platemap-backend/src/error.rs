use thiserror::Error;

/// Errors returned by the restaurant backend client.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The bearer token was rejected (401/403).
    #[error("session rejected by backend (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("not found: {url}")]
    NotFound { url: String },

    /// Any other non-2xx status. `message` is the server's `message` field
    /// when present, else the canonical reason phrase.
    #[error("backend returned HTTP {status} for {url}: {message}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        message: String,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid backend base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

impl BackendError {
    /// `true` when the failure means the caller's session is no longer valid.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, BackendError::Unauthorized { .. })
    }
}

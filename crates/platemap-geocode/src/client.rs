//! HTTP client for the forward/reverse geocoding service.
//!
//! Wraps `reqwest` with status classification, bounded retries, and tolerant
//! parsing of Nominatim-shaped payloads. Forward lookups return ranked
//! [`Suggestion`]s; reverse lookups return a display address.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use platemap_core::{Position, Suggestion};

use crate::error::GeocodeError;
use crate::retry::retry_with_backoff;
use crate::types::{ForwardHit, ReverseResponse};

const DEFAULT_LIMIT: u32 = 5;

/// Client for a Nominatim-compatible geocoding API.
///
/// Use [`GeocodeClient::new`] with the production root, or point it at a
/// wiremock server in tests.
pub struct GeocodeClient {
    client: Client,
    base_url: Url,
    limit: u32,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl GeocodeClient {
    /// Creates a client with the given timeout and `User-Agent`.
    ///
    /// Retries are disabled until [`GeocodeClient::with_retry`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`GeocodeError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(user_agent)
            .build()?;

        // One trailing slash; `build_url` pops the empty segment it leaves.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GeocodeError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            limit: DEFAULT_LIMIT,
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    /// Enables retries on transient failures.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Caps the number of forward-geocoding candidates requested.
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Forward-geocodes `query` into ranked candidates, best first.
    ///
    /// Hits without a label or a valid coordinate are skipped. An empty list
    /// is a valid answer.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::Unauthorized`] on 401/403.
    /// - [`GeocodeError::RateLimited`] / [`GeocodeError::UnexpectedStatus`]
    ///   on other non-2xx statuses, after retries.
    /// - [`GeocodeError::Http`] on network failure, after retries.
    /// - [`GeocodeError::Deserialize`] if the body is not a JSON array of hits.
    pub async fn search(&self, query: &str) -> Result<Vec<Suggestion>, GeocodeError> {
        let url = self.build_url(
            "search",
            &[
                ("q", query),
                ("format", "jsonv2"),
                ("limit", &self.limit.to_string()),
            ],
        );
        let body = self.get_text(&url).await?;
        let hits: Vec<ForwardHit> =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
                context: format!("search(q={query})"),
                source: e,
            })?;

        let total = hits.len();
        let suggestions: Vec<Suggestion> = hits
            .into_iter()
            .filter_map(ForwardHit::into_suggestion)
            .collect();
        if suggestions.len() < total {
            tracing::warn!(
                query,
                skipped = total - suggestions.len(),
                "geocoder search: skipping hits without label or valid coordinate"
            );
        }
        Ok(suggestions)
    }

    /// Reverse-geocodes `position` into a display address.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::NoResult`] if the service has no address for the point.
    /// - [`GeocodeError::Unauthorized`] on 401/403.
    /// - [`GeocodeError::RateLimited`] / [`GeocodeError::UnexpectedStatus`]
    ///   on other non-2xx statuses, after retries.
    /// - [`GeocodeError::Http`] on network failure, after retries.
    /// - [`GeocodeError::Deserialize`] if the body does not parse.
    pub async fn reverse(&self, position: Position) -> Result<String, GeocodeError> {
        let lat = position.lat().to_string();
        let lon = position.lng().to_string();
        let url = self.build_url(
            "reverse",
            &[("lat", &lat), ("lon", &lon), ("format", "jsonv2")],
        );
        let body = self.get_text(&url).await?;
        let parsed: ReverseResponse =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
                context: format!("reverse({position})"),
                source: e,
            })?;

        match parsed.display_name.map(|s| s.trim().to_owned()) {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(GeocodeError::NoResult {
                context: match parsed.error {
                    Some(reason) => format!("reverse({position}): {reason}"),
                    None => format!("reverse({position})"),
                },
            }),
        }
    }

    /// Builds an endpoint URL with percent-encoded query parameters.
    fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(endpoint);
        }
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    /// Sends a GET with retries and returns the body of a 2xx response.
    async fn get_text(&self, url: &Url) -> Result<String, GeocodeError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(url.clone())
                    .header(reqwest::header::ACCEPT, "application/json")
                    .send()
                    .await?;
                let status = response.status();

                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                    return Err(GeocodeError::Unauthorized {
                        status: status.as_u16(),
                    });
                }

                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(1);
                    return Err(GeocodeError::RateLimited { retry_after_secs });
                }

                if !status.is_success() {
                    return Err(GeocodeError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                Ok(response.text().await?)
            }
        })
        .await
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

//! HTTP client for the restaurant backend REST API.
//!
//! Every request carries the session's bearer token. 401/403 responses are
//! surfaced as [`BackendError::Unauthorized`] so callers can hand control back
//! to the sign-in flow instead of treating them as ordinary failures.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

use platemap_core::{ImageUpload, LocationRef, LocationUpdate, ProfileDraft, RestaurantProfile};

use crate::error::BackendError;
use crate::types::{ErrorBody, LocationDoc, LocationUpdateBody, RestaurantDoc};

/// Client for the restaurant/location backend.
pub struct BackendClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl BackendClient {
    /// Creates a client authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`BackendError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, token: &str) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("platemap/0.1 (restaurant-portal)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| BackendError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            token: token.to_owned(),
        })
    }

    /// Lists the restaurants owned by `owner_id`, in server order.
    ///
    /// # Errors
    ///
    /// See [`BackendError`]; a 404 is reported as an empty list rather than
    /// an error because the backend uses it for owners with no restaurants.
    pub async fn restaurants_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<RestaurantProfile>, BackendError> {
        let url = self.endpoint(&["restaurants", "owner", owner_id]);
        let request = self.client.get(url.clone());
        match self.send_json::<Vec<RestaurantDoc>>(request, &url).await {
            Ok(docs) => Ok(docs.into_iter().map(RestaurantProfile::from).collect()),
            Err(BackendError::NotFound { .. }) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Fetches a single restaurant with its location populated.
    ///
    /// # Errors
    ///
    /// See [`BackendError`].
    pub async fn restaurant(&self, id: &str) -> Result<RestaurantProfile, BackendError> {
        let url = self.endpoint(&["restaurants", id]);
        let request = self.client.get(url.clone());
        let doc: RestaurantDoc = self.send_json(request, &url).await?;
        Ok(doc.into())
    }

    /// Overwrites an existing location record's coordinate and address.
    ///
    /// # Errors
    ///
    /// See [`BackendError`].
    pub async fn update_location(
        &self,
        location_id: &str,
        update: &LocationUpdate,
    ) -> Result<LocationRef, BackendError> {
        let url = self.endpoint(&["locations", location_id]);
        let request = self
            .client
            .put(url.clone())
            .json(&LocationUpdateBody::from(update));
        let doc: LocationDoc = self.send_json(request, &url).await?;
        Ok(doc.into_ref())
    }

    /// Updates a restaurant's own fields as one multipart request, with the
    /// image attached when given.
    ///
    /// # Errors
    ///
    /// See [`BackendError`]. An unparseable image MIME type is reported as
    /// [`BackendError::Http`].
    pub async fn update_restaurant(
        &self,
        id: &str,
        draft: &ProfileDraft,
        address: &str,
        image: Option<&ImageUpload>,
    ) -> Result<RestaurantProfile, BackendError> {
        let url = self.endpoint(&["restaurants", id]);

        let mut form = Form::new()
            .text("name", draft.name.clone())
            .text("description", draft.description.clone())
            .text("phone", draft.phone.clone())
            .text("address", address.to_owned())
            .text("minOrder", draft.min_order.to_string())
            .text("deliveryFee", draft.delivery_fee.to_string())
            .text("maxDeliveryDistance", draft.max_delivery_distance.to_string());

        if let Some(image) = image {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.mime)?;
            form = form.part("image", part);
        }

        let request = self.client.put(url.clone()).multipart(form);
        let doc: RestaurantDoc = self.send_json(request, &url).await?;
        Ok(doc.into())
    }

    /// Builds `base/seg1/seg2/...`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Attaches the bearer token, sends, classifies the status, and decodes
    /// a 2xx body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &Url,
    ) -> Result<T, BackendError> {
        let response = request.bearer_auth(&self.token).send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(BackendError::Unauthorized {
                status: status.as_u16(),
            });
        }

        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound {
                url: url.to_string(),
            });
        }

        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_owned());
            tracing::warn!(status = status.as_u16(), %url, %message, "backend request failed");
            return Err(BackendError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| BackendError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}

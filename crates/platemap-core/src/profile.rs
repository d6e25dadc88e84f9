//! Restaurant profile aggregate and the editable draft derived from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CoreError, Position};

/// Reference from a restaurant to its server-owned location record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRef {
    pub id: String,
    pub position: Option<Position>,
}

/// A restaurant profile as last confirmed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantProfile {
    pub id: String,
    pub name: String,
    pub description: String,
    pub phone: String,
    /// Free-text address as stored on the restaurant record.
    pub address: String,
    pub min_order: f64,
    pub delivery_fee: f64,
    /// Maximum delivery radius in kilometres.
    pub max_delivery_distance: f64,
    /// Public URL of the current image, if any.
    pub image: Option<String>,
    pub location: Option<LocationRef>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RestaurantProfile {
    /// Coordinate the editor should open on, when the record carries one.
    #[must_use]
    pub fn stored_position(&self) -> Option<Position> {
        self.location.as_ref().and_then(|l| l.position)
    }
}

/// Body of a location-record update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationUpdate {
    pub position: Position,
    pub address: String,
}

/// In-memory form state for the non-location profile fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileDraft {
    pub name: String,
    pub description: String,
    pub phone: String,
    pub min_order: f64,
    pub delivery_fee: f64,
    pub max_delivery_distance: f64,
}

impl ProfileDraft {
    #[must_use]
    pub fn from_profile(profile: &RestaurantProfile) -> Self {
        Self {
            name: profile.name.clone(),
            description: profile.description.clone(),
            phone: profile.phone.clone(),
            min_order: profile.min_order,
            delivery_fee: profile.delivery_fee,
            max_delivery_distance: profile.max_delivery_distance,
        }
    }

    /// Checks the draft before anything is sent to the backend.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidProfileField`] for an empty name or a
    /// negative / non-finite numeric delivery parameter.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::InvalidProfileField {
                field: "name",
                reason: "must not be empty".to_owned(),
            });
        }

        for (field, value) in [
            ("min_order", self.min_order),
            ("delivery_fee", self.delivery_fee),
            ("max_delivery_distance", self.max_delivery_distance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::InvalidProfileField {
                    field,
                    reason: format!("must be a non-negative number, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Optional image attached to a profile save.
#[derive(Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

//! Backend wire types for restaurant and location records.
//!
//! The backend speaks camelCase JSON with Mongo-style `_id` keys. A
//! restaurant's `locationId` is either a bare id string or the populated
//! location document, depending on the endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use platemap_core::{LocationRef, LocationUpdate, Position, RestaurantProfile};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CoordsDoc {
    pub lat: f64,
    pub lng: f64,
}

/// A location document as returned by the backend.
#[derive(Debug, Deserialize)]
pub struct LocationDoc {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub coords: Option<CoordsDoc>,
    #[serde(default)]
    pub address: Option<String>,
}

impl LocationDoc {
    /// Converts to a [`LocationRef`], dropping coordinates that are out of range.
    #[must_use]
    pub fn into_ref(self) -> LocationRef {
        let position = self
            .coords
            .and_then(|c| Position::new(c.lat, c.lng).ok());
        LocationRef {
            id: self.id,
            position,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LocationField {
    Populated(LocationDoc),
    Id(String),
}

/// A restaurant document as returned by the backend.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantDoc {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub min_order: Option<f64>,
    #[serde(default)]
    pub delivery_fee: Option<f64>,
    #[serde(default)]
    pub max_delivery_distance: Option<f64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub location_id: Option<LocationField>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<RestaurantDoc> for RestaurantProfile {
    fn from(doc: RestaurantDoc) -> Self {
        let location = doc.location_id.map(|field| match field {
            LocationField::Populated(loc) => loc.into_ref(),
            LocationField::Id(id) => LocationRef { id, position: None },
        });
        RestaurantProfile {
            id: doc.id,
            name: doc.name,
            description: doc.description.unwrap_or_default(),
            phone: doc.phone.unwrap_or_default(),
            address: doc.address.unwrap_or_default(),
            min_order: doc.min_order.unwrap_or_default(),
            delivery_fee: doc.delivery_fee.unwrap_or_default(),
            max_delivery_distance: doc.max_delivery_distance.unwrap_or_default(),
            image: doc.image.filter(|s| !s.is_empty()),
            location,
            updated_at: doc.updated_at,
        }
    }
}

/// Body of `PUT /locations/{id}`.
#[derive(Debug, Serialize)]
pub struct LocationUpdateBody<'a> {
    pub coords: CoordsDoc,
    pub address: &'a str,
}

impl<'a> From<&'a LocationUpdate> for LocationUpdateBody<'a> {
    fn from(update: &'a LocationUpdate) -> Self {
        Self {
            coords: CoordsDoc {
                lat: update.position.lat(),
                lng: update.position.lng(),
            },
            address: &update.address,
        }
    }
}

/// Error envelope the backend uses for non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

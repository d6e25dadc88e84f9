//! Geocoding service response types.
//!
//! The service follows the Nominatim JSON shape. Coordinates arrive as
//! strings from Nominatim proper but as numbers from several compatible
//! proxies, so they are kept as raw [`serde_json::Value`]s here and parsed
//! by [`value_as_f64`].

use serde::Deserialize;

use platemap_core::{Position, Suggestion};

/// One entry of a `/search` response array.
#[derive(Debug, Deserialize)]
pub struct ForwardHit {
    #[serde(default)]
    pub place_id: Option<serde_json::Value>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub lat: serde_json::Value,
    #[serde(default, alias = "lng")]
    pub lon: serde_json::Value,
}

impl ForwardHit {
    /// Converts the hit into a [`Suggestion`], or `None` when it has no label
    /// or no valid coordinate.
    #[must_use]
    pub fn into_suggestion(self) -> Option<Suggestion> {
        let label = self
            .display_name
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())?;
        let lat = value_as_f64(&self.lat)?;
        let lng = value_as_f64(&self.lon)?;
        let position = Position::new(lat, lng).ok()?;
        let place_id = self.place_id.and_then(|v| match v {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        Some(Suggestion {
            label,
            position,
            place_id,
        })
    }
}

/// Body of a `/reverse` response.
///
/// Nominatim answers HTTP 200 with `{"error": "Unable to geocode"}` when the
/// point has no address, so both fields are optional.
#[derive(Debug, Deserialize)]
pub struct ReverseResponse {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Reads a coordinate component that may be a JSON number or numeric string.
pub(crate) fn value_as_f64(value: &serde_json::Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
}

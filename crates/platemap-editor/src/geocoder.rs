//! Geocoding seams used by the search and reverse-lookup pipelines.

use std::future::Future;

use platemap_core::{Position, Suggestion};
use platemap_geocode::{GeocodeClient, GeocodeError};

/// Text to ranked candidates.
pub trait ForwardGeocoder: Send + Sync + 'static {
    fn search(&self, query: &str)
        -> impl Future<Output = Result<Vec<Suggestion>, GeocodeError>> + Send;
}

/// Coordinate to display address.
pub trait ReverseGeocoder: Send + Sync + 'static {
    fn reverse(&self, position: Position)
        -> impl Future<Output = Result<String, GeocodeError>> + Send;
}

impl ForwardGeocoder for GeocodeClient {
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<Suggestion>, GeocodeError>> + Send {
        GeocodeClient::search(self, query)
    }
}

impl ReverseGeocoder for GeocodeClient {
    fn reverse(&self, position: Position) -> impl Future<Output = Result<String, GeocodeError>> + Send {
        GeocodeClient::reverse(self, position)
    }
}

//! Restaurant backend seam used by bootstrap and persistence.

use std::future::Future;

use platemap_backend::{BackendClient, BackendError};
use platemap_core::{ImageUpload, LocationRef, LocationUpdate, ProfileDraft, RestaurantProfile};

pub trait RestaurantBackend: Send + Sync + 'static {
    fn restaurants_by_owner(
        &self,
        owner_id: &str,
    ) -> impl Future<Output = Result<Vec<RestaurantProfile>, BackendError>> + Send;

    fn restaurant(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<RestaurantProfile, BackendError>> + Send;

    fn update_location(
        &self,
        location_id: &str,
        update: &LocationUpdate,
    ) -> impl Future<Output = Result<LocationRef, BackendError>> + Send;

    fn update_restaurant(
        &self,
        id: &str,
        draft: &ProfileDraft,
        address: &str,
        image: Option<&ImageUpload>,
    ) -> impl Future<Output = Result<RestaurantProfile, BackendError>> + Send;
}

impl RestaurantBackend for BackendClient {
    fn restaurants_by_owner(
        &self,
        owner_id: &str,
    ) -> impl Future<Output = Result<Vec<RestaurantProfile>, BackendError>> + Send {
        BackendClient::restaurants_by_owner(self, owner_id)
    }

    fn restaurant(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<RestaurantProfile, BackendError>> + Send {
        BackendClient::restaurant(self, id)
    }

    fn update_location(
        &self,
        location_id: &str,
        update: &LocationUpdate,
    ) -> impl Future<Output = Result<LocationRef, BackendError>> + Send {
        BackendClient::update_location(self, location_id, update)
    }

    fn update_restaurant(
        &self,
        id: &str,
        draft: &ProfileDraft,
        address: &str,
        image: Option<&ImageUpload>,
    ) -> impl Future<Output = Result<RestaurantProfile, BackendError>> + Send {
        BackendClient::update_restaurant(self, id, draft, address, image)
    }
}

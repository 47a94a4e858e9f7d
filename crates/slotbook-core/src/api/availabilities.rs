//! Provider availability windows.

use super::{ApiClient, ApiError, RequestDescriptor};
use crate::models::{Availability, CreateAvailabilityRequest, UpdateAvailabilityRequest};

impl ApiClient {
    pub async fn create_availability(
        &self,
        data: &CreateAvailabilityRequest,
    ) -> Result<Availability, ApiError> {
        self.request(
            &RequestDescriptor::post("/availabilities")
                .authenticated()
                .json(data)?,
        )
        .await
    }

    pub async fn get_my_availabilities(&self) -> Result<Vec<Availability>, ApiError> {
        self.request(&RequestDescriptor::get("/availabilities/my-availabilities").authenticated())
            .await
    }

    pub async fn update_availability(
        &self,
        id: &str,
        data: &UpdateAvailabilityRequest,
    ) -> Result<Availability, ApiError> {
        self.request(
            &RequestDescriptor::put(format!("/availabilities/{}", id))
                .authenticated()
                .json(data)?,
        )
        .await
    }

    pub async fn delete_availability(&self, id: &str) -> Result<(), ApiError> {
        self.request(&RequestDescriptor::delete(format!("/availabilities/{}", id)).authenticated())
            .await
    }
}

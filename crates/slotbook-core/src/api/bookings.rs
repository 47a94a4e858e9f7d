//! Booking endpoints for clients and providers.

use super::{ApiClient, ApiError, RequestDescriptor};
use crate::models::{Booking, CreateBookingRequest, PageRequest, PaginatedResponse};

impl ApiClient {
    pub async fn create_booking(&self, data: &CreateBookingRequest) -> Result<Booking, ApiError> {
        self.request(&RequestDescriptor::post("/bookings").authenticated().json(data)?)
            .await
    }

    /// Bookings made by the logged-in client.
    pub async fn get_my_bookings(
        &self,
        page: PageRequest,
    ) -> Result<PaginatedResponse<Booking>, ApiError> {
        self.request(
            &RequestDescriptor::get("/bookings/client/my-bookings")
                .authenticated()
                .query("page", page.page)
                .query("limit", page.limit),
        )
        .await
    }

    /// Bookings of the logged-in provider's services.
    pub async fn get_provider_bookings(
        &self,
        page: PageRequest,
    ) -> Result<PaginatedResponse<Booking>, ApiError> {
        self.request(
            &RequestDescriptor::get("/bookings/provider/my-bookings")
                .authenticated()
                .query("page", page.page)
                .query("limit", page.limit),
        )
        .await
    }

    pub async fn cancel_booking(&self, id: &str) -> Result<Booking, ApiError> {
        self.request(&RequestDescriptor::patch(format!("/bookings/{}/cancel", id)).authenticated())
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::Method;
    use serde_json::json;

    use crate::auth::{Credential, CredentialMode, MemoryCredentialStore};
    use crate::models::{BookingStatus, PageRequest};
    use crate::test_support::{client_with, ScriptedTransport};

    fn booking_json(status: &str) -> serde_json::Value {
        json!({
            "id": "b1",
            "clientId": "c1",
            "serviceVariationId": "v1",
            "start_time": "2024-06-01T13:00:00Z",
            "end_time": "2024-06-01T14:00:00Z",
            "status": status,
            "final_price": "90.00",
            "created_at": "2024-05-01T12:00:00Z",
            "updated_at": "2024-05-01T12:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_cancel_booking_patches_without_body() {
        let transport = ScriptedTransport::new();
        transport.push_json(200, booking_json("CANCELLED"));
        let store = Arc::new(MemoryCredentialStore::with_credential(Credential::new("a", "r")));
        let client = client_with(CredentialMode::BearerToken, &transport, store);

        let booking = client.cancel_booking("b1").await.unwrap();

        assert_eq!(booking.status, BookingStatus::Cancelled);
        let sent = transport.last_request();
        assert_eq!(sent.method, Method::PATCH);
        assert_eq!(sent.url, "http://api.test/bookings/b1/cancel");
        assert_eq!(sent.body, None);
    }

    #[tokio::test]
    async fn test_conflicting_booking_surfaces_409() {
        let transport = ScriptedTransport::new();
        transport.push_json(409, json!({"error": "Horário indisponível"}));
        let store = Arc::new(MemoryCredentialStore::with_credential(Credential::new("a", "r")));
        let client = client_with(CredentialMode::BearerToken, &transport, store);

        let request = crate::models::CreateBookingRequest {
            service_variation_id: "v1".to_string(),
            start_time: "2024-06-01T13:00:00Z".parse().unwrap(),
        };
        let err = client.create_booking(&request).await.unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(err.message(), "Horário indisponível");
    }

    #[tokio::test]
    async fn test_provider_bookings_page_query() {
        let transport = ScriptedTransport::new();
        transport.push_json(
            200,
            json!({
                "data": [booking_json("CONFIRMED")],
                "pagination": {"total": 1, "page": 3, "limit": 1, "totalPages": 3}
            }),
        );
        let store = Arc::new(MemoryCredentialStore::with_credential(Credential::new("a", "r")));
        let client = client_with(CredentialMode::BearerToken, &transport, store);

        let page = client
            .get_provider_bookings(PageRequest::new(3, 1))
            .await
            .unwrap();

        assert_eq!(page.data.len(), 1);
        assert!(!page.has_next_page());
        assert_eq!(
            transport.last_request().url,
            "http://api.test/bookings/provider/my-bookings"
        );
    }
}

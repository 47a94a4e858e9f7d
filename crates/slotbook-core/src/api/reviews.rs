use super::{ApiClient, ApiError, RequestDescriptor};
use crate::models::{CreateReviewRequest, PageRequest, PaginatedResponse, Review};

impl ApiClient {
    pub async fn create_review(&self, data: &CreateReviewRequest) -> Result<Review, ApiError> {
        self.request(&RequestDescriptor::post("/reviews").authenticated().json(data)?)
            .await
    }

    pub async fn get_service_reviews(
        &self,
        service_id: &str,
        page: PageRequest,
    ) -> Result<PaginatedResponse<Review>, ApiError> {
        self.request(
            &RequestDescriptor::get(format!("/reviews/services/{}", service_id))
                .query("page", page.page)
                .query("limit", page.limit),
        )
        .await
    }
}

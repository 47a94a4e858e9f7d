//! Service catalogue endpoints.

use super::{ApiClient, ApiError, RequestDescriptor};
use crate::models::{
    CreateServiceRequest, PageRequest, PaginatedResponse, Service, ServiceQuery,
    UpdateServiceRequest,
};

/// Page size used by the popular-services listing when none is given
pub const POPULAR_SERVICES_LIMIT: u32 = 10;

impl ApiClient {
    /// Public service listing. Only the filters that are set are sent.
    pub async fn get_services(
        &self,
        query: &ServiceQuery,
    ) -> Result<PaginatedResponse<Service>, ApiError> {
        let descriptor = RequestDescriptor::get("/services")
            .query_opt("page", query.page.map(|p| p.page))
            .query_opt("limit", query.page.map(|p| p.limit))
            .query_opt("category", query.category.as_deref())
            .query_opt("sort", query.sort.as_deref())
            .query_opt("order", query.order.map(|o| o.as_str()));
        self.request(&descriptor).await
    }

    pub async fn get_service(&self, id: &str) -> Result<Service, ApiError> {
        self.request(&RequestDescriptor::get(format!("/services/{}", id)))
            .await
    }

    /// Distinct service categories.
    pub async fn get_service_types(&self) -> Result<Vec<String>, ApiError> {
        self.request(&RequestDescriptor::get("/services/types")).await
    }

    /// Most-booked services. `None` asks for the first page of
    /// `POPULAR_SERVICES_LIMIT` entries.
    pub async fn get_popular_services(
        &self,
        page: Option<PageRequest>,
    ) -> Result<PaginatedResponse<Service>, ApiError> {
        let page = page.unwrap_or(PageRequest::new(1, POPULAR_SERVICES_LIMIT));
        self.request(
            &RequestDescriptor::get("/services/popular")
                .query("page", page.page)
                .query("limit", page.limit),
        )
        .await
    }

    pub async fn create_service(&self, data: &CreateServiceRequest) -> Result<Service, ApiError> {
        self.request(&RequestDescriptor::post("/services").authenticated().json(data)?)
            .await
    }

    pub async fn update_service(
        &self,
        id: &str,
        data: &UpdateServiceRequest,
    ) -> Result<Service, ApiError> {
        self.request(
            &RequestDescriptor::put(format!("/services/{}", id))
                .authenticated()
                .json(data)?,
        )
        .await
    }

    pub async fn delete_service(&self, id: &str) -> Result<(), ApiError> {
        self.request(&RequestDescriptor::delete(format!("/services/{}", id)).authenticated())
            .await
    }

    /// Services owned by the logged-in provider.
    pub async fn get_my_services(
        &self,
        page: PageRequest,
    ) -> Result<PaginatedResponse<Service>, ApiError> {
        self.request(
            &RequestDescriptor::get("/services/provider/my-services")
                .authenticated()
                .query("page", page.page)
                .query("limit", page.limit),
        )
        .await
    }
}

//! Provider notification endpoints.

use super::{ApiClient, ApiError, RequestDescriptor};
use crate::models::{Notification, NotificationReadState, PaginatedResponse, UnreadCount};

impl ApiClient {
    /// Notifications of the logged-in provider (first page, unwrapped).
    pub async fn get_my_notifications(&self) -> Result<Vec<Notification>, ApiError> {
        let page: PaginatedResponse<Notification> = self
            .request(&RequestDescriptor::get("/notifications/my-notifications").authenticated())
            .await?;
        Ok(page.data)
    }

    pub async fn get_unread_count(&self) -> Result<u64, ApiError> {
        let unread: UnreadCount = self
            .request(&RequestDescriptor::get("/notifications/unread-count").authenticated())
            .await?;
        Ok(unread.count)
    }

    pub async fn mark_notification_read(&self, id: &str) -> Result<NotificationReadState, ApiError> {
        self.request(
            &RequestDescriptor::patch(format!("/notifications/{}/read", id)).authenticated(),
        )
        .await
    }
}

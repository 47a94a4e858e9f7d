use super::{ApiClient, ApiError, RequestDescriptor};
use crate::models::{PageRequest, PaginatedResponse, RecentSearches, Service};

impl ApiClient {
    /// Full-text service search. The query is URL-encoded by the transport.
    pub async fn search_services(
        &self,
        query: &str,
        page: PageRequest,
    ) -> Result<PaginatedResponse<Service>, ApiError> {
        self.request(
            &RequestDescriptor::get("/search")
                .query("q", query)
                .query("page", page.page)
                .query("limit", page.limit),
        )
        .await
    }

    /// Search terms recently used by the logged-in user.
    pub async fn get_recent_searches(&self) -> Result<Vec<String>, ApiError> {
        let recent: RecentSearches = self
            .request(&RequestDescriptor::get("/search/recent").authenticated())
            .await?;
        Ok(recent.recent)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::auth::{CredentialMode, MemoryCredentialStore};
    use crate::models::PageRequest;
    use crate::test_support::{client_with, page_json, ScriptedTransport};

    #[tokio::test]
    async fn test_search_passes_raw_query_for_encoding() {
        let transport = ScriptedTransport::new();
        transport.push_json(200, page_json(vec![]));
        let client = client_with(
            CredentialMode::BearerToken,
            &transport,
            Arc::new(MemoryCredentialStore::new()),
        );

        client
            .search_services("corte & barba", PageRequest::default())
            .await
            .unwrap();

        let sent = transport.last_request();
        assert_eq!(sent.url, "http://api.test/search");
        assert_eq!(sent.query[0], ("q".to_string(), "corte & barba".to_string()));
        assert_eq!(sent.query[2], ("limit".to_string(), "20".to_string()));
        assert_eq!(sent.bearer, None);
    }

    #[tokio::test]
    async fn test_recent_searches_unwraps_list() {
        let transport = ScriptedTransport::new();
        transport.push_json(200, json!({"recent": ["manicure", "massagem"]}));
        let client = client_with(
            CredentialMode::BearerToken,
            &transport,
            Arc::new(MemoryCredentialStore::new()),
        );

        let recent = client.get_recent_searches().await.unwrap();
        assert_eq!(recent, vec!["manicure", "massagem"]);
    }
}

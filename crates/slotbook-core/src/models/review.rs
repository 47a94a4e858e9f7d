use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewAuthor {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    #[serde(rename = "serviceId")]
    pub service_id: String,
    #[serde(rename = "clientId")]
    pub client_id: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub client: Option<ReviewAuthor>,
}

impl Review {
    pub fn author_name(&self) -> &str {
        self.client.as_ref().map(|c| c.name.as_str()).unwrap_or("Anonymous")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateReviewRequest {
    #[serde(rename = "serviceId")]
    pub service_id: String,
    pub rating: u8,
    pub comment: String,
}

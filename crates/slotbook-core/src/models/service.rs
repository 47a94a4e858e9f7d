use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pagination::PageRequest;

/// Provider summary embedded in service listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceProvider {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(rename = "providerId")]
    pub provider_id: String,
    #[serde(default)]
    pub provider: Option<ServiceProvider>,
    #[serde(default)]
    pub variations: Vec<ServiceVariation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Service {
    /// Cheapest variation by listed price, if any price parses.
    pub fn cheapest_variation(&self) -> Option<&ServiceVariation> {
        self.variations
            .iter()
            .filter_map(|v| v.price_value().map(|p| (v, p)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(v, _)| v)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceVariation {
    pub id: String,
    #[serde(rename = "serviceId")]
    pub service_id: String,
    pub name: String,
    /// Decimal price as sent by the server, e.g. `"120.00"`.
    pub price: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub discount_percentage: Option<f64>,
    /// Weekdays (0 = Sunday) on which the discount applies.
    #[serde(default)]
    pub discount_days: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub service: Option<Box<Service>>,
}

impl ServiceVariation {
    pub fn price_value(&self) -> Option<f64> {
        self.price.trim().parse().ok()
    }

    pub fn has_discount_on(&self, weekday: u8) -> bool {
        self.discount_percentage.is_some_and(|p| p > 0.0)
            && self
                .discount_days
                .as_ref()
                .is_some_and(|days| days.contains(&weekday))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewServiceVariation {
    pub name: String,
    pub price: f64,
    pub duration_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_days: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: String,
    pub category: String,
    pub photos: Vec<String>,
    pub variations: Vec<NewServiceVariation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateServiceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Filters for the public service listing. Unset fields are left out of the
/// query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceQuery {
    pub page: Option<PageRequest>,
    pub category: Option<String>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecentSearches {
    #[serde(default)]
    pub recent: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variation(price: &str) -> ServiceVariation {
        serde_json::from_value(serde_json::json!({
            "id": format!("v-{}", price),
            "serviceId": "s1",
            "name": "Basic",
            "price": price,
            "duration_minutes": 60,
            "discount_percentage": 10,
            "discount_days": [1, 3],
            "created_at": "2024-05-01T12:00:00Z",
            "updated_at": "2024-05-01T12:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_variation_discount_days() {
        let v = variation("50.00");
        assert!(v.has_discount_on(1));
        assert!(!v.has_discount_on(2));
        assert_eq!(v.price_value(), Some(50.0));
    }

    #[test]
    fn test_cheapest_variation_skips_unparseable_prices() {
        let service: Service = serde_json::from_value(serde_json::json!({
            "id": "s1",
            "name": "Corte",
            "description": "Corte de cabelo",
            "category": "beleza",
            "providerId": "p1",
            "created_at": "2024-05-01T12:00:00Z",
            "updated_at": "2024-05-01T12:00:00Z"
        }))
        .unwrap();
        assert!(service.cheapest_variation().is_none());

        let service = Service {
            variations: vec![variation("80.00"), variation("n/a"), variation("45.50")],
            ..service
        };
        assert_eq!(service.cheapest_variation().unwrap().price, "45.50");
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::service::ServiceVariation;
use super::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    #[serde(rename = "clientId")]
    pub client_id: String,
    #[serde(rename = "serviceVariationId")]
    pub service_variation_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub final_price: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "serviceVariation", default)]
    pub service_variation: Option<ServiceVariation>,
    #[serde(default)]
    pub client: Option<User>,
}

impl Booking {
    /// Only confirmed bookings that have not started can be cancelled.
    pub fn is_cancellable(&self, now: DateTime<Utc>) -> bool {
        self.status == BookingStatus::Confirmed && self.start_time > now
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    #[serde(rename = "serviceVariationId")]
    pub service_variation_id: String,
    pub start_time: DateTime<Utc>,
}

//! Slotbook core library.
//!
//! Client-side data access for the service-booking API:
//!
//! - `api`: the `ApiClient` request gateway with transparent session renewal,
//!   plus typed endpoint wrappers
//! - `auth`: session credentials and the stores that persist them
//! - `config`: API location and credential transport settings
//! - `models`: domain and request/response types
//! - `stores`: observable session, notification and toast state
//! - `utils`: display formatting for dates (fixed UTC-3), prices and phones

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod stores;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{ApiClient, ApiError, RequestDescriptor};
pub use auth::{Credential, CredentialMode, CredentialStore};
pub use config::Config;

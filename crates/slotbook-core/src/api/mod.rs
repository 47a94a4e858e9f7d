//! REST API client module for the booking service.
//!
//! This module provides the `ApiClient` for communicating with the booking
//! API: auth, users, services, bookings, availabilities, reviews,
//! notifications and search.
//!
//! Authenticated calls carry either a bearer token from a `CredentialStore`
//! or a server-managed session cookie, depending on the `CredentialMode`.

pub mod client;
pub mod error;
pub mod request;
pub mod transport;

mod auth;
mod availabilities;
mod bookings;
mod notifications;
mod reviews;
mod search;
mod services;

pub use client::ApiClient;
pub use error::{ApiError, ErrorBody, ErrorDetail, PathSegment, ValidationIssue};
pub use request::RequestDescriptor;
pub use transport::{ReqwestTransport, Transport, TransportError};

//! Data models for the booking API.
//!
//! This module contains the data structures exchanged with the API:
//!
//! - `User`, `UserRole` and the auth request/response bodies
//! - `Service`, `ServiceVariation` and their create/update requests
//! - `Booking`, `Availability`, `Review`, `Notification`
//! - `PaginatedResponse<T>` and the `PageRequest` used to ask for pages

pub mod availability;
pub mod booking;
pub mod notification;
pub mod pagination;
pub mod review;
pub mod service;
pub mod user;

pub use availability::{Availability, CreateAvailabilityRequest, UpdateAvailabilityRequest};
pub use booking::{Booking, BookingStatus, CreateBookingRequest};
pub use notification::{Notification, NotificationReadState, NotificationType, UnreadCount};
pub use pagination::{PageRequest, PaginatedResponse, Pagination};
pub use review::{CreateReviewRequest, Review, ReviewAuthor};
pub use service::{
    CreateServiceRequest, NewServiceVariation, RecentSearches, Service, ServiceProvider,
    ServiceQuery, ServiceVariation, SortOrder, UpdateServiceRequest,
};
pub use user::{
    LoginRequest, LoginResponse, RefreshTokenRequest, RegisterRequest, UpdateProfileRequest, User,
    UserRole,
};

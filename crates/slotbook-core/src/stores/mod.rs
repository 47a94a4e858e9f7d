//! Observable client state.
//!
//! Each store keeps its state in a `tokio::sync::watch` channel: callers
//! `subscribe()` to be woken on every change or take a `snapshot()`.
//!
//! - `AuthStore`: the logged-in user and the login/register/logout flows
//! - `NotificationsStore`: provider notifications and the unread counter
//! - `ToastQueue`: short-lived user-facing messages

pub mod auth;
pub mod notifications;
pub mod toast;

pub use auth::{AuthState, AuthStore};
pub use notifications::{NotificationsState, NotificationsStore, DEFAULT_POLL_INTERVAL};
pub use toast::{Toast, ToastKind, ToastQueue, DEFAULT_TOAST_DURATION};

//! Authentication module for session credentials.
//!
//! This module provides:
//! - `Credential`: the access/refresh token pair issued at login
//! - `CredentialMode`: how credentials travel (bearer header or session cookie)
//! - `CredentialStore`: the read/write/clear seam the `ApiClient` depends on,
//!   with in-memory, file and OS keychain implementations

pub mod credentials;
pub mod session;

pub use credentials::{
    Credential, CredentialMode, CredentialStore, CredentialStoreError, KeyringCredentialStore,
    MemoryCredentialStore,
};
pub use session::FileCredentialStore;

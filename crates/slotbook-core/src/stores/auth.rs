use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::CredentialMode;
use crate::models::{LoginRequest, RegisterRequest, UpdateProfileRequest, User};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_loading: bool,
    /// Set once the first session check has completed
    pub is_initialized: bool,
    pub error: Option<String>,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_provider(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_provider)
    }

    pub fn is_client(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_client)
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}

/// Session state of the current user, driven by the account endpoints.
pub struct AuthStore {
    client: ApiClient,
    state: watch::Sender<AuthState>,
}

impl AuthStore {
    pub fn new(client: ApiClient) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self { client, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Restore the session on startup by fetching the profile.
    ///
    /// In session-cookie mode an expired session gets one explicit renewal
    /// before giving up. Never fails: without a session the user is `None`.
    pub async fn load_user(&self) {
        let user = match self.client.get_profile().await {
            Ok(user) => Some(user),
            Err(e) if e.is_unauthorized() && self.client.mode() == CredentialMode::SessionCookie => {
                self.renew_and_fetch_profile().await
            }
            Err(e) => {
                debug!(error = %e, "No active session");
                None
            }
        };

        self.state.send_modify(|s| {
            s.user = user;
            s.is_initialized = true;
        });
    }

    async fn renew_and_fetch_profile(&self) -> Option<User> {
        if let Err(e) = self.client.renew().await {
            debug!(error = %e, "Session cookie could not be renewed");
            return None;
        }
        match self.client.get_profile().await {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Profile still unavailable after session renewal");
                None
            }
        }
    }

    pub async fn login(&self, credentials: &LoginRequest) -> Result<User, ApiError> {
        self.begin();
        let result = async {
            self.client.login(credentials).await?;
            self.client.get_profile().await
        }
        .await;
        self.finish_with_user(result, true)
    }

    /// Register, then log in with the same credentials.
    /// Returns the account as created by the register call.
    pub async fn register(&self, data: &RegisterRequest) -> Result<User, ApiError> {
        self.begin();
        let result = async {
            let registered = self.client.register(data).await?;
            self.client.login(&data.login_request()).await?;
            let profile = self.client.get_profile().await?;
            Ok((registered, profile))
        }
        .await;

        match result {
            Ok((registered, profile)) => {
                info!(user_id = %registered.id, "Registered new account");
                self.finish_with_user(Ok(profile), true)?;
                Ok(registered)
            }
            Err(e) => self.finish_with_user(Err(e), true),
        }
    }

    /// Log out and reset the state, even if clearing credentials failed.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = self.client.logout().await;
        self.state.send_replace(AuthState {
            is_initialized: true,
            ..AuthState::default()
        });
        result
    }

    pub async fn update_profile(&self, data: &UpdateProfileRequest) -> Result<User, ApiError> {
        self.begin();
        let result = self.client.update_profile(data).await;
        self.finish_with_user(result, false)
    }

    pub fn clear_error(&self) {
        self.state.send_modify(|s| s.error = None);
    }

    fn begin(&self) {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });
    }

    fn finish_with_user(
        &self,
        result: Result<User, ApiError>,
        mark_initialized: bool,
    ) -> Result<User, ApiError> {
        match &result {
            Ok(user) => self.state.send_modify(|s| {
                s.user = Some(user.clone());
                s.is_loading = false;
                if mark_initialized {
                    s.is_initialized = true;
                }
            }),
            Err(e) => {
                let message = e.message();
                self.state.send_modify(|s| {
                    s.error = Some(message);
                    s.is_loading = false;
                });
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::auth::{Credential, CredentialStore, MemoryCredentialStore};
    use crate::models::UserRole;
    use crate::test_support::{client_with, user_json, ScriptedTransport};

    fn login_request() -> LoginRequest {
        LoginRequest {
            email: "ana@example.com".to_string(),
            password: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_populates_user() {
        let transport = ScriptedTransport::new();
        transport.push_json(200, json!({"token": "a1", "refreshToken": "r1"}));
        transport.push_json(200, user_json("PROVIDER"));
        let store = AuthStore::new(client_with(
            CredentialMode::BearerToken,
            &transport,
            Arc::new(MemoryCredentialStore::new()),
        ));
        let rx = store.subscribe();

        let user = store.login(&login_request()).await.unwrap();

        assert_eq!(user.role, UserRole::Provider);
        let state = rx.borrow().clone();
        assert!(state.is_authenticated());
        assert!(state.is_provider());
        assert!(!state.is_client());
        assert!(state.is_initialized);
        assert!(!state.is_loading);
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn test_login_failure_records_error() {
        let transport = ScriptedTransport::new();
        transport.push_json(401, json!({"error": "Invalid credentials"}));
        let store = AuthStore::new(client_with(
            CredentialMode::BearerToken,
            &transport,
            Arc::new(MemoryCredentialStore::new()),
        ));

        let err = store.login(&login_request()).await.unwrap_err();

        assert!(err.is_unauthorized());
        let state = store.snapshot();
        assert_eq!(state.error.as_deref(), Some("Invalid credentials"));
        assert!(!state.is_loading);
        assert!(!state.is_authenticated());

        store.clear_error();
        assert_eq!(store.snapshot().error, None);
    }

    #[tokio::test]
    async fn test_register_logs_in_afterwards() {
        let transport = ScriptedTransport::new();
        transport.push_json(201, user_json("CLIENT"));
        transport.push_json(200, json!({"token": "a1", "refreshToken": "r1"}));
        transport.push_json(200, user_json("CLIENT"));
        let credentials = Arc::new(MemoryCredentialStore::new());
        let store = AuthStore::new(client_with(
            CredentialMode::BearerToken,
            &transport,
            credentials.clone(),
        ));

        let request = RegisterRequest {
            email: "ana@example.com".to_string(),
            password: "secret".to_string(),
            name: "Ana".to_string(),
            role: UserRole::Client,
            phone: "11999990000".to_string(),
        };
        store.register(&request).await.unwrap();

        assert!(store.snapshot().is_client());
        assert!(credentials.read().unwrap().is_some());
        let urls: Vec<_> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "http://api.test/auth/register",
                "http://api.test/auth/login",
                "http://api.test/users/profile",
            ]
        );
    }

    #[tokio::test]
    async fn test_load_user_without_session_marks_initialized() {
        let transport = ScriptedTransport::new();
        transport.push_json(401, json!({"error": "Unauthorized"}));
        let store = AuthStore::new(client_with(
            CredentialMode::BearerToken,
            &transport,
            Arc::new(MemoryCredentialStore::new()),
        ));

        store.load_user().await;

        let state = store.snapshot();
        assert!(state.is_initialized);
        assert!(!state.is_authenticated());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_load_user_renews_cookie_session_once() {
        let transport = ScriptedTransport::new();
        transport.push_json(401, json!({"error": "Session expired"}));
        transport.push_empty(204);
        transport.push_json(200, user_json("CLIENT"));
        let store = AuthStore::new(client_with(
            CredentialMode::SessionCookie,
            &transport,
            Arc::new(MemoryCredentialStore::new()),
        ));

        store.load_user().await;

        assert!(store.snapshot().is_authenticated());
        let urls: Vec<_> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "http://api.test/users/profile",
                "http://api.test/auth/refresh",
                "http://api.test/users/profile",
            ]
        );
    }

    #[tokio::test]
    async fn test_logout_resets_state() {
        let transport = ScriptedTransport::new();
        transport.push_json(200, user_json("CLIENT"));
        let credentials = Arc::new(MemoryCredentialStore::with_credential(Credential::new("a", "r")));
        let store = AuthStore::new(client_with(
            CredentialMode::BearerToken,
            &transport,
            credentials.clone(),
        ));
        store.load_user().await;
        assert!(store.snapshot().is_authenticated());

        store.logout().await.unwrap();

        let state = store.snapshot();
        assert!(!state.is_authenticated());
        assert!(state.is_initialized);
        assert!(credentials.read().unwrap().is_none());
    }
}

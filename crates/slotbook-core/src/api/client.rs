//! API client for the booking service.
//!
//! `ApiClient` issues every request through one pipeline:
//!
//! 1. attempt: send the request, with the stored bearer token when the call
//!    requires authentication (bearer mode only)
//! 2. on `401` for an authenticated call in bearer mode: renew the session
//!    once and attempt again with whatever credential the store now holds
//!
//! A failed renewal clears the stored credential and the original `401` is
//! returned. In session-cookie mode the transport's cookie jar carries the
//! session and `401`s are returned as-is; callers renew explicitly.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::request::RequestDescriptor;
use super::transport::{OutgoingRequest, ReqwestTransport, Transport, TransportResponse};
use super::ApiError;
use crate::auth::{Credential, CredentialMode, CredentialStore};
use crate::config::Config;
use crate::models::{LoginResponse, RefreshTokenRequest};

/// Session renewal endpoint
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Outcome of a single send: the response and the bearer token it carried.
struct Attempt {
    response: TransportResponse,
    bearer: Option<String>,
}

/// API client for the booking service.
/// Clone is cheap - all state is shared behind `Arc`s.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialStore>,
    base_url: Arc<str>,
    mode: CredentialMode,
    // Serializes renewals so concurrent 401s trigger a single refresh
    renewal: Arc<Mutex<()>>,
}

impl ApiClient {
    /// Create a client talking to `config.api_url` over HTTP.
    pub fn new(config: &Config, credentials: Arc<dyn CredentialStore>) -> Result<Self, ApiError> {
        reqwest::Url::parse(config.base_url())
            .map_err(|e| ApiError::Config(format!("invalid API URL {:?}: {}", config.api_url, e)))?;

        let transport = ReqwestTransport::new(
            Duration::from_secs(config.request_timeout_secs),
            config.credential_mode,
        )?;

        Ok(Self::with_transport(
            config.base_url(),
            config.credential_mode,
            Arc::new(transport),
            credentials,
        ))
    }

    /// Create a client over an arbitrary transport.
    pub fn with_transport(
        base_url: &str,
        mode: CredentialMode,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            transport,
            credentials,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            mode,
            renewal: Arc::new(Mutex::new(())),
        }
    }

    pub fn mode(&self) -> CredentialMode {
        self.mode
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn credential_store(&self) -> &dyn CredentialStore {
        self.credentials.as_ref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ===== Request pipeline =====

    /// Execute a request, renewing the session and resending once if an
    /// authenticated call is rejected with `401` in bearer mode.
    ///
    /// Returns `Ok(None)` for responses without a body (e.g. `204`).
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> Result<Option<Value>, ApiError> {
        let first = self.attempt(descriptor).await?;

        let response = if self.should_renew(descriptor, first.response.status) {
            self.resend_after_renewal(descriptor, first).await?
        } else {
            first.response
        };

        Self::into_body(descriptor, response)
    }

    /// Execute a request and decode the body into `T`.
    /// An empty response decodes as JSON `null`, so `()` and `Option<_>` work.
    pub async fn request<T: DeserializeOwned>(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<T, ApiError> {
        let body = self.execute(descriptor).await?.unwrap_or(Value::Null);
        serde_json::from_value(body).map_err(|e| {
            ApiError::InvalidResponse(format!("{} {}: {}", descriptor.method, descriptor.path, e))
        })
    }

    async fn attempt(&self, descriptor: &RequestDescriptor) -> Result<Attempt, ApiError> {
        let bearer = self.bearer_for(descriptor)?;

        debug!(
            method = %descriptor.method,
            path = %descriptor.path,
            authenticated = bearer.is_some(),
            "Sending request"
        );

        let response = self
            .transport
            .send(OutgoingRequest {
                method: descriptor.method.clone(),
                url: self.url(&descriptor.path),
                query: descriptor.query.clone(),
                bearer: bearer.clone(),
                body: descriptor.body.clone(),
            })
            .await?;

        debug!(path = %descriptor.path, status = %response.status, "Response received");
        Ok(Attempt { response, bearer })
    }

    /// Bearer token to attach; read fresh from the store on every attempt.
    fn bearer_for(&self, descriptor: &RequestDescriptor) -> Result<Option<String>, ApiError> {
        if !descriptor.requires_auth || self.mode != CredentialMode::BearerToken {
            return Ok(None);
        }
        Ok(self.credentials.read()?.map(|c| c.access_token))
    }

    fn should_renew(&self, descriptor: &RequestDescriptor, status: StatusCode) -> bool {
        status == StatusCode::UNAUTHORIZED
            && descriptor.requires_auth
            && self.mode == CredentialMode::BearerToken
    }

    async fn resend_after_renewal(
        &self,
        descriptor: &RequestDescriptor,
        rejected: Attempt,
    ) -> Result<TransportResponse, ApiError> {
        match self.renew_tokens(rejected.bearer.as_deref()).await {
            Ok(_) => {
                debug!(path = %descriptor.path, "Resending request after session renewal");
                Ok(self.attempt(descriptor).await?.response)
            }
            Err(e) => {
                debug!(path = %descriptor.path, error = %e, "Renewal unavailable, returning original 401");
                Ok(rejected.response)
            }
        }
    }

    fn into_body(
        descriptor: &RequestDescriptor,
        response: TransportResponse,
    ) -> Result<Option<Value>, ApiError> {
        let status = response.status;

        if !status.is_success() {
            debug!(
                path = %descriptor.path,
                status = %status,
                body = %ApiError::truncate_body(&response.body),
                "Request failed"
            );
            return Err(ApiError::Http {
                status,
                body: super::ErrorBody::parse(&response.body),
            });
        }

        if status == StatusCode::NO_CONTENT || response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        serde_json::from_slice(&response.body).map(Some).map_err(|e| {
            ApiError::InvalidResponse(format!("{} {}: {}", descriptor.method, descriptor.path, e))
        })
    }

    // ===== Session renewal =====

    /// Renew the session explicitly.
    ///
    /// Bearer mode: exchanges the stored refresh token for a new pair and
    /// returns it. Session-cookie mode: asks the server to refresh its
    /// cookie and returns `None`.
    pub async fn renew(&self) -> Result<Option<Credential>, ApiError> {
        match self.mode {
            CredentialMode::BearerToken => self.renew_tokens(None).await.map(Some),
            CredentialMode::SessionCookie => self.renew_cookie_session().await.map(|()| None),
        }
    }

    /// Exchange the refresh token for a new pair.
    ///
    /// `rejected` is the access token a failed request carried. If the store
    /// already holds a different one, a concurrent renewal has replaced it and
    /// that credential is returned without another refresh.
    async fn renew_tokens(&self, rejected: Option<&str>) -> Result<Credential, ApiError> {
        let _guard = self.renewal.lock().await;

        let Some(current) = self
            .credentials
            .read()?
            .filter(|c| !c.refresh_token.is_empty())
        else {
            debug!("No refresh token stored, cannot renew session");
            return Err(ApiError::AuthExpired);
        };

        if let Some(rejected) = rejected {
            if current.access_token != rejected {
                debug!("Session already renewed by a concurrent request");
                return Ok(current);
            }
        }

        let request = OutgoingRequest {
            method: Method::POST,
            url: self.url(REFRESH_PATH),
            query: Vec::new(),
            bearer: None,
            body: Some(serde_json::to_value(RefreshTokenRequest {
                refresh_token: current.refresh_token,
            })
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?),
        };

        let renewed = match self.transport.send(request).await {
            Ok(response) if response.status.is_success() => {
                serde_json::from_slice::<LoginResponse>(&response.body)
                    .map_err(|e| format!("undecodable refresh response: {}", e))
            }
            Ok(response) => Err(format!("refresh rejected with status {}", response.status)),
            Err(e) => Err(format!("refresh request failed: {}", e)),
        };

        match renewed {
            Ok(tokens) => {
                let credential = Credential::new(tokens.token, tokens.refresh_token);
                self.credentials.write(&credential)?;
                info!("Session renewed");
                Ok(credential)
            }
            Err(reason) => {
                warn!(reason = %reason, "Session renewal failed, clearing stored credentials");
                self.credentials.clear()?;
                Err(ApiError::AuthExpired)
            }
        }
    }

    async fn renew_cookie_session(&self) -> Result<(), ApiError> {
        let _guard = self.renewal.lock().await;

        let response = self
            .transport
            .send(OutgoingRequest {
                method: Method::POST,
                url: self.url(REFRESH_PATH),
                query: Vec::new(),
                bearer: None,
                body: None,
            })
            .await?;

        if response.status.is_success() {
            info!("Session cookie renewed");
            Ok(())
        } else {
            warn!(status = %response.status, "Session cookie renewal rejected");
            Err(ApiError::AuthExpired)
        }
    }
}

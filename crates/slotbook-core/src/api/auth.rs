//! Account endpoints: register, login/logout and the user profile.

use tracing::{info, warn};

use super::{ApiClient, ApiError, RequestDescriptor};
use crate::auth::{Credential, CredentialMode};
use crate::models::{
    LoginRequest, LoginResponse, PageRequest, PaginatedResponse, RegisterRequest,
    UpdateProfileRequest, User,
};

impl ApiClient {
    pub async fn register(&self, data: &RegisterRequest) -> Result<User, ApiError> {
        self.request(&RequestDescriptor::post("/auth/register").json(data)?)
            .await
    }

    /// Log in. In bearer mode the returned token pair is persisted; in
    /// session-cookie mode the server sets the session cookie.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<(), ApiError> {
        let descriptor = RequestDescriptor::post("/auth/login").json(credentials)?;

        match self.mode() {
            CredentialMode::BearerToken => {
                let tokens: LoginResponse = self.request(&descriptor).await?;
                self.credential_store()
                    .write(&Credential::new(tokens.token, tokens.refresh_token))?;
            }
            CredentialMode::SessionCookie => {
                self.execute(&descriptor).await?;
            }
        }

        info!(email = %credentials.email, "Logged in");
        Ok(())
    }

    /// End the session. Local credentials are always cleared, even when the
    /// server-side logout fails.
    pub async fn logout(&self) -> Result<(), ApiError> {
        if self.mode() == CredentialMode::SessionCookie {
            if let Err(e) = self.execute(&RequestDescriptor::post("/auth/logout")).await {
                warn!(error = %e, "Server logout failed");
            }
        }
        self.credential_store().clear()?;
        info!("Logged out");
        Ok(())
    }

    pub async fn get_profile(&self) -> Result<User, ApiError> {
        self.request(&RequestDescriptor::get("/users/profile").authenticated())
            .await
    }

    pub async fn update_profile(&self, data: &UpdateProfileRequest) -> Result<User, ApiError> {
        self.request(
            &RequestDescriptor::put("/users/profile")
                .authenticated()
                .json(data)?,
        )
        .await
    }

    pub async fn get_providers(&self, page: PageRequest) -> Result<PaginatedResponse<User>, ApiError> {
        self.request(
            &RequestDescriptor::get("/users/providers")
                .query("page", page.page)
                .query("limit", page.limit),
        )
        .await
    }
}

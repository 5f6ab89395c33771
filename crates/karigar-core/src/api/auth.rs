//! Authentication endpoints.
//!
//! Login and registration return the full session payload; persisting it is
//! the caller's job (via [`SessionStore`](crate::session::SessionStore)), so
//! the lifecycle stays explicit. Token refresh is internal to the client and
//! not exposed here.

use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiError};
use crate::session::{Session, UserRecord};

/// Login credentials.
#[derive(Debug, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Registration payload. `password_confirm` must match `password`; the
/// server validates it.
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    /// "customer" or "provider"
    pub user_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Response shared by login and registration.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub user: UserRecord,
    pub access_token: String,
    pub refresh_token: String,
}

impl AuthResponse {
    /// Converts the server payload into a storable session.
    pub fn into_session(self) -> Session {
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            user: self.user,
        }
    }
}

#[derive(Debug, Serialize)]
struct LogoutRequest<'a> {
    refresh_token: &'a str,
}

impl ApiClient {
    /// Authenticates with username and password.
    ///
    /// # Errors
    /// Returns an error if the operation fails. Bad credentials surface as a
    /// 400 with field errors.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.post("/auth/login/", credentials).await
    }

    /// Creates a new account.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.post("/auth/register/", request).await
    }

    /// Invalidates the refresh token server-side.
    ///
    /// Best-effort: callers clear the local session whether or not this
    /// succeeds.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .post("/auth/logout/", &LogoutRequest { refresh_token })
            .await?;
        Ok(())
    }

    /// Fetches the current user's profile.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn profile(&self) -> Result<UserRecord, ApiError> {
        self.get("/auth/profile/", &[]).await
    }
}

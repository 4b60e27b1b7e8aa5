//! Authentication endpoints.

use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use tangelo_core::{Email, UserRole};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::types::{AuthResponse, LoginRequest, RegisterRequest};

/// Client for `/auth` endpoints.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Exchange credentials for a bearer token and identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; invalid credentials surface as
    /// [`ApiError::Unauthorized`].
    #[instrument(skip_all, fields(email = %email))]
    pub async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthResponse, ApiError> {
        self.api
            .post(
                "/auth/login",
                &LoginRequest {
                    email: email.clone(),
                    password: password.expose_secret().to_owned(),
                },
            )
            .await
    }

    /// Create an account and receive an initial session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; field problems surface as
    /// [`ApiError::Validation`].
    #[instrument(skip_all, fields(email = %email))]
    pub async fn register(
        &self,
        email: &Email,
        password: &SecretString,
        role: Option<UserRole>,
    ) -> Result<AuthResponse, ApiError> {
        self.api
            .post(
                "/auth/register",
                &RegisterRequest {
                    email: email.clone(),
                    password: password.expose_secret().to_owned(),
                    role,
                },
            )
            .await
    }
}

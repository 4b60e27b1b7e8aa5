//! Unified error handling for the storefront client.
//!
//! All HTTP-layer failures are classified once, at the API client boundary,
//! into [`ApiError`]. The mapping to user-visible notifications lives here
//! too, so calling code never re-renders a different message for the same
//! failure.

use thiserror::Error;

/// A field-level validation message returned by the backend on 422.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Name of the offending request field.
    pub field: String,
    /// Human-readable message for that field.
    pub message: String,
}

/// Failure of a single backend request, classified by cause.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend rejected the credential (HTTP 401).
    #[error("authentication rejected")]
    Unauthorized,

    /// The authenticated user lacks permission (HTTP 403).
    #[error("permission denied")]
    Forbidden,

    /// The resource does not exist (HTTP 404).
    #[error("resource not found")]
    NotFound,

    /// The backend rejected the request payload (HTTP 422).
    #[error("validation failed ({} field error(s))", .0.len())]
    Validation(Vec<FieldError>),

    /// The backend faulted (HTTP 5xx).
    #[error("server error (HTTP {status})")]
    Server { status: u16 },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body did not match the expected envelope shape.
    ///
    /// Decode failures are loud and tagged with the endpoint; the client
    /// never papers over a shape mismatch with default-valued fields.
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// Any other failure response.
    #[error("unexpected response (HTTP {status})")]
    Unexpected {
        status: u16,
        message: Option<String>,
    },
}

impl ApiError {
    /// The user-visible notification(s) for this failure.
    ///
    /// Validation failures yield one notice per field message. 401 yields
    /// none here: the session layer owns the forced-logout notice so it can
    /// suppress it on the login view.
    #[must_use]
    pub fn user_notices(&self) -> Vec<String> {
        match self {
            Self::Unauthorized => Vec::new(),
            Self::Forbidden => {
                vec!["You do not have permission to perform this action.".to_owned()]
            }
            Self::NotFound => vec!["Resource not found.".to_owned()],
            Self::Validation(fields) => {
                fields.iter().map(|f| f.message.clone()).collect()
            }
            Self::Server { .. } => vec!["Server error. Please try again later.".to_owned()],
            Self::Network(_) => {
                vec!["Network error. Please check your connection.".to_owned()]
            }
            Self::Unexpected {
                message: Some(message),
                ..
            } => vec![message.clone()],
            Self::Decode { .. } | Self::Unexpected { message: None, .. } => {
                vec!["An unexpected error occurred.".to_owned()]
            }
        }
    }
}

/// Failure of a storefront operation: either a backend failure or a
/// client-side rejection that never produced a request.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Quantities below 1 are rejected before any request is issued; a
    /// decrement to zero must route through remove instead.
    #[error("quantity must be at least 1; remove the item instead")]
    QuantityBelowMinimum,

    /// A checkout request is already in flight.
    #[error("a checkout is already in progress")]
    CheckoutInProgress,
}

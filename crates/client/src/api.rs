//! HTTP client adapter for the Tangelo backend.
//!
//! Wraps all outbound requests: attaches the bearer credential, decodes the
//! `{ success, data }` response envelope at a typed boundary, classifies
//! failures into [`ApiError`], and emits user-visible notifications exactly
//! once per failure.

use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tangelo_core::Credential;

use crate::config::{ClientConfig, ConfigError};
use crate::error::{ApiError, FieldError};
use crate::notify::{NoticeLevel, Notifier};

/// Supplies the current bearer credential, if any.
///
/// Implemented by the auth session store; the adapter itself holds no
/// authentication state.
pub trait BearerSource: Send + Sync {
    fn bearer(&self) -> Option<Credential>;
}

/// Successful response envelope: `{ success, data }`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    data: T,
}

/// Failure response body: `{ message?, errors? }` with per-field messages.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<BTreeMap<String, Vec<String>>>,
}

/// List-endpoint payload with pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub limit: u64,
    pub page: u64,
}

impl<T> Paginated<T> {
    /// Number of pages implied by `total` and `limit`.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            0
        } else {
            self.total.div_ceil(self.limit)
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the Tangelo backend REST API.
///
/// Cheaply cloneable via `Arc`; one instance is shared by all services.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    /// Base URL with any trailing slash removed; paths are joined textually
    /// because `Url::join` would resolve absolute paths against the host,
    /// dropping the `/api/v1` prefix.
    base_url: String,
    bearer: Arc<dyn BearerSource>,
    notifier: Arc<dyn Notifier>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(
        config: &ClientConfig,
        bearer: Arc<dyn BearerSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let base_url = config.api_base_url.as_str().trim_end_matches('/').to_owned();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url,
                bearer,
                notifier,
            }),
        })
    }

    /// Issue a GET request.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] classifying the failure.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(Method::GET, path, None::<&()>).await
    }

    /// Issue a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] classifying the failure.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(Method::POST, path, Some(body)).await
    }

    /// Issue a POST request without a body.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] classifying the failure.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(Method::POST, path, None::<&()>).await
    }

    /// Issue a PUT request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] classifying the failure.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(Method::PUT, path, Some(body)).await
    }

    /// Issue a PATCH request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] classifying the failure.
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(Method::PATCH, path, Some(body)).await
    }

    /// Issue a DELETE request.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] classifying the failure.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(Method::DELETE, path, None::<&()>).await
    }

    /// Execute a request and surface any failure as notifications, exactly
    /// once, before returning it.
    async fn execute<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        match self.dispatch(method, path, body).await {
            Ok(value) => Ok(value),
            Err(err) => {
                for notice in err.user_notices() {
                    self.inner.notifier.notify(NoticeLevel::Error, &notice);
                }
                Err(err)
            }
        }
    }

    #[instrument(skip_all, fields(method = %method, path = %path))]
    async fn dispatch<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{path}", self.inner.base_url);

        let mut request = self.inner.http.request(method, url);
        if let Some(credential) = self.inner.bearer.bearer() {
            request = request.bearer_auth(credential.expose());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(classify_failure(status, &text));
        }

        match serde_json::from_str::<Envelope<T>>(&text) {
            Ok(envelope) if envelope.success => Ok(envelope.data),
            Ok(envelope) => Err(ApiError::Unexpected {
                status: status.as_u16(),
                message: envelope.message,
            }),
            Err(source) => {
                tracing::error!(
                    endpoint = %path,
                    body = %truncate(&text),
                    "failed to decode response envelope"
                );
                Err(ApiError::Decode {
                    endpoint: path.to_owned(),
                    source,
                })
            }
        }
    }
}

/// Classify a non-success HTTP response into the error taxonomy.
fn classify_failure(status: StatusCode, body: &str) -> ApiError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();

    match status.as_u16() {
        401 => ApiError::Unauthorized,
        403 => ApiError::Forbidden,
        404 => ApiError::NotFound,
        422 => match parsed.errors {
            Some(errors) if !errors.is_empty() => ApiError::Validation(
                errors
                    .into_iter()
                    .flat_map(|(field, messages)| {
                        messages.into_iter().map(move |message| FieldError {
                            field: field.clone(),
                            message,
                        })
                    })
                    .collect(),
            ),
            _ => ApiError::Unexpected {
                status: 422,
                message: parsed.message,
            },
        },
        500..=599 => ApiError::Server {
            status: status.as_u16(),
        },
        other => ApiError::Unexpected {
            status: other,
            message: parsed.message,
        },
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(500).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_401() {
        let err = classify_failure(StatusCode::UNAUTHORIZED, "{}");
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn test_classify_422_with_field_errors() {
        let body = r#"{"errors": {"quantity": ["Insufficient stock"], "email": ["Taken", "Invalid"]}}"#;
        let err = classify_failure(StatusCode::UNPROCESSABLE_ENTITY, body);
        let ApiError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        // BTreeMap keys sort alphabetically
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].field, "email");
        assert_eq!(fields[0].message, "Taken");
        assert_eq!(fields[2].field, "quantity");
        assert_eq!(fields[2].message, "Insufficient stock");
    }

    #[test]
    fn test_classify_422_without_field_errors_keeps_message() {
        let body = r#"{"message": "Cart is empty"}"#;
        let err = classify_failure(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert!(matches!(
            err,
            ApiError::Unexpected { status: 422, message: Some(ref m) } if m == "Cart is empty"
        ));
    }

    #[test]
    fn test_classify_5xx() {
        let err = classify_failure(StatusCode::BAD_GATEWAY, "upstream exploded");
        assert!(matches!(err, ApiError::Server { status: 502 }));
    }

    #[test]
    fn test_classify_unparseable_body_falls_back() {
        let err = classify_failure(StatusCode::CONFLICT, "<html>not json</html>");
        assert!(matches!(
            err,
            ApiError::Unexpected {
                status: 409,
                message: None
            }
        ));
    }

    #[test]
    fn test_envelope_success_false_is_surfaced() {
        let body = r#"{"success": false, "message": "nope", "data": null}"#;
        let envelope: Envelope<Option<()>> = serde_json::from_str(body).unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.message.as_deref(), Some("nope"));
    }

    #[test]
    fn test_paginated_total_pages() {
        let page = Paginated::<u8> {
            data: vec![],
            total: 21,
            limit: 10,
            page: 1,
        };
        assert_eq!(page.total_pages(), 3);

        let empty = Paginated::<u8> {
            data: vec![],
            total: 0,
            limit: 10,
            page: 1,
        };
        assert_eq!(empty.total_pages(), 0);
    }

    #[test]
    fn test_paginated_zero_limit_has_no_pages() {
        let page = Paginated::<u8> {
            data: vec![],
            total: 5,
            limit: 0,
            page: 1,
        };
        assert_eq!(page.total_pages(), 0);
    }
}

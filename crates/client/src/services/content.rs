//! Subscription-gated digital content.

use tracing::instrument;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::types::DigitalContent;

/// Client for the `/digital-content` endpoint.
#[derive(Clone)]
pub struct ContentService {
    api: ApiClient,
}

impl ContentService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Fetch the premium content payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; users without an active
    /// subscription surface as [`ApiError::Forbidden`].
    #[instrument(skip(self))]
    pub async fn digital_content(&self) -> Result<DigitalContent, ApiError> {
        self.api.get("/digital-content").await
    }
}

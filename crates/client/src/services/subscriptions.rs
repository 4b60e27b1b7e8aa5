//! Subscription lifecycle endpoints.
//!
//! The backend and payment processor own the lifecycle; this service only
//! starts externally hosted sessions and reads state back.

use tracing::instrument;

use tangelo_core::{PlanId, SubscriptionId};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::types::{
    CheckoutAck, CheckoutSession, PortalSession, SubscriptionCheckoutRequest, UserSubscription,
};

/// Client for `/subscriptions` endpoints.
#[derive(Clone)]
pub struct SubscriptionService {
    api: ApiClient,
}

impl SubscriptionService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Request an externally hosted checkout session for a plan.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(plan_id = %plan_id))]
    pub async fn create_checkout_session(
        &self,
        plan_id: &PlanId,
    ) -> Result<CheckoutSession, ApiError> {
        self.api
            .post(
                "/subscriptions/checkout/create-session",
                &SubscriptionCheckoutRequest {
                    plan_id: plan_id.clone(),
                },
            )
            .await
    }

    /// Report a completed subscription checkout.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn confirm_checkout(&self, session_id: &str) -> Result<CheckoutAck, ApiError> {
        self.api
            .get(&format!(
                "/subscriptions/checkout/success?session_id={session_id}"
            ))
            .await
    }

    /// Report an abandoned subscription checkout.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn cancel_checkout(&self) -> Result<CheckoutAck, ApiError> {
        self.api.get("/subscriptions/checkout/cancel").await
    }

    /// The signed-in user's subscription, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn my_subscription(&self) -> Result<Option<UserSubscription>, ApiError> {
        self.api.get("/subscriptions/me").await
    }

    /// Request an externally hosted subscription-management portal session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn create_portal_session(&self) -> Result<PortalSession, ApiError> {
        self.api.post_empty("/subscriptions/portal-session").await
    }

    /// Cancel a subscription.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(subscription_id = %id))]
    pub async fn cancel(&self, id: &SubscriptionId) -> Result<(), ApiError> {
        let _: serde_json::Value = self.api.delete(&format!("/subscriptions/{id}")).await?;
        Ok(())
    }
}

//! Subscription commands.

use clap::Subcommand;

use tangelo_core::{PlanId, SubscriptionId};

use super::{CommandError, effect_navigation, storefront};

#[derive(Subcommand)]
pub enum SubscriptionAction {
    /// List available plans
    Plans,
    /// Show the signed-in user's subscription
    Me,
    /// Start a subscription checkout and print the payment URL
    Subscribe {
        /// Plan ID
        plan_id: String,
    },
    /// Open the subscription-management portal
    Portal,
    /// Cancel a subscription
    Cancel {
        /// Subscription ID
        subscription_id: String,
    },
    /// Fetch the subscriber-only content payload
    Content,
}

pub async fn run(action: SubscriptionAction) -> Result<(), CommandError> {
    let store = storefront().await?;

    match action {
        SubscriptionAction::Plans => {
            let plans = store.plans().await.into_result()?;
            for plan in &plans {
                let product = plan
                    .product
                    .as_ref()
                    .map_or("(unknown product)", |p| p.name.as_str());
                tracing::info!(
                    "  {}  {}  {:?}  {}",
                    plan.id,
                    product,
                    plan.frequency,
                    plan.currency
                );
            }
        }
        SubscriptionAction::Me => match store.my_subscription().await.into_result()? {
            Some(sub) => {
                tracing::info!("Subscription {} ({})", sub.id, sub.status);
                tracing::info!(
                    "  current period: {} - {}",
                    sub.current_period_start,
                    sub.current_period_end
                );
                if sub.cancel_at_period_end {
                    tracing::info!("  cancels at period end");
                }
            }
            None => tracing::info!("No active subscription"),
        },
        SubscriptionAction::Subscribe { plan_id } => {
            let outcome = store.subscribe(&PlanId::new(plan_id)).await;
            effect_navigation(&outcome.navigate);
            outcome.into_result()?;
        }
        SubscriptionAction::Portal => {
            let outcome = store.subscription_portal().await;
            effect_navigation(&outcome.navigate);
            outcome.into_result()?;
        }
        SubscriptionAction::Cancel { subscription_id } => {
            store
                .cancel_subscription(&SubscriptionId::new(subscription_id))
                .await
                .into_result()?;
            tracing::info!("Subscription cancelled");
        }
        SubscriptionAction::Content => {
            let content = store.digital_content().await.into_result()?;
            tracing::info!("{}", content.content);
        }
    }

    Ok(())
}

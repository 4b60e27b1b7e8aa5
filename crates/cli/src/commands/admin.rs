//! Admin back-office commands.
//!
//! All of these require a session with the ADMIN role; the backend answers
//! 403 otherwise.

use clap::Subcommand;

use tangelo_client::types::{CreatePlanRequest, CreateProductRequest, UpdateProductRequest};
use tangelo_core::{
    MinorUnits, OrderId, OrderStatus, PlanId, ProductId, ProductType, SubscriptionFrequency,
};

use super::{CommandError, storefront};

#[derive(Subcommand)]
pub enum AdminAction {
    /// List all orders
    Orders {
        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: u64,
    },
    /// Update an order's status
    SetOrderStatus {
        /// Order ID
        order_id: String,

        /// New status (`PENDING`, `PAID`, `SHIPPED`, ...)
        status: String,
    },
    /// Create a product
    CreateProduct {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Unit price in minor currency units (cents)
        #[arg(short, long)]
        price: i64,

        /// Units in stock
        #[arg(short, long)]
        stock: u32,

        /// Sell as a subscription rather than one-time
        #[arg(long)]
        subscription: bool,
    },
    /// Update a product's stock level
    SetStock {
        /// Product ID
        product_id: String,

        /// New stock level
        stock: u32,
    },
    /// Delete a product
    DeleteProduct {
        /// Product ID
        product_id: String,
    },
    /// Create a subscription plan
    CreatePlan {
        /// Product the plan sells
        #[arg(long)]
        product_id: String,

        /// Billing cadence (`monthly` or `yearly`)
        #[arg(long, default_value = "monthly")]
        frequency: String,

        /// ISO 4217 currency code
        #[arg(long, default_value = "USD")]
        currency: String,

        /// Payment-processor price reference
        #[arg(long)]
        price_ref: String,
    },
    /// Delete a subscription plan
    DeletePlan {
        /// Plan ID
        plan_id: String,
    },
}

pub async fn run(action: AdminAction) -> Result<(), CommandError> {
    let store = storefront().await?;

    match action {
        AdminAction::Orders { page } => {
            let orders = store.admin_orders(page).await.into_result()?;

            tracing::info!(
                "Page {}/{} ({} order(s) total)",
                orders.page,
                orders.total_pages(),
                orders.total
            );
            for order in &orders.data {
                let items: u32 = order.line_items.iter().map(|l| l.quantity).sum();
                tracing::info!(
                    "  {}  {}  {} item(s)  user {}",
                    order.id,
                    order.status,
                    items,
                    order.user_id
                );
            }
        }
        AdminAction::SetOrderStatus { order_id, status } => {
            let status: OrderStatus = status.parse()?;
            let order = store
                .update_order_status(&OrderId::new(order_id), status)
                .await
                .into_result()?;
            tracing::info!("Order {} is now {}", order.id, order.status);
        }
        AdminAction::CreateProduct {
            name,
            price,
            stock,
            subscription,
        } => {
            let product = store
                .create_product(&CreateProductRequest {
                    name,
                    price: MinorUnits::new(price),
                    stock,
                    product_type: if subscription {
                        ProductType::Subscription
                    } else {
                        ProductType::OneTime
                    },
                })
                .await
                .into_result()?;
            tracing::info!("Created product {} ({})", product.name, product.id);
        }
        AdminAction::SetStock { product_id, stock } => {
            let product = store
                .update_product(
                    &ProductId::new(product_id),
                    &UpdateProductRequest {
                        stock: Some(stock),
                        ..UpdateProductRequest::default()
                    },
                )
                .await
                .into_result()?;
            tracing::info!("{} now has {} in stock", product.name, product.stock);
        }
        AdminAction::DeleteProduct { product_id } => {
            store
                .delete_product(&ProductId::new(product_id))
                .await
                .into_result()?;
            tracing::info!("Product deleted");
        }
        AdminAction::CreatePlan {
            product_id,
            frequency,
            currency,
            price_ref,
        } => {
            let frequency = match frequency.to_lowercase().as_str() {
                "monthly" => SubscriptionFrequency::Monthly,
                "yearly" => SubscriptionFrequency::Yearly,
                other => return Err(format!("invalid frequency: {other}").into()),
            };

            let plan = store
                .create_plan(&CreatePlanRequest {
                    product_id: ProductId::new(product_id),
                    frequency,
                    currency,
                    stripe_price_id: price_ref,
                })
                .await
                .into_result()?;
            tracing::info!("Created plan {}", plan.id);
        }
        AdminAction::DeletePlan { plan_id } => {
            store.delete_plan(&PlanId::new(plan_id)).await.into_result()?;
            tracing::info!("Plan deleted");
        }
    }

    Ok(())
}

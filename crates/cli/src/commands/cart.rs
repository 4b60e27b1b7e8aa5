//! Cart and checkout commands.

use clap::Subcommand;

use tangelo_core::ProductId;

use super::{CommandError, effect_navigation, storefront};

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the cart and its totals
    Show,
    /// Add a product to the cart
    Add {
        /// Product ID
        product_id: String,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line item's quantity (use `remove` to drop a line)
    SetQuantity {
        /// Product ID
        product_id: String,

        /// New quantity (must be at least 1)
        #[arg(short, long)]
        quantity: u32,
    },
    /// Remove a line item
    Remove {
        /// Product ID
        product_id: String,
    },
    /// Start a checkout and print the payment URL
    Checkout,
    /// Report a completed payment session
    ConfirmCheckout {
        /// Payment session ID from the processor redirect
        session_id: String,
    },
    /// Report an abandoned payment session
    CancelCheckout,
}

pub async fn run(action: CartAction) -> Result<(), CommandError> {
    let store = storefront().await?;

    match action {
        CartAction::Show => {
            show_cart(&store);
        }
        CartAction::Add {
            product_id,
            quantity,
        } => {
            store
                .add_to_cart(ProductId::new(product_id), quantity)
                .await
                .into_result()?;
            tracing::info!("Added to cart");
            show_cart(&store);
        }
        CartAction::SetQuantity {
            product_id,
            quantity,
        } => {
            store
                .update_quantity(&ProductId::new(product_id), quantity)
                .await
                .into_result()?;
            tracing::info!("Cart updated");
            show_cart(&store);
        }
        CartAction::Remove { product_id } => {
            store
                .remove_from_cart(&ProductId::new(product_id))
                .await
                .into_result()?;
            tracing::info!("Item removed from cart");
            show_cart(&store);
        }
        CartAction::Checkout => {
            let outcome = store.checkout().await;
            effect_navigation(&outcome.navigate);
            outcome.into_result()?;
        }
        CartAction::ConfirmCheckout { session_id } => {
            let message = store.confirm_checkout(&session_id).await.into_result()?;
            tracing::info!("{message}");
        }
        CartAction::CancelCheckout => {
            let message = store.cancel_checkout().await.into_result()?;
            tracing::info!("{message}");
        }
    }

    Ok(())
}

fn show_cart(store: &tangelo_client::state::Storefront) {
    let Some(cart) = store.cart().cart() else {
        tracing::info!("Cart is empty");
        return;
    };

    if cart.line_items.is_empty() {
        tracing::info!("Cart is empty");
        return;
    }

    for line in &cart.line_items {
        tracing::info!(
            "  {}  {} x{}  {}",
            line.product_id,
            line.name,
            line.quantity,
            line.price.times(line.quantity)
        );
    }

    let metrics = store.cart().metrics();
    tracing::info!("{} item(s), total ${}", metrics.item_count, metrics.total);
}

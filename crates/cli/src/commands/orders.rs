//! Order-history commands.

use clap::Subcommand;

use super::{CommandError, storefront};

#[derive(Subcommand)]
pub enum OrderAction {
    /// List the signed-in user's orders
    List {
        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: u64,
    },
}

pub async fn run(action: OrderAction) -> Result<(), CommandError> {
    let store = storefront().await?;

    match action {
        OrderAction::List { page } => {
            let orders = store.my_orders(page).await.into_result()?;

            tracing::info!(
                "Page {}/{} ({} order(s) total)",
                orders.page,
                orders.total_pages(),
                orders.total
            );
            for order in &orders.data {
                let items: u32 = order.line_items.iter().map(|l| l.quantity).sum();
                tracing::info!("  {}  {}  {} item(s)", order.id, order.status, items);
            }
        }
    }

    Ok(())
}

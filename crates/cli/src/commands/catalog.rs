//! Product catalog commands.

use clap::Subcommand;

use tangelo_core::ProductId;

use super::{CommandError, storefront};

#[derive(Subcommand)]
pub enum ProductAction {
    /// List products
    List {
        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: u64,
    },
    /// Show a single product
    Show {
        /// Product ID
        id: String,
    },
}

pub async fn run(action: ProductAction) -> Result<(), CommandError> {
    let store = storefront().await?;

    match action {
        ProductAction::List { page } => {
            let products = store.products(page).await.into_result()?;

            tracing::info!(
                "Page {}/{} ({} product(s) total)",
                products.page,
                products.total_pages(),
                products.total
            );
            for product in &products.data {
                tracing::info!(
                    "  {}  {}  {}  stock {}  [{:?}]",
                    product.id,
                    product.name,
                    product.price,
                    product.stock,
                    product.product_type
                );
            }
        }
        ProductAction::Show { id } => {
            let product = store.product(&ProductId::new(id)).await.into_result()?;

            tracing::info!("{} ({})", product.name, product.id);
            tracing::info!("  price: {}", product.price);
            tracing::info!("  stock: {}", product.stock);
            tracing::info!("  type:  {:?}", product.product_type);
        }
    }

    Ok(())
}

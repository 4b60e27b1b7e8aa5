//! Tangelo CLI - drive the storefront client from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Create an account and sign in
//! tangelo auth register -e you@example.com -p <password>
//! tangelo auth login -e you@example.com -p <password>
//!
//! # Browse and shop
//! tangelo products list
//! tangelo cart add <product-id> -q 2
//! tangelo cart show
//! tangelo cart checkout
//!
//! # Subscriptions
//! tangelo subscriptions plans
//! tangelo subscriptions subscribe <plan-id>
//! ```
//!
//! The session persists under the state directory (`TANGELO_STATE_DIR`,
//! default `.tangelo`), so commands share one login. Checkout and portal
//! commands log the externally hosted URL; finishing payment there is up to
//! the operator.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tangelo")]
#[command(author, version, about = "Tangelo storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the session
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Browse the product catalog
    Products {
        #[command(subcommand)]
        action: commands::catalog::ProductAction,
    },
    /// Manage the cart and checkout
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// View order history
    Orders {
        #[command(subcommand)]
        action: commands::orders::OrderAction,
    },
    /// Manage subscriptions
    Subscriptions {
        #[command(subcommand)]
        action: commands::subscriptions::SubscriptionAction,
    },
    /// Admin back-office operations
    Admin {
        #[command(subcommand)]
        action: commands::admin::AdminAction,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Auth { action } => commands::auth::run(action).await?,
        Commands::Products { action } => commands::catalog::run(action).await?,
        Commands::Cart { action } => commands::cart::run(action).await?,
        Commands::Orders { action } => commands::orders::run(action).await?,
        Commands::Subscriptions { action } => commands::subscriptions::run(action).await?,
        Commands::Admin { action } => commands::admin::run(action).await?,
    }
    Ok(())
}

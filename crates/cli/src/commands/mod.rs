//! CLI command implementations.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod subscriptions;

use std::sync::Arc;

use tangelo_client::config::ClientConfig;
use tangelo_client::nav::Navigation;
use tangelo_client::notify::TracingNotifier;
use tangelo_client::state::Storefront;
use tangelo_client::storage::FileSessionStore;

/// Boxed error type shared by all commands.
pub type CommandError = Box<dyn std::error::Error>;

/// Build the storefront client and restore the persisted session.
pub async fn storefront() -> Result<Storefront, CommandError> {
    let config = ClientConfig::from_env()?;
    let storage = Arc::new(FileSessionStore::new(config.session_file()));
    let store = Storefront::new(config, storage, Arc::new(TracingNotifier))?;

    if store.initialize().await == Navigation::Login {
        tracing::warn!("Stored session has expired; run `tangelo auth login`");
    }

    Ok(store)
}

/// Act on a navigation intent the way a browser shell would.
pub fn effect_navigation(navigate: &Navigation) {
    match navigate {
        Navigation::Stay => {}
        Navigation::Login => tracing::info!("Next: sign in with `tangelo auth login`"),
        Navigation::Home => {}
        Navigation::External(url) => {
            tracing::info!("Continue in your browser: {url}");
        }
    }
}

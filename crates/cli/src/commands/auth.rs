//! Session commands.

use clap::Subcommand;
use secrecy::SecretString;

use tangelo_core::{Email, UserRole};

use super::{CommandError, effect_navigation, storefront};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Sign in and persist the session
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,

        /// Request the ADMIN role (backend may reject)
        #[arg(long)]
        admin: bool,
    },
    /// Destroy the persisted session
    Logout,
    /// Show the signed-in identity
    Whoami,
}

pub async fn run(action: AuthAction) -> Result<(), CommandError> {
    let store = storefront().await?;

    match action {
        AuthAction::Login { email, password } => {
            let email: Email = email.parse()?;
            let password = SecretString::from(password);

            let outcome = store.login(&email, &password).await;
            effect_navigation(&outcome.navigate);
            let user = outcome.into_result()?;

            tracing::info!("Signed in as {} ({:?})", user.email, user.role);
            let metrics = store.cart().metrics();
            if metrics.item_count > 0 {
                tracing::info!(
                    "Cart restored: {} item(s), total ${}",
                    metrics.item_count,
                    metrics.total
                );
            }
        }
        AuthAction::Register {
            email,
            password,
            admin,
        } => {
            let email: Email = email.parse()?;
            let password = SecretString::from(password);
            let role = admin.then_some(UserRole::Admin);

            let outcome = store.register(&email, &password, role).await;
            effect_navigation(&outcome.navigate);
            let user = outcome.into_result()?;

            tracing::info!("Account created for {} ({:?})", user.email, user.role);
        }
        AuthAction::Logout => {
            store.logout();
            tracing::info!("Signed out");
        }
        AuthAction::Whoami => match store.auth().current_user() {
            Some(user) => tracing::info!("{} ({:?}, id {})", user.email, user.role, user.id),
            None => tracing::info!("Not signed in"),
        },
    }

    Ok(())
}

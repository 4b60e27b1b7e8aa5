//! Route guards.
//!
//! Guards gate access to protected and admin views. Both variants share one
//! [`Capability`] check and both wait for auth-store initialization before
//! deciding, so a restored session never flashes through a redirect.

use crate::nav::Navigation;
use crate::store::AuthStore;
use crate::types::User;

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// The view may render.
    Allow,
    /// Send the user elsewhere.
    Redirect(Navigation),
    /// Auth state is still initializing; hold rendering.
    Pending,
}

/// An access requirement a view can demand of the current identity.
pub trait Capability {
    /// Decide whether `user` may enter, or where to send them instead.
    ///
    /// # Errors
    ///
    /// Returns the redirect target when access is denied.
    fn check(&self, user: Option<&User>) -> Result<(), Navigation>;
}

/// Requires any authenticated user.
#[derive(Debug, Clone, Copy, Default)]
pub struct Authenticated;

impl Capability for Authenticated {
    fn check(&self, user: Option<&User>) -> Result<(), Navigation> {
        if user.is_some() {
            Ok(())
        } else {
            Err(Navigation::Login)
        }
    }
}

/// Requires an authenticated admin.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminOnly;

impl Capability for AdminOnly {
    fn check(&self, user: Option<&User>) -> Result<(), Navigation> {
        match user {
            None => Err(Navigation::Login),
            Some(user) if user.role.is_admin() => Ok(()),
            Some(_) => Err(Navigation::Home),
        }
    }
}

/// Evaluate a capability against the current auth state.
#[must_use]
pub fn decide<C: Capability>(capability: &C, auth: &AuthStore) -> GuardDecision {
    if auth.is_initializing() {
        return GuardDecision::Pending;
    }

    match capability.check(auth.current_user().as_ref()) {
        Ok(()) => GuardDecision::Allow,
        Err(target) => GuardDecision::Redirect(target),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use tangelo_core::{Credential, UserId, UserRole};

    use crate::storage::MemorySessionStore;

    fn auth_with(role: Option<UserRole>) -> AuthStore {
        let store = AuthStore::new(Arc::new(MemorySessionStore::new()));
        store.initialize();
        if let Some(role) = role {
            store.login(
                Credential::new("tok"),
                User {
                    id: UserId::new("u_1"),
                    email: "user@example.com".parse().unwrap(),
                    role,
                    draft_order_id: None,
                    created_at: None,
                },
            );
        }
        store
    }

    #[test]
    fn test_guards_hold_while_initializing() {
        let auth = AuthStore::new(Arc::new(MemorySessionStore::new()));
        assert_eq!(decide(&Authenticated, &auth), GuardDecision::Pending);
        assert_eq!(decide(&AdminOnly, &auth), GuardDecision::Pending);
    }

    #[test]
    fn test_authenticated_guard() {
        let auth = auth_with(None);
        assert_eq!(
            decide(&Authenticated, &auth),
            GuardDecision::Redirect(Navigation::Login)
        );

        let auth = auth_with(Some(UserRole::User));
        assert_eq!(decide(&Authenticated, &auth), GuardDecision::Allow);
    }

    #[test]
    fn test_admin_guard_redirects_by_identity() {
        let auth = auth_with(None);
        assert_eq!(
            decide(&AdminOnly, &auth),
            GuardDecision::Redirect(Navigation::Login)
        );

        let auth = auth_with(Some(UserRole::User));
        assert_eq!(
            decide(&AdminOnly, &auth),
            GuardDecision::Redirect(Navigation::Home)
        );

        let auth = auth_with(Some(UserRole::Admin));
        assert_eq!(decide(&AdminOnly, &auth), GuardDecision::Allow);
    }
}

//! Navigation intents.
//!
//! Operations that would navigate in a browser (checkout redirect, forced
//! logout) return an explicit intent instead of performing the navigation;
//! the embedding layer decides how to effect it.

use url::Url;

/// Path of the login view, used to suppress redirect loops.
pub const LOGIN_PATH: &str = "/login";

/// Path of the home view.
pub const HOME_PATH: &str = "/";

/// Where the caller should take the user after an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Stay on the current view.
    Stay,
    /// Go to the login view.
    Login,
    /// Go to the home view.
    Home,
    /// Leave the application for an externally hosted URL
    /// (payment checkout, subscription portal).
    External(Url),
}

impl Navigation {
    /// Whether this intent requires no action from the caller.
    #[must_use]
    pub const fn is_stay(&self) -> bool {
        matches!(self, Self::Stay)
    }
}

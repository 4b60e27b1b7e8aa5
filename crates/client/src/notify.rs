//! Transient user-visible notifications.
//!
//! The client only decides *what* to say. Embedders provide a [`Notifier`]
//! at construction time and choose how to surface each notice (a toast, a
//! status line, a log entry).

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Sink for transient user-visible messages.
pub trait Notifier: Send + Sync {
    /// Deliver a notice to the user.
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// Notifier that forwards notices to `tracing`.
///
/// Suitable for headless embedders (CLI, tests without assertions).
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Success => tracing::info!(notice = message, "notice"),
            NoticeLevel::Error => tracing::warn!(notice = message, "notice"),
        }
    }
}

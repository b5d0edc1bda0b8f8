//! Login redirect seam.

use tracing::warn;

/// Receives the "session is over, go log in" signal.
pub trait Navigator: Send + Sync {
    /// Sends the user to `route`.
    fn redirect_to_login(&self, route: &str);
}

/// Navigator that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect_to_login(&self, route: &str) {
        warn!(route, "Session ended, redirecting to login");
    }
}

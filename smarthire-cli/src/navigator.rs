//! Login redirect for a terminal session.

use smarthire_fetch::Navigator;
use tracing::debug;

const RELOGIN_HINT: &str = "Session expired. Run `smarthire login` to sign in again.";

/// Tells the user to log in again.
pub struct CliNavigator {
    quiet: bool,
}

impl CliNavigator {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Navigator for a deliberate `smarthire logout`, which has nothing to
    /// tell the user beyond the logout result itself.
    pub fn for_logout() -> Self {
        Self { quiet: true }
    }

    fn hint(&self) -> Option<&'static str> {
        (!self.quiet).then_some(RELOGIN_HINT)
    }
}

impl Navigator for CliNavigator {
    fn redirect_to_login(&self, route: &str) {
        debug!(route, "Login redirect");
        if let Some(hint) = self.hint() {
            eprintln!("{hint}");
        }
    }
}

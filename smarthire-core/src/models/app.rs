//! Client app flavors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// The client app a session belongs to.
///
/// Each app has its own login entry point that unrecoverable auth failures
/// redirect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppFlavor {
    /// Job-seeker app.
    #[default]
    Seeker,
    /// HR app.
    Hr,
    /// Admin console.
    Admin,
}

impl AppFlavor {
    /// Default login route for this app.
    pub fn login_route(&self) -> &'static str {
        match self {
            AppFlavor::Seeker => "/pages/seeker/auth/login",
            AppFlavor::Hr => "/pages/hr/auth/login",
            AppFlavor::Admin => "/login",
        }
    }

    /// Short identifier, used for keychain service names.
    pub fn id(&self) -> &'static str {
        match self {
            AppFlavor::Seeker => "seeker",
            AppFlavor::Hr => "hr",
            AppFlavor::Admin => "admin",
        }
    }

    /// All flavors.
    pub fn all() -> &'static [AppFlavor] {
        &[AppFlavor::Seeker, AppFlavor::Hr, AppFlavor::Admin]
    }
}

impl fmt::Display for AppFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for AppFlavor {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppFlavor::all()
            .iter()
            .copied()
            .find(|flavor| flavor.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::UnknownApp(s.to_string()))
    }
}

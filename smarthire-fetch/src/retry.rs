//! What to do when a request comes back 401.

use smarthire_core::ApiRequest;

/// Refresh-and-replay attempts allowed per original request.
pub const MAX_AUTH_REPLAYS: u32 = 1;

/// Outcome of [`AuthRetryPolicy::decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    /// Refresh the token, then send the request again.
    RefreshAndReplay,
    /// Give up: clear the session and send the user to login.
    Terminate,
    /// Hand the 401 to the caller untouched (unauthenticated requests).
    PassThrough,
}

/// Policy for 401 responses.
#[derive(Debug, Clone)]
pub struct AuthRetryPolicy {
    excluded_paths: Vec<String>,
    max_replays: u32,
}

impl AuthRetryPolicy {
    /// Creates a policy that never refreshes for paths ending in any of
    /// `excluded_paths`.
    pub fn new<I, S>(excluded_paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded_paths: excluded_paths.into_iter().map(Into::into).collect(),
            max_replays: MAX_AUTH_REPLAYS,
        }
    }

    /// Adds an excluded path suffix.
    #[must_use]
    pub fn exclude(mut self, path: impl Into<String>) -> Self {
        self.excluded_paths.push(path.into());
        self
    }

    /// Returns true if a 401 on `request` must not trigger a refresh.
    /// The query string is ignored.
    pub fn is_excluded(&self, request: &ApiRequest) -> bool {
        let path = request.path();
        self.excluded_paths
            .iter()
            .any(|suffix| !suffix.is_empty() && path.ends_with(suffix.as_str()))
    }

    /// Decides how to handle a 401 for `request` after `retry_count`
    /// replays.
    pub fn decide(&self, request: &ApiRequest, retry_count: u32) -> AuthDecision {
        if request.skip_auth {
            AuthDecision::PassThrough
        } else if retry_count >= self.max_replays || self.is_excluded(request) {
            AuthDecision::Terminate
        } else {
            AuthDecision::RefreshAndReplay
        }
    }
}

impl Default for AuthRetryPolicy {
    fn default() -> Self {
        Self::new(["/user-auth/logout", "/user-auth/refresh-token"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_401_refreshes() {
        let policy = AuthRetryPolicy::default();
        let request = ApiRequest::get("/api/seeker/info");
        assert_eq!(policy.decide(&request, 0), AuthDecision::RefreshAndReplay);
    }

    #[test]
    fn test_second_401_terminates() {
        let policy = AuthRetryPolicy::default();
        let request = ApiRequest::get("/api/seeker/info");
        assert_eq!(policy.decide(&request, 1), AuthDecision::Terminate);
        assert_eq!(policy.decide(&request, 5), AuthDecision::Terminate);
    }

    #[test]
    fn test_excluded_endpoints_terminate() {
        let policy = AuthRetryPolicy::default();
        assert_eq!(
            policy.decide(&ApiRequest::post("/user-auth/logout"), 0),
            AuthDecision::Terminate
        );
        assert_eq!(
            policy.decide(&ApiRequest::post("/api/user-auth/refresh-token?x=1"), 0),
            AuthDecision::Terminate
        );
        assert_eq!(
            policy.decide(&ApiRequest::post("/user-auth/logout-all"), 0),
            AuthDecision::RefreshAndReplay
        );
    }

    #[test]
    fn test_skip_auth_passes_through() {
        let policy = AuthRetryPolicy::default();
        let request = ApiRequest::post("/user-auth/login").skip_auth();
        assert_eq!(policy.decide(&request, 0), AuthDecision::PassThrough);
    }

    #[test]
    fn test_custom_exclusion() {
        let policy = AuthRetryPolicy::new(Vec::<String>::new()).exclude("/hr/session");
        assert!(policy.is_excluded(&ApiRequest::get("/api/hr/session")));
        assert!(!policy.is_excluded(&ApiRequest::get("/user-auth/logout")));
    }
}

//! Single-flight token refresh.
//!
//! Any number of tasks may ask for a refresh at once; the first one starts
//! the network call and the rest await the same shared future. The in-flight
//! slot is emptied when that future settles, success or failure, so the next
//! 401 after a settled refresh starts a fresh one.
//!
//! ```text
//!   Idle ──refresh()──▶ Refreshing ──settled──▶ Idle
//!                          ▲    │
//!              refresh() ──┘    └── all waiters get the same Result
//! ```

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use smarthire_core::{ApiRequest, AuthTokens, RefreshTokenRequest};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, info, instrument, warn};

use crate::dispatch::Dispatcher;
use crate::error::RefreshError;

type SharedRefresh = Shared<BoxFuture<'static, Result<AuthTokens, RefreshError>>>;
type Slot = Mutex<Option<SharedRefresh>>;

/// Whether a refresh is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    /// No refresh in flight.
    Idle,
    /// A refresh call is outstanding.
    Refreshing,
}

/// Coordinates token refreshes so at most one is in flight.
///
/// Clones share the in-flight slot.
#[derive(Clone)]
pub struct RefreshCoordinator {
    dispatcher: Dispatcher,
    endpoint: String,
    in_flight: Arc<Slot>,
}

impl fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("endpoint", &self.endpoint)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl RefreshCoordinator {
    /// Creates a coordinator that refreshes via `endpoint`.
    pub fn new(dispatcher: Dispatcher, endpoint: impl Into<String>) -> Self {
        Self {
            dispatcher,
            endpoint: endpoint.into(),
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> RefreshState {
        if lock(&self.in_flight).is_some() {
            RefreshState::Refreshing
        } else {
            RefreshState::Idle
        }
    }

    /// Refreshes the session, or joins the refresh already in flight.
    ///
    /// On success the new tokens are stored before this returns. On any
    /// failure the token store has been cleared.
    ///
    /// # Errors
    ///
    /// Returns the shared [`RefreshError`] if the refresh failed.
    pub async fn refresh(&self) -> Result<AuthTokens, RefreshError> {
        let shared = {
            let mut slot = lock(&self.in_flight);
            if let Some(existing) = slot.as_ref() {
                debug!("Joining in-flight token refresh");
                existing.clone()
            } else {
                let fut = run(
                    self.dispatcher.clone(),
                    self.endpoint.clone(),
                    Arc::downgrade(&self.in_flight),
                )
                .boxed()
                .shared();
                *slot = Some(fut.clone());
                fut
            }
        };

        shared.await
    }
}

fn lock(slot: &Slot) -> MutexGuard<'_, Option<SharedRefresh>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn run(
    dispatcher: Dispatcher,
    endpoint: String,
    slot: Weak<Slot>,
) -> Result<AuthTokens, RefreshError> {
    let outcome = perform(&dispatcher, &endpoint).await;

    if let Some(slot) = slot.upgrade() {
        *lock(&slot) = None;
    }
    outcome
}

#[instrument(skip(dispatcher))]
async fn perform(dispatcher: &Dispatcher, endpoint: &str) -> Result<AuthTokens, RefreshError> {
    let tokens = dispatcher.tokens();

    let result = match tokens.get_refresh().await {
        Some(refresh_token) => exchange(dispatcher, endpoint, refresh_token).await,
        None => Err(RefreshError::MissingRefreshToken),
    };

    match &result {
        Ok(new_tokens) => {
            tokens.set_tokens(new_tokens).await;
            info!(expires_in = new_tokens.expires_in, "Token refreshed");
        }
        Err(e) => {
            warn!(error = %e, "Token refresh failed, clearing session");
            tokens.clear().await;
        }
    }
    result
}

async fn exchange(
    dispatcher: &Dispatcher,
    endpoint: &str,
    refresh_token: String,
) -> Result<AuthTokens, RefreshError> {
    let request = ApiRequest::post(endpoint)
        .with_body(&RefreshTokenRequest { refresh_token })
        .map_err(|e| RefreshError::InvalidResponse(e.to_string()))?
        .skip_auth();

    let data = dispatcher.send(&request).await?;
    let new_tokens: AuthTokens =
        serde_json::from_value(data).map_err(|e| RefreshError::InvalidResponse(e.to_string()))?;

    if new_tokens.access_token.is_empty() {
        return Err(RefreshError::InvalidResponse(
            "response carried no access token".to_string(),
        ));
    }
    Ok(new_tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeTransport, err_body, tokens_body};
    use futures::future::join_all;
    use smarthire_store::TokenStore;
    use std::time::Duration;

    const ENDPOINT: &str = "/user-auth/refresh-token";

    async fn seeded_store() -> TokenStore {
        let tokens = TokenStore::in_memory();
        tokens.set("A1", "R1", 3600).await;
        tokens
    }

    fn make_coordinator(transport: Arc<FakeTransport>, tokens: TokenStore) -> RefreshCoordinator {
        let dispatcher = Dispatcher::new(transport, tokens, "https://api.x.com/api");
        RefreshCoordinator::new(dispatcher, ENDPOINT)
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_share_one_call() {
        let transport = FakeTransport::routed(Duration::from_millis(50), |_| {
            (200, tokens_body("A2", "R2"))
        });
        let tokens = seeded_store().await;
        let coordinator = make_coordinator(transport.clone(), tokens.clone());

        let outcomes = join_all((0..8).map(|_| coordinator.refresh())).await;

        assert_eq!(transport.calls_to(ENDPOINT), 1);
        for outcome in &outcomes {
            assert_eq!(outcome.as_ref().unwrap().access_token, "A2");
        }
        assert_eq!(tokens.get().await.as_deref(), Some("A2"));
        assert_eq!(tokens.get_refresh().await.as_deref(), Some("R2"));
        assert_eq!(coordinator.state(), RefreshState::Idle);
    }

    #[tokio::test]
    async fn test_concurrent_failures_share_one_outcome() {
        let transport = FakeTransport::routed(Duration::from_millis(50), |_| {
            (200, err_body(1012, "refresh token expired"))
        });
        let coordinator = make_coordinator(transport.clone(), seeded_store().await);

        let outcomes = join_all((0..4).map(|_| coordinator.refresh())).await;

        assert_eq!(transport.calls_to(ENDPOINT), 1);
        let expected = RefreshError::Rejected {
            code: 1012,
            message: "refresh token expired".to_string(),
        };
        assert!(outcomes.iter().all(|o| o.as_ref().unwrap_err() == &expected));
    }

    #[tokio::test]
    async fn test_state_while_in_flight() {
        let transport = FakeTransport::routed(Duration::from_millis(100), |_| {
            (200, tokens_body("A2", "R2"))
        });
        let coordinator = make_coordinator(transport, seeded_store().await);
        assert_eq!(coordinator.state(), RefreshState::Idle);

        let background = coordinator.clone();
        let handle = tokio::spawn(async move { background.refresh().await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(coordinator.state(), RefreshState::Refreshing);

        handle.await.unwrap().unwrap();
        assert_eq!(coordinator.state(), RefreshState::Idle);
    }

    #[tokio::test]
    async fn test_rejected_refresh_clears_store() {
        let transport = FakeTransport::new();
        transport.push(200, err_body(1012, "refresh token expired"));
        let tokens = seeded_store().await;
        let coordinator = make_coordinator(transport.clone(), tokens.clone());

        let err = coordinator.refresh().await.unwrap_err();

        assert!(matches!(err, RefreshError::Rejected { code: 1012, .. }));
        assert_eq!(tokens.get().await, None);
        assert_eq!(tokens.get_refresh().await, None);
        assert_eq!(coordinator.state(), RefreshState::Idle);
    }

    #[tokio::test]
    async fn test_refresh_request_shape() {
        let transport = FakeTransport::new();
        transport.push(200, tokens_body("A2", "R2"));
        let coordinator = make_coordinator(transport.clone(), seeded_store().await);

        coordinator.refresh().await.unwrap();

        let sent = transport.requests();
        assert_eq!(sent[0].url, "https://api.x.com/api/user-auth/refresh-token");
        assert_eq!(sent[0].header("Authorization"), None);
        assert_eq!(
            sent[0].body,
            Some(smarthire_core::Payload::Json(
                serde_json::json!({"refreshToken": "R1"})
            ))
        );
    }

    #[tokio::test]
    async fn test_missing_refresh_token() {
        let transport = FakeTransport::new();
        let tokens = TokenStore::in_memory();
        tokens.set("A1", "", 3600).await;
        let coordinator = make_coordinator(transport.clone(), tokens.clone());

        let err = coordinator.refresh().await.unwrap_err();

        assert_eq!(err, RefreshError::MissingRefreshToken);
        assert!(transport.requests().is_empty());
        assert_eq!(tokens.get().await, None);
    }

    #[tokio::test]
    async fn test_http_and_network_failures() {
        let transport = FakeTransport::new();
        transport.push(500, err_body(9999, "boom"));
        let coordinator = make_coordinator(transport.clone(), seeded_store().await);
        assert_eq!(coordinator.refresh().await.unwrap_err(), RefreshError::Status(500));

        let transport = FakeTransport::new();
        transport.push_network_error("connection reset");
        let coordinator = make_coordinator(transport, seeded_store().await);
        assert!(matches!(
            coordinator.refresh().await.unwrap_err(),
            RefreshError::Network(_)
        ));
    }

    #[tokio::test]
    async fn test_settled_refresh_allows_a_new_one() {
        let transport = FakeTransport::new();
        transport.push(200, tokens_body("A2", "R2"));
        transport.push(200, tokens_body("A3", "R3"));
        let tokens = seeded_store().await;
        let coordinator = make_coordinator(transport.clone(), tokens.clone());

        coordinator.refresh().await.unwrap();
        coordinator.refresh().await.unwrap();

        assert_eq!(transport.calls_to(ENDPOINT), 2);
        assert_eq!(tokens.get().await.as_deref(), Some("A3"));
    }

    #[tokio::test]
    async fn test_payload_without_access_token() {
        let transport = FakeTransport::new();
        transport.push(200, tokens_body("", "R2"));
        let tokens = seeded_store().await;
        let coordinator = make_coordinator(transport, tokens.clone());

        assert!(matches!(
            coordinator.refresh().await.unwrap_err(),
            RefreshError::InvalidResponse(_)
        ));
        assert!(tokens.session().await.is_empty());
    }
}

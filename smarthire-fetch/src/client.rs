//! The SmartHire API client.
//!
//! Composes the dispatcher, the refresh coordinator, and the 401 policy:
//!
//! 1. Send the request with the current bearer token
//! 2. On 401, refresh once (shared with any concurrent 401s) and replay
//! 3. On a second 401, or a failed refresh, clear the session and redirect
//!
//! Everything other than a 401 is reported directly, without retries.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use smarthire_core::{
    ApiRequest, AppFlavor, AuthTokens, HttpMethod, LoginRequest, MultipartForm, Session,
};
use smarthire_store::{Settings, TokenStore};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::dispatch::Dispatcher;
use crate::error::{ApiError, RefreshError};
use crate::host::{HttpClient, LogNavigator, Navigator, Transport};
use crate::refresh::{RefreshCoordinator, RefreshState};
use crate::retry::{AuthDecision, AuthRetryPolicy};

// ============================================================================
// Auth Endpoints
// ============================================================================

/// Paths of the authentication endpoints, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEndpoints {
    /// Login endpoint.
    pub login: String,
    /// Token refresh endpoint.
    pub refresh: String,
    /// Logout endpoint.
    pub logout: String,
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self {
            login: "/user-auth/login".to_string(),
            refresh: "/user-auth/refresh-token".to_string(),
            logout: "/user-auth/logout".to_string(),
        }
    }
}

// ============================================================================
// Api Client
// ============================================================================

/// Authenticated client for the SmartHire backend.
///
/// Cheap to clone; clones share the token store and the refresh slot.
#[derive(Clone)]
pub struct ApiClient {
    dispatcher: Dispatcher,
    refresher: RefreshCoordinator,
    policy: AuthRetryPolicy,
    navigator: Arc<dyn Navigator>,
    login_route: String,
    endpoints: AuthEndpoints,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.dispatcher.base_url())
            .field("login_route", &self.login_route)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a builder.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::new()
    }

    /// Creates a client from persisted settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP transport cannot be created.
    pub fn from_settings(settings: &Settings) -> Result<Self, ApiError> {
        ApiClientBuilder::new().settings(settings).build()
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &str {
        self.dispatcher.base_url()
    }

    /// Returns the token store.
    pub fn tokens(&self) -> &TokenStore {
        self.dispatcher.tokens()
    }

    /// Returns the route used for login redirects.
    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    /// Returns whether a token refresh is in flight.
    pub fn refresh_state(&self) -> RefreshState {
        self.refresher.state()
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Sends a request and returns the envelope's `data`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when the session could not be
    /// recovered; other failures are passed through unchanged.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path()))]
    pub async fn execute(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        let mut retry_count = 0;

        loop {
            let err = match self.dispatcher.send(request).await {
                Err(err) if err.is_http_unauthorized() => err,
                other => return other,
            };

            match self.policy.decide(request, retry_count) {
                AuthDecision::PassThrough => return Err(err),
                AuthDecision::Terminate => {
                    let reason = if retry_count > 0 {
                        "token rejected after refresh"
                    } else {
                        "authentication required"
                    };
                    return Err(self.end_session(reason).await);
                }
                AuthDecision::RefreshAndReplay => {
                    debug!("Received 401, refreshing token");
                    if let Err(e) = self.refresher.refresh().await {
                        return Err(self.end_session(&format!("token refresh failed: {e}")).await);
                    }
                    retry_count += 1;
                }
            }
        }
    }

    /// Sends a request and decodes `data` into `T`.
    ///
    /// # Errors
    ///
    /// As [`execute`](Self::execute), plus [`ApiError::InvalidResponse`] if
    /// `data` does not decode.
    pub async fn request<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ApiError> {
        let data = self.execute(request).await?;
        serde_json::from_value(data).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// GET `path`.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(&ApiRequest::get(path)).await
    }

    /// GET `path` with `query` sent as query parameters.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn get_with<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.request(&with_payload(HttpMethod::Get, path, query)?).await
    }

    /// POST `body` to `path`.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(&with_payload(HttpMethod::Post, path, body)?).await
    }

    /// PUT `body` to `path`.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(&with_payload(HttpMethod::Put, path, body)?).await
    }

    /// PATCH `body` to `path`.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(&with_payload(HttpMethod::Patch, path, body)?).await
    }

    /// DELETE `path`.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(&ApiRequest::delete(path)).await
    }

    /// Uploads a multipart form to `path` through the same auth path as
    /// every other request.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        form: MultipartForm,
    ) -> Result<T, ApiError> {
        self.request(&ApiRequest::post(path).with_multipart(form)).await
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Logs in and stores the returned tokens.
    ///
    /// # Errors
    ///
    /// Returns the server's rejection (usually [`ApiError::Application`]).
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthTokens, ApiError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let request = with_payload(HttpMethod::Post, &self.endpoints.login, &body)?.skip_auth();

        let tokens: AuthTokens = self.request(&request).await?;
        if tokens.access_token.is_empty() {
            return Err(ApiError::InvalidResponse(
                "login response carried no access token".to_string(),
            ));
        }

        self.tokens().set_tokens(&tokens).await;
        info!(expires_in = tokens.expires_in, "Logged in");
        Ok(tokens)
    }

    /// Logs out. The local session is cleared and the login redirect issued
    /// whatever the server answers.
    ///
    /// # Errors
    ///
    /// Returns the server outcome of the logout call.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = self
            .execute(&ApiRequest::post(&self.endpoints.logout))
            .await
            .map(|_| ());

        match &result {
            Err(ApiError::Unauthorized { .. }) => {}
            other => {
                if let Err(e) = other {
                    warn!(error = %e, "Logout call failed, clearing session anyway");
                }
                self.tokens().clear().await;
                self.navigator.redirect_to_login(&self.login_route);
                info!("Logged out");
            }
        }
        result
    }

    /// Forces a token refresh, joining one already in flight.
    ///
    /// # Errors
    ///
    /// Returns the refresh failure; the session has been cleared.
    pub async fn refresh_session(&self) -> Result<AuthTokens, RefreshError> {
        self.refresher.refresh().await
    }

    /// Returns a snapshot of the stored session.
    pub async fn session(&self) -> Session {
        self.tokens().session().await
    }

    /// Returns true if an unexpired access token is stored.
    pub async fn is_authenticated(&self) -> bool {
        self.tokens().is_valid().await
    }

    async fn end_session(&self, reason: &str) -> ApiError {
        warn!(reason, route = %self.login_route, "Session ended");
        self.tokens().clear().await;
        self.navigator.redirect_to_login(&self.login_route);
        ApiError::Unauthorized {
            reason: reason.to_string(),
        }
    }
}

fn with_payload<B: Serialize + ?Sized>(
    method: HttpMethod,
    path: &str,
    body: &B,
) -> Result<ApiRequest, ApiError> {
    ApiRequest::new(method, path)
        .with_body(body)
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`ApiClient`].
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: String,
    transport: Option<Arc<dyn Transport>>,
    tokens: Option<TokenStore>,
    navigator: Option<Arc<dyn Navigator>>,
    login_route: Option<String>,
    timeout: Option<Duration>,
    endpoints: AuthEndpoints,
    allowed_domains: Vec<String>,
}

impl ApiClientBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies persisted settings: base URL, login route, timeout, allowlist,
    /// and the configured token store.
    #[must_use]
    pub fn settings(mut self, settings: &Settings) -> Self {
        self.base_url.clone_from(&settings.api_base_url);
        self.login_route = Some(settings.login_route().to_string());
        self.timeout = Some(settings.timeout());
        self.allowed_domains.clone_from(&settings.allowed_domains);
        self.tokens = Some(settings.token_store());
        self
    }

    /// Sets the base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the transport.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the token store.
    #[must_use]
    pub fn token_store(mut self, tokens: TokenStore) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Sets the navigator.
    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Sets the login route.
    #[must_use]
    pub fn login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = Some(route.into());
        self
    }

    /// Sets the login route to the app's default.
    #[must_use]
    pub fn app(self, app: AppFlavor) -> Self {
        self.login_route(app.login_route())
    }

    /// Sets the default request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the auth endpoint paths.
    #[must_use]
    pub fn endpoints(mut self, endpoints: AuthEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Restricts the default transport to these domains.
    #[must_use]
    pub fn allowed_domains(mut self, domains: Vec<String>) -> Self {
        self.allowed_domains = domains;
        self
    }

    /// Builds the client.
    ///
    /// Defaults: reqwest transport, in-memory token store, logging navigator,
    /// and the seeker login route.
    ///
    /// # Errors
    ///
    /// Returns an error if the default HTTP transport cannot be created.
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let client = match self.timeout {
                    Some(timeout) => HttpClient::with_timeout(timeout)?,
                    None => HttpClient::new()?,
                };
                Arc::new(client.allowed_domains(self.allowed_domains))
            }
        };

        let tokens = self.tokens.unwrap_or_else(TokenStore::in_memory);
        let mut dispatcher = Dispatcher::new(transport, tokens, self.base_url);
        if let Some(timeout) = self.timeout {
            dispatcher = dispatcher.with_default_timeout(timeout);
        }

        let refresher = RefreshCoordinator::new(dispatcher.clone(), self.endpoints.refresh.clone());
        let policy = AuthRetryPolicy::new([
            self.endpoints.logout.clone(),
            self.endpoints.refresh.clone(),
        ]);

        Ok(ApiClient {
            dispatcher,
            refresher,
            policy,
            navigator: self.navigator.unwrap_or_else(|| Arc::new(LogNavigator)),
            login_route: self
                .login_route
                .unwrap_or_else(|| AppFlavor::default().login_route().to_string()),
            endpoints: self.endpoints,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

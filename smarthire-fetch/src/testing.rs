//! In-process fakes for unit tests.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::TransportError;
use crate::host::{Navigator, Transport, TransportRequest, TransportResponse};

type Handler = Box<dyn Fn(&TransportRequest) -> (u16, Value) + Send + Sync>;

pub(crate) fn ok_body(data: Value) -> Value {
    json!({"code": 0, "message": "ok", "data": data})
}

pub(crate) fn err_body(code: i64, message: &str) -> Value {
    json!({"code": code, "message": message, "data": null})
}

pub(crate) fn tokens_body(access: &str, refresh: &str) -> Value {
    ok_body(json!({"accessToken": access, "refreshToken": refresh, "expiresIn": 3600}))
}

/// Transport that records requests and answers from a script or a handler.
pub(crate) struct FakeTransport {
    script: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    handler: Option<Handler>,
    delay: Option<Duration>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            handler: None,
            delay: None,
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Answers every request through `handler` after `delay`.
    pub(crate) fn routed<F>(delay: Duration, handler: F) -> Arc<Self>
    where
        F: Fn(&TransportRequest) -> (u16, Value) + Send + Sync + 'static,
    {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            handler: Some(Box::new(handler)),
            delay: Some(delay),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn push(&self, status: u16, body: Value) {
        self.script.lock().unwrap().push_back(Ok(TransportResponse {
            status,
            body: body.to_string().into_bytes(),
        }));
    }

    pub(crate) fn push_network_error(&self, message: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(TransportError::Network(message.to_string())));
    }

    pub(crate) fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn calls_to(&self, path_suffix: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.ends_with(path_suffix))
            .count()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(handler) = &self.handler {
            let (status, body) = handler(&request);
            return Ok(TransportResponse {
                status,
                body: body.to_string().into_bytes(),
            });
        }

        self.script.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(TransportResponse {
                status: 500,
                body: err_body(9999, "no scripted response").to_string().into_bytes(),
            })
        })
    }
}

/// Navigator that counts redirects.
#[derive(Default)]
pub(crate) struct CountingNavigator {
    count: AtomicUsize,
    last_route: Mutex<Option<String>>,
}

impl CountingNavigator {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub(crate) fn last_route(&self) -> Option<String> {
        self.last_route.lock().unwrap().clone()
    }
}

impl Navigator for CountingNavigator {
    fn redirect_to_login(&self, route: &str) {
        self.count.fetch_add(1, Ordering::SeqCst);
        *self.last_route.lock().unwrap() = Some(route.to_string());
    }
}

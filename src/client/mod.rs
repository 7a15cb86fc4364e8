use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use crate::error::AuthError;
use crate::routing::LOGIN_ROUTE;
use crate::session::SessionStore;

/// Header carrying the per-request correlation identifier. Observability
/// only; nothing retries or dedups on it.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A fully prepared outbound request, credentials already attached.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
    pub bearer: Option<String>,
    pub request_id: String,
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Raised only when no HTTP response was received at all.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// The wire itself. Abstracted so the interception logic in [`HttpClient`]
/// is testable without a network.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Where "the browser" currently is. The CLI tracks this in memory; a real
/// web shell would wire it to its router.
pub trait Navigator: Send + Sync {
    fn current_route(&self) -> String;
    fn navigate(&self, route: &str);
}

/// In-memory navigator used by the CLI and by tests.
pub struct RouteTracker {
    current: Mutex<String>,
}

impl RouteTracker {
    pub fn starting_at(route: &str) -> Self {
        Self {
            current: Mutex::new(route.to_string()),
        }
    }
}

impl Default for RouteTracker {
    fn default() -> Self {
        Self::starting_at(LOGIN_ROUTE)
    }
}

impl Navigator for RouteTracker {
    fn current_route(&self) -> String {
        self.current.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn navigate(&self, route: &str) {
        tracing::info!("navigating to {}", route);
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = route.to_string();
    }
}

/// Production transport over a shared reqwest client with a fixed
/// per-request timeout. No retry, no backoff.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        builder = builder.header(REQUEST_ID_HEADER, &request.request_id);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        Ok(ApiResponse { status, body })
    }
}

/// Single choke point for all backend calls.
///
/// Outgoing: attaches the stored bearer token (when present) and a fresh
/// correlation id. Incoming: global 401 handling (clear session, redirect
/// to login), logging for 403 and 5xx. Every failure is handed back to the
/// caller unchanged beyond those side effects.
pub struct HttpClient {
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    base_url: String,
}

impl HttpClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            transport,
            store,
            navigator,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse, AuthError> {
        self.send(Method::Get, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<ApiResponse, AuthError> {
        self.send(Method::Post, path, Some(body)).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse, AuthError> {
        let request_id = Uuid::new_v4().to_string();
        let request = ApiRequest {
            method,
            url: format!("{}{}", self.base_url, path),
            body,
            bearer: self.store.token(),
            request_id: request_id.clone(),
        };

        tracing::debug!(request_id = %request_id, url = %request.url, "outbound request");

        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(request_id = %request_id, "request failed: {}", e);
                return Err(AuthError::NetworkFailure(e.to_string()));
            }
        };

        self.inspect(&response, &request_id);
        Ok(response)
    }

    /// Response-side interception. 401 is the only status with behavior
    /// attached; everything else is logged and passed through.
    fn inspect(&self, response: &ApiResponse, request_id: &str) {
        match response.status {
            401 => {
                tracing::warn!(request_id = %request_id, "session rejected, clearing local state");
                self.store.clear();
                if self.navigator.current_route() != LOGIN_ROUTE {
                    self.navigator.navigate(LOGIN_ROUTE);
                }
            }
            403 => {
                tracing::warn!(request_id = %request_id, "permission denied by backend");
            }
            status if status >= 500 => {
                tracing::error!(request_id = %request_id, status, "backend error");
            }
            _ => {}
        }
    }
}

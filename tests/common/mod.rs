#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use erp_auth_client::auth::AuthService;
use erp_auth_client::client::{
    ApiRequest, ApiResponse, HttpClient, HttpTransport, Navigator, TransportError,
};
use erp_auth_client::config::Environment;
use erp_auth_client::login::Clock;
use erp_auth_client::routing::LOGIN_ROUTE;
use erp_auth_client::session::{MemoryStore, SessionStore, UserProfile};

/// Transport double: queued responses, recorded requests, no network.
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn push_ok(&self, status: u16, body: Value) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(ApiResponse { status, body }));
    }

    pub fn push_network_err(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(TransportError(message.to_string())));
    }

    pub fn recorded(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no scripted response".to_string())))
    }
}

/// Navigator double that records every navigation.
pub struct RecordingNavigator {
    current: Mutex<String>,
    history: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn starting_at(route: &str) -> Arc<Self> {
        Arc::new(Self {
            current: Mutex::new(route.to_string()),
            history: Mutex::new(Vec::new()),
        })
    }

    pub fn history(&self) -> Vec<String> {
        self.history.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_route(&self) -> String {
        self.current.lock().unwrap().clone()
    }

    fn navigate(&self, route: &str) {
        *self.current.lock().unwrap() = route.to_string();
        self.history.lock().unwrap().push(route.to_string());
    }
}

/// Session store double that counts clears.
pub struct CountingStore {
    inner: MemoryStore,
    clears: Mutex<usize>,
}

impl CountingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStore::new(),
            clears: Mutex::new(0),
        })
    }

    pub fn clear_count(&self) -> usize {
        *self.clears.lock().unwrap()
    }
}

impl SessionStore for CountingStore {
    fn save(&self, token: &str, user: &UserProfile) {
        self.inner.save(token, user);
    }

    fn clear(&self) {
        *self.clears.lock().unwrap() += 1;
        self.inner.clear();
    }

    fn token(&self) -> Option<String> {
        self.inner.token()
    }

    fn read(&self) -> Option<erp_auth_client::session::Session> {
        self.inner.read()
    }
}

/// Hand-driven clock for cooldown tests.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Utc::now()),
        })
    }

    pub fn advance_secs(&self, secs: i64) {
        let mut now = self.now.lock().unwrap();
        *now += Duration::seconds(secs);
    }

    pub fn advance_millis(&self, millis: i64) {
        let mut now = self.now.lock().unwrap();
        *now += Duration::milliseconds(millis);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub const BASE_URL: &str = "http://api.test";

pub struct TestStack {
    pub transport: Arc<ScriptedTransport>,
    pub store: Arc<CountingStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub auth: Arc<AuthService>,
}

/// Wire a full service stack around the doubles.
pub fn stack(environment: Environment, start_route: &str) -> TestStack {
    let transport = ScriptedTransport::new();
    let store = CountingStore::new();
    let navigator = RecordingNavigator::starting_at(start_route);

    let http = HttpClient::new(
        Arc::clone(&transport) as Arc<dyn HttpTransport>,
        Arc::clone(&store) as Arc<dyn SessionStore>,
        Arc::clone(&navigator) as Arc<dyn Navigator>,
        BASE_URL,
    );
    let auth = Arc::new(AuthService::new(
        http,
        Arc::clone(&store) as Arc<dyn SessionStore>,
        Arc::clone(&navigator) as Arc<dyn Navigator>,
        environment,
    ));

    TestStack {
        transport,
        store,
        navigator,
        auth,
    }
}

pub fn dev_stack() -> TestStack {
    stack(Environment::Development, LOGIN_ROUTE)
}

pub fn user_json(role: &str) -> Value {
    json!({
        "user_id": "u-100",
        "email": "user@example.com",
        "full_name": "Test User",
        "phone": "+971500000000",
        "role": role,
        "role_id": "r-7",
        "department": "operations",
        "permissions": ["purchase.read", "purchase.create"]
    })
}

pub fn login_response(email: &str) -> Value {
    json!({
        "message": "OTP sent",
        "email": email,
        "otp_expiry": "2026-01-01T00:05:00Z",
        "otp": "123456"
    })
}

pub fn verify_response(role: &str, token: &str) -> Value {
    json!({
        "message": "verified",
        "access_token": token,
        "expires_at": "2026-01-02T00:00:00Z",
        "user": user_json(role)
    })
}

pub fn self_response(role: &str) -> Value {
    json!({ "user": user_json(role) })
}

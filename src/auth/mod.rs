use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::client::{ApiResponse, HttpClient, Navigator};
use crate::config::Environment;
use crate::error::{backend_message, AuthError};
use crate::routing::{Role, LOGIN_ROUTE};
use crate::session::{Session, SessionStore, UserProfile};

const SEND_CODE_FALLBACK: &str = "Failed to send verification code";
const VERIFY_FALLBACK: &str = "Invalid verification code";
const WHOAMI_FALLBACK: &str = "Failed to get user";

/// Result of requesting a one-time code.
#[derive(Debug, Clone, Deserialize)]
pub struct CodeIssued {
    #[serde(default)]
    pub message: Option<String>,
    pub email: String,
    #[serde(default)]
    pub otp_expiry: Option<DateTime<Utc>>,
    /// Echoed by the backend outside production for developer convenience.
    /// Redacted client-side in production regardless of what the backend sends.
    #[serde(default)]
    pub otp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    access_token: String,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
    user: UserProfile,
}

#[derive(Debug, Deserialize)]
struct SelfResponse {
    user: UserProfile,
}

/// Two-phase passwordless login and session bootstrapping.
///
/// All collaborators are injected: the HTTP choke point, the session store,
/// and the navigator. Nothing here reaches for globals.
pub struct AuthService {
    http: HttpClient,
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    environment: Environment,
}

impl AuthService {
    pub fn new(
        http: HttpClient,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
        environment: Environment,
    ) -> Self {
        Self {
            http,
            store,
            navigator,
            environment,
        }
    }

    /// `POST /login` - ask the backend to email a one-time code.
    pub async fn request_code(
        &self,
        email: &str,
        role: Option<Role>,
    ) -> Result<CodeIssued, AuthError> {
        let mut body = json!({ "email": email });
        if let Some(role) = role {
            body["role"] = json!(role.as_str());
        }

        let response = self.http.post("/login", body).await?;
        if !response.is_success() {
            return Err(self.classify(&response, SEND_CODE_FALLBACK));
        }

        let mut issued: CodeIssued = serde_json::from_value(response.body)
            .map_err(|e| AuthError::ServerError {
                status: response.status,
                detail: format!("malformed response: {}", e),
            })?;
        if self.environment == Environment::Production {
            issued.otp = None;
        }
        Ok(issued)
    }

    /// `POST /verification_otp` - exchange the emailed code for a session.
    ///
    /// On success the token and profile are persisted together before the
    /// session is returned; the store never holds one without the other.
    pub async fn verify_code(&self, email: &str, code: &str) -> Result<Session, AuthError> {
        let body = json!({ "email": email, "otp": code });

        let response = self.http.post("/verification_otp", body).await?;
        if !response.is_success() {
            return Err(self.classify(&response, VERIFY_FALLBACK));
        }

        let verified: VerifyResponse = serde_json::from_value(response.body)
            .map_err(|e| AuthError::ServerError {
                status: response.status,
                detail: format!("malformed response: {}", e),
            })?;

        self.store.save(&verified.access_token, &verified.user);
        tracing::info!(role = %verified.user.role, "login verified");

        Ok(Session {
            access_token: verified.access_token,
            expires_at: verified.expires_at,
            user: verified.user,
        })
    }

    /// `GET /self` - fresh profile snapshot. Rewrites the cached profile
    /// next to the existing token when one is stored.
    pub async fn current_user(&self) -> Result<UserProfile, AuthError> {
        let response = self.http.get("/self").await?;
        if !response.is_success() {
            return Err(self.classify(&response, WHOAMI_FALLBACK));
        }

        let whoami: SelfResponse = serde_json::from_value(response.body)
            .map_err(|e| AuthError::ServerError {
                status: response.status,
                detail: format!("malformed response: {}", e),
            })?;

        if let Some(token) = self.store.token() {
            self.store.save(&token, &whoami.user);
        }
        Ok(whoami.user)
    }

    /// `POST /logout`, best effort. The backend call may fail; local state
    /// is cleared and the user sent to the login route no matter what.
    pub async fn logout(&self) {
        match self.http.post("/logout", json!({})).await {
            Ok(response) if response.is_success() => {}
            Ok(response) => {
                tracing::warn!(status = response.status, "logout rejected by backend, clearing locally");
            }
            Err(e) => {
                tracing::warn!("logout request failed, clearing locally: {}", e);
            }
        }
        self.store.clear();
        self.navigator.navigate(LOGIN_ROUTE);
    }

    // Pure reads over the cached profile. No network; all degrade to
    // false/empty when nothing is cached.

    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    pub fn role(&self) -> Option<String> {
        self.store.read().map(|session| session.user.role)
    }

    pub fn permissions(&self) -> Vec<String> {
        self.store
            .read()
            .map(|session| session.user.permissions)
            .unwrap_or_default()
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions().iter().any(|p| p == permission)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role().as_deref() == Some(role)
    }

    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        match self.role() {
            Some(current) => roles.iter().any(|r| *r == current),
            None => false,
        }
    }

    /// Map a non-2xx response onto the closed error set, carrying the
    /// backend message when one is present.
    fn classify(&self, response: &ApiResponse, fallback: &str) -> AuthError {
        let detail = backend_message(&response.body, fallback);
        match response.status {
            401 => AuthError::Unauthorized(detail),
            status if status >= 500 => AuthError::ServerError { status, detail },
            _ => AuthError::InvalidCredentials(detail),
        }
    }
}

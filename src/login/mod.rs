use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::auth::{AuthService, CodeIssued};
use crate::client::Navigator;
use crate::error::AuthError;
use crate::routing::{landing_route, Role};

/// Time source for the resend cooldown. Injected so tests drive it by hand.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStep {
    /// Collecting email address and role.
    Email,
    /// Code has been emailed; collecting the 6-digit entry.
    AwaitingCode,
}

/// The two-step login flow as an explicit state machine.
///
/// There is no terminal state: a successful code submission navigates away
/// and the flow value is simply dropped. Failed submissions leave the step
/// unchanged so the user can retry.
pub struct LoginFlow {
    auth: Arc<AuthService>,
    navigator: Arc<dyn Navigator>,
    clock: Arc<dyn Clock>,
    resend_cooldown: Duration,
    step: LoginStep,
    email: String,
    role: Option<Role>,
    resend_ready_at: Option<DateTime<Utc>>,
}

impl LoginFlow {
    pub fn new(
        auth: Arc<AuthService>,
        navigator: Arc<dyn Navigator>,
        clock: Arc<dyn Clock>,
        resend_cooldown_secs: i64,
    ) -> Self {
        Self {
            auth,
            navigator,
            clock,
            resend_cooldown: Duration::seconds(resend_cooldown_secs),
            step: LoginStep::Email,
            email: String::new(),
            role: None,
            resend_ready_at: None,
        }
    }

    pub fn step(&self) -> LoginStep {
        self.step
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Seconds until `resend` becomes available, rounded up; 0 when it
    /// already is. Display only; the gate compares the deadline directly.
    pub fn resend_available_in(&self) -> i64 {
        match self.resend_ready_at {
            Some(ready_at) => {
                let millis = (ready_at - self.clock.now()).num_milliseconds();
                (millis.max(0) + 999) / 1000
            }
            None => 0,
        }
    }

    fn resend_blocked(&self) -> bool {
        matches!(self.resend_ready_at, Some(ready_at) if self.clock.now() < ready_at)
    }

    /// `email -> otp`. Both fields are validated before any network call;
    /// a violation surfaces as a field error and nothing is sent.
    pub async fn submit_email(
        &mut self,
        email: &str,
        role: &str,
    ) -> Result<CodeIssued, AuthError> {
        if self.step != LoginStep::Email {
            return Err(AuthError::invalid_input("email", "a code is already pending"));
        }
        validate_email(email)?;
        let role: Role = role
            .parse()
            .map_err(|_| AuthError::invalid_input("role", "select a valid role"))?;

        let issued = self.auth.request_code(email, Some(role)).await?;

        self.email = email.to_string();
        self.role = Some(role);
        self.step = LoginStep::AwaitingCode;
        self.arm_cooldown();
        Ok(issued)
    }

    /// `otp -> (navigate away)`. Verifies the code, refreshes the profile,
    /// resolves the landing route for the returned role and navigates.
    /// Returns the landing route. On failure the step does not change.
    pub async fn submit_code(&mut self, code: &str) -> Result<String, AuthError> {
        if self.step != LoginStep::AwaitingCode {
            return Err(AuthError::invalid_input("otp", "request a code first"));
        }
        validate_code(code)?;

        let session = self.auth.verify_code(&self.email, code).await?;
        self.auth.current_user().await?;

        let route = landing_route(&session.user.role);
        self.navigator.navigate(route);
        Ok(route.to_string())
    }

    /// Self-loop on the otp step. A no-op (and no network call) while the
    /// cooldown is running; afterwards requests a fresh code and re-arms it.
    pub async fn resend(&mut self) -> Result<CodeIssued, AuthError> {
        if self.step != LoginStep::AwaitingCode {
            return Err(AuthError::invalid_input("resend", "request a code first"));
        }
        if self.resend_blocked() {
            return Err(AuthError::invalid_input(
                "resend",
                format!(
                    "wait {}s before requesting another code",
                    self.resend_available_in()
                ),
            ));
        }

        let issued = self.auth.request_code(&self.email, self.role).await?;
        self.arm_cooldown();
        Ok(issued)
    }

    /// `otp -> email`. Discards the pending code entry; no network call.
    pub fn back(&mut self) {
        self.step = LoginStep::Email;
        self.resend_ready_at = None;
    }

    fn arm_cooldown(&mut self) {
        self.resend_ready_at = Some(self.clock.now() + self.resend_cooldown);
    }
}

/// Shape check only: `local@domain.tld`, no whitespace. The server remains
/// the authority on deliverability.
pub fn validate_email(email: &str) -> Result<(), AuthError> {
    let err = || AuthError::invalid_input("email", "enter a valid email address");

    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return Err(err());
    }
    let (local, domain) = email.split_once('@').ok_or_else(err)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(err());
    }
    let (host, tld) = domain.rsplit_once('.').ok_or_else(err)?;
    if host.is_empty() || tld.is_empty() {
        return Err(err());
    }
    Ok(())
}

/// The emailed code is exactly six ASCII digits.
pub fn validate_code(code: &str) -> Result<(), AuthError> {
    if code.len() == 6 && code.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(AuthError::invalid_input("otp", "enter the 6-digit code"))
    }
}

use serde_json::Value;

/// Closed set of failure kinds surfaced by the auth client.
///
/// The backend only ever returns a human-readable message; that message is
/// preserved verbatim in the detail field of each variant so callers can
/// display it, while the variant itself tells them what actually happened.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Input rejected locally, before any network call was made.
    #[error("{field}: {message}")]
    InvalidInput { field: String, message: String },

    /// The backend rejected the credentials (wrong/expired code, unknown email).
    #[error("{0}")]
    InvalidCredentials(String),

    /// A 401 was observed on an authenticated call; the session is gone.
    #[error("{0}")]
    Unauthorized(String),

    /// No response was received at all (DNS, connect, timeout).
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The backend answered with a 5xx status.
    #[error("server error ({status}): {detail}")]
    ServerError { status: u16, detail: String },
}

impl AuthError {
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        AuthError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// True when the failure was caught locally and no request was issued.
    pub fn is_local(&self) -> bool {
        matches!(self, AuthError::InvalidInput { .. })
    }
}

/// Pull the human-readable message out of a backend error body.
///
/// The API is inconsistent about the field name (`error` on auth endpoints,
/// `message` elsewhere), so both are tried before falling back.
pub fn backend_message(body: &Value, fallback: &str) -> String {
    body.get("error")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

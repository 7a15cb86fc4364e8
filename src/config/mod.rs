use serde::{Deserialize, Serialize};
use std::env;

/// Default backend endpoint for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub identity: IdentityConfig,
    pub login: LoginConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

/// Identity-provider endpoint used for realtime/session persistence.
/// Both fields are required; startup fails fast without them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub url: String,
    pub public_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginConfig {
    pub resend_cooldown_secs: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {name}: {remedy}")]
    MissingVar { name: &'static str, remedy: &'static str },

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

fn require_var(name: &'static str, remedy: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar { name, remedy }),
    }
}

impl AppConfig {
    /// Build the configuration from the process environment.
    ///
    /// Required variables are validated here, eagerly, so a misconfigured
    /// deployment refuses to start instead of failing on the first request.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let identity = IdentityConfig {
            url: require_var(
                "ERP_IDENTITY_URL",
                "set it to the identity provider endpoint, e.g. https://id.example.com/v1",
            )?,
            public_key: require_var(
                "ERP_IDENTITY_PUBLIC_KEY",
                "set it to the identity provider project public key",
            )?,
        };

        match environment {
            Environment::Production => Self::production(identity),
            Environment::Staging => Self::staging(identity),
            Environment::Development => Self::development(identity),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(v) = env::var("ERP_API_URL") {
            if !v.trim().is_empty() {
                self.api.base_url = v;
            }
        }
        if let Ok(v) = env::var("ERP_REQUEST_TIMEOUT_SECS") {
            self.api.request_timeout_secs =
                v.parse().map_err(|_| ConfigError::InvalidValue {
                    name: "ERP_REQUEST_TIMEOUT_SECS",
                    value: v,
                })?;
        }
        if let Ok(v) = env::var("ERP_RESEND_COOLDOWN_SECS") {
            self.login.resend_cooldown_secs =
                v.parse().map_err(|_| ConfigError::InvalidValue {
                    name: "ERP_RESEND_COOLDOWN_SECS",
                    value: v,
                })?;
        }
        Ok(self)
    }

    fn development(identity: IdentityConfig) -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: DEFAULT_API_URL.to_string(),
                request_timeout_secs: 30,
            },
            identity,
            login: LoginConfig {
                resend_cooldown_secs: 30,
            },
        }
    }

    fn staging(identity: IdentityConfig) -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: DEFAULT_API_URL.to_string(),
                request_timeout_secs: 15,
            },
            identity,
            login: LoginConfig {
                resend_cooldown_secs: 30,
            },
        }
    }

    fn production(identity: IdentityConfig) -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: DEFAULT_API_URL.to_string(),
                request_timeout_secs: 15,
            },
            identity,
            login: LoginConfig {
                resend_cooldown_secs: 30,
            },
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

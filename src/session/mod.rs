use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Snapshot of the authenticated user, taken at login time.
///
/// The profile is never refreshed incrementally; `permissions` is consulted
/// only from this cached copy and may drift from the server until the next
/// full refresh via `GET /self`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: String,
    #[serde(default)]
    pub role_id: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    /// Server-side expiry; informational only. Expiry is enforced by the
    /// server, never checked locally.
    pub expires_at: Option<DateTime<Utc>>,
    pub user: UserProfile,
}

/// Durable storage for the current session.
///
/// One invariant matters here: the token and the profile are always written
/// together and removed together. A store never holds one without the other.
pub trait SessionStore: Send + Sync {
    /// Persist both values. Storage failures are logged, not surfaced.
    fn save(&self, token: &str, user: &UserProfile);

    /// Remove everything. Idempotent; safe when nothing is stored.
    fn clear(&self);

    /// The bare token, if any.
    fn token(&self) -> Option<String>;

    fn read(&self) -> Option<Session>;

    /// Token presence only; no validity check of any kind.
    fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

/// In-memory store, used by tests and short-lived embedders.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Option<(String, UserProfile)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn save(&self, token: &str, user: &UserProfile) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some((token.to_string(), user.clone()));
    }

    fn clear(&self) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    fn token(&self) -> Option<String> {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.as_ref().map(|(token, _)| token.clone())
    }

    fn read(&self) -> Option<Session> {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.as_ref().map(|(token, user)| Session {
            access_token: token.clone(),
            expires_at: None,
            user: user.clone(),
        })
    }
}

/// File-backed store under the CLI config directory.
///
/// Layout mirrors the web client's storage keys: a raw `access_token` file
/// next to a JSON-serialized `user` file.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Resolve the config directory (`ERP_CLI_CONFIG_DIR` override, else
    /// `~/.config/erp/cli`) and make sure it exists.
    pub fn open_default() -> anyhow::Result<Self> {
        let dir = if let Ok(custom) = std::env::var("ERP_CLI_CONFIG_DIR") {
            PathBuf::from(custom)
        } else {
            let home = std::env::var("HOME")
                .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
            PathBuf::from(home).join(".config").join("erp").join("cli")
        };
        Self::open(dir)
    }

    pub fn open(dir: PathBuf) -> anyhow::Result<Self> {
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(Self { dir })
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join("access_token")
    }

    fn user_path(&self) -> PathBuf {
        self.dir.join("user")
    }
}

impl SessionStore for FileStore {
    fn save(&self, token: &str, user: &UserProfile) {
        if let Err(e) = fs::write(self.token_path(), token) {
            tracing::error!("failed to persist access token: {}", e);
            return;
        }
        match serde_json::to_string_pretty(user) {
            Ok(json) => {
                if let Err(e) = fs::write(self.user_path(), json) {
                    tracing::error!("failed to persist user profile: {}", e);
                    // Do not leave a token without a profile behind.
                    let _ = fs::remove_file(self.token_path());
                }
            }
            Err(e) => {
                tracing::error!("failed to serialize user profile: {}", e);
                let _ = fs::remove_file(self.token_path());
            }
        }
    }

    fn clear(&self) {
        let _ = fs::remove_file(self.token_path());
        let _ = fs::remove_file(self.user_path());
    }

    fn token(&self) -> Option<String> {
        let token = fs::read_to_string(self.token_path()).ok()?;
        let token = token.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    fn read(&self) -> Option<Session> {
        let token = self.token()?;
        let raw = fs::read_to_string(self.user_path()).ok()?;
        let user: UserProfile = serde_json::from_str(&raw).ok()?;
        Some(Session {
            access_token: token,
            expires_at: None,
            user,
        })
    }
}

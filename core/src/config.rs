//! Client configuration.
//!
//! Defaults target a campus mail server on localhost. Every field can be
//! overridden from the environment with `ClientConfig::from_env`.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::session::FileSessionStore;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_MAX_RESPONSE_BYTES: u64 = 64 * 1024 * 1024;

pub const ENV_BASE_URL: &str = "CAMPUSMAIL_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "CAMPUSMAIL_TIMEOUT_SECS";
pub const ENV_SESSION_DIR: &str = "CAMPUSMAIL_SESSION_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Whole-request timeout enforced by the transport. `None` waits
    /// indefinitely.
    pub timeout: Option<Duration>,
    /// Largest response body the transport will buffer, e.g. for
    /// attachment downloads.
    pub max_response_bytes: u64,
    /// Directory holding the persisted session credential.
    pub session_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            session_dir: FileSessionStore::default_dir(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unparseable values are
    /// logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(0) => config.timeout = None,
                Ok(secs) => config.timeout = Some(Duration::from_secs(secs)),
                Err(err) => warn!(var = ENV_TIMEOUT_SECS, value = %raw, %err, "ignoring invalid timeout"),
            }
        }
        if let Some(dir) = lookup(ENV_SESSION_DIR).filter(|v| !v.trim().is_empty()) {
            config.session_dir = PathBuf::from(dir);
        }
        config
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn session_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.session_dir = dir.into();
        self
    }
}

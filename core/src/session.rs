//! Session credential storage.
//!
//! # Design
//! The credential is an opaque token. Stores only hold it; nothing here
//! decodes it or checks expiry, and the navigation gate only asks whether
//! one is present. Stores are passed explicitly to the client and the
//! navigator rather than living in a global.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use thiserror::Error;
use tracing::warn;

/// Name of the storage entry holding the token.
pub const TOKEN_KEY: &str = "token";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage I/O failed at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("session storage lock poisoned")]
    Poisoned,
}

/// Where the session credential lives between requests and navigations.
pub trait SessionStore: Send + Sync {
    fn token(&self) -> Result<Option<String>, SessionError>;

    fn store(&self, token: &str) -> Result<(), SessionError>;

    fn clear(&self) -> Result<(), SessionError>;

    /// Presence check used by the navigation gate. A store that cannot be
    /// read counts as holding no credential.
    fn has_credential(&self) -> bool {
        match self.token() {
            Ok(token) => token.is_some(),
            Err(err) => {
                warn!(%err, "session store unreadable, treating credential as absent");
                false
            }
        }
    }
}

/// Process-local store, forgotten on exit.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: RwLock<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: RwLock::new(Some(token.to_string())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn token(&self) -> Result<Option<String>, SessionError> {
        let guard = self.token.read().map_err(|_| SessionError::Poisoned)?;
        Ok(guard.clone())
    }

    fn store(&self, token: &str) -> Result<(), SessionError> {
        let mut guard = self.token.write().map_err(|_| SessionError::Poisoned)?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut guard = self.token.write().map_err(|_| SessionError::Poisoned)?;
        *guard = None;
        Ok(())
    }
}

/// Persistent store: a single `token` file inside a directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(TOKEN_KEY),
        }
    }

    /// `<data dir>/campusmail`, falling back to the working directory on
    /// platforms without a data dir.
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("campusmail")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStore for FileSessionStore {
    fn token(&self) -> Result<Option<String>, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(self.io_error(err)),
        }
    }

    fn store(&self, token: &str) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        fs::write(&self.path, token).map_err(|e| self.io_error(e))
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error(err)),
        }
    }
}

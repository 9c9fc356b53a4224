//! Credential persistence: one bearer token in one named slot.
//!
//! The storage backend is picked explicitly at startup — a file-backed store
//! for interactive use, an in-memory store for tests and non-interactive
//! contexts — instead of probing the environment on every call.

use std::path::{Path, PathBuf};

use derive_more::{Display, From, Into};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// File name of the persisted bearer token.
const TOKEN_FILE: &str = "devcollab_token";
/// File name of the legacy cached-profile snapshot, removed by `clear`.
const PROFILE_FILE: &str = "devcollab_user";

/// Opaque bearer token proving an authenticated session.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Durable, process-wide persistence of the session credential.
///
/// A single named slot: `set` overwrites unconditionally, there is no
/// multi-session support. All operations are synchronous and atomic from the
/// perspective of a single-threaded caller.
pub trait CredentialStore: Send + Sync + 'static {
    /// The stored credential, if any. Read failures are treated as "no
    /// credential" — an unreadable token is indistinguishable from a
    /// logged-out state.
    fn get(&self) -> Option<Token>;

    /// Persist the credential, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the slot could not be written.
    fn set(&self, token: &Token) -> Result<(), Error>;

    /// Delete the credential. Deleting an empty slot is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the slot could not be removed.
    fn remove(&self) -> Result<(), Error>;

    /// Delete the credential and any cached profile snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if either slot could not be removed.
    fn clear(&self) -> Result<(), Error>;
}

/// In-memory credential store for tests and non-interactive contexts.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<Token>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<Token> {
        self.slot.lock().clone()
    }

    fn set(&self, token: &Token) -> Result<(), Error> {
        *self.slot.lock() = Some(token.clone());
        Ok(())
    }

    fn remove(&self) -> Result<(), Error> {
        *self.slot.lock() = None;
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        self.remove()
    }
}

/// File-backed credential store for interactive contexts.
///
/// Keeps the token as the raw contents of one file under `dir`; the
/// directory is created on first write.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    dir: PathBuf,
}

impl FileCredentialStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    fn profile_path(&self) -> PathBuf {
        self.dir.join(PROFILE_FILE)
    }

    fn remove_file(path: &Path) -> Result<(), Error> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Store(format!("remove {}: {e}", path.display()))),
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Option<Token> {
        match std::fs::read_to_string(self.token_path()) {
            Ok(raw) if !raw.is_empty() => Some(Token::new(raw)),
            Ok(_) => None,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::debug!(error = %e, "credential read failed");
                None
            }
        }
    }

    fn set(&self, token: &Token) -> Result<(), Error> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| Error::Store(format!("create {}: {e}", self.dir.display())))?;
        std::fs::write(self.token_path(), token.as_str())
            .map_err(|e| Error::Store(format!("write {}: {e}", self.token_path().display())))
    }

    fn remove(&self) -> Result<(), Error> {
        Self::remove_file(&self.token_path())
    }

    fn clear(&self) -> Result<(), Error> {
        self.remove()?;
        Self::remove_file(&self.profile_path())
    }
}

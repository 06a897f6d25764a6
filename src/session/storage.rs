use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::traits::TokenStore;
use crate::error::Error;
use crate::types::BearerToken;

/// Storage key of the persisted token.
pub const DEFAULT_TOKEN_KEY: &str = "token";

/// Process-local token slot. Lost on exit; useful for tests and
/// short-lived tools.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<BearerToken>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a token already persisted.
    #[must_use]
    pub fn with_token(token: BearerToken) -> Self {
        Self {
            slot: Mutex::new(Some(token)),
        }
    }

    /// Current slot content, without going through the async trait.
    #[must_use]
    pub fn peek(&self) -> Option<BearerToken> {
        self.slot.lock().clone()
    }
}

impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<BearerToken>, Error> {
        Ok(self.peek())
    }

    async fn save(&self, token: &BearerToken) -> Result<(), Error> {
        *self.slot.lock() = Some(token.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        *self.slot.lock() = None;
        Ok(())
    }
}

/// Token slot backed by one file per key inside a directory.
///
/// The file holds the raw token. A missing or blank file is an empty slot.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    dir: PathBuf,
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, key: &str) -> Self {
        let dir = dir.into();
        let path = dir.join(key);
        Self { dir, path }
    }

    /// File holding the token.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<BearerToken>, Error> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| BearerToken::new(token)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, token: &BearerToken) -> Result<(), Error> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&self.path, token.as_str()).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

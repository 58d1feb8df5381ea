use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

/// Fixed name under which the raw session token is persisted.
pub const TOKEN_STORAGE_KEY: &str = "token";

/// Durable home of the session token. Purely mechanical: no validation happens here.
pub trait TokenStore: Send + Sync {
    fn read(&self) -> Option<String>;
    fn save(&self, token: &str);
    fn clear(&self);
}

/// Process-local store, mostly useful for tests and embedding.
#[derive(Clone, Default)]
pub struct MemoryTokenStore {
    inner: Arc<RwLock<Option<String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(token.into()))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn read(&self) -> Option<String> {
        let guard = self.inner.read().expect("rwlock poisoned");
        guard.clone()
    }

    fn save(&self, token: &str) {
        let mut guard = self.inner.write().expect("rwlock poisoned");
        *guard = Some(token.to_owned());
    }

    fn clear(&self) {
        let mut guard = self.inner.write().expect("rwlock poisoned");
        *guard = None;
    }
}

/// Persists the token as a single file named [`TOKEN_STORAGE_KEY`] inside a directory.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(TOKEN_STORAGE_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn read(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    None
                } else {
                    Some(token.to_owned())
                }
            }
            Err(err) => {
                if err.kind() != ErrorKind::NotFound {
                    debug!(path = %self.path.display(), error = %err, "token storage unreadable");
                }
                None
            }
        }
    }

    fn save(&self, token: &str) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                warn!(path = %parent.display(), error = %err, "failed to create token storage directory");
                return;
            }
        }
        if let Err(err) = fs::write(&self.path, token) {
            warn!(path = %self.path.display(), error = %err, "failed to persist session token");
        }
    }

    fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to erase session token");
            }
        }
    }
}

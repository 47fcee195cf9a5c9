//! Session identity provider.
//!
//! Each end user is identified to the engine by a stable id that is
//! minted once and reused across runs. Callers depend on the
//! [`SessionIdentity`] trait so the storage can be swapped in tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::CoreError;

/// Supplies the correlation id jobs are submitted under.
pub trait SessionIdentity: Send + Sync {
    /// The current id, minting one if none exists yet.
    fn correlation_id(&self) -> Result<String, CoreError>;

    /// Forget the current id so the next call mints a fresh one.
    fn reset(&self) -> Result<(), CoreError>;
}

// ---------------------------------------------------------------------------
// FileIdentityStore
// ---------------------------------------------------------------------------

/// Persists the id as a single line in a file.
#[derive(Debug)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Option<String>, CoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let id = contents.trim();
                Ok((!id.is_empty()).then(|| id.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::Identity(format!(
                "Failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn store(&self, id: &str) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                CoreError::Identity(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }
        fs::write(&self.path, id).map_err(|e| {
            CoreError::Identity(format!("Failed to write {}: {e}", self.path.display()))
        })
    }
}

impl SessionIdentity for FileIdentityStore {
    fn correlation_id(&self) -> Result<String, CoreError> {
        if let Some(id) = self.load()? {
            return Ok(id);
        }

        let id = uuid::Uuid::new_v4().to_string();
        self.store(&id)?;
        tracing::info!(user_id = %id, path = %self.path.display(), "Generated new user id");
        Ok(id)
    }

    fn reset(&self) -> Result<(), CoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::Identity(format!(
                "Failed to remove {}: {e}",
                self.path.display()
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// InMemoryIdentity
// ---------------------------------------------------------------------------

/// In-memory identity; starts from a known id and mints UUIDs after a reset.
#[derive(Debug)]
pub struct InMemoryIdentity {
    id: Mutex<Option<String>>,
}

impl InMemoryIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Mutex::new(Some(id.into())),
        }
    }
}

impl SessionIdentity for InMemoryIdentity {
    fn correlation_id(&self) -> Result<String, CoreError> {
        let mut slot = self
            .id
            .lock()
            .map_err(|_| CoreError::Identity("identity lock poisoned".to_string()))?;
        Ok(slot
            .get_or_insert_with(|| uuid::Uuid::new_v4().to_string())
            .clone())
    }

    fn reset(&self) -> Result<(), CoreError> {
        let mut slot = self
            .id
            .lock()
            .map_err(|_| CoreError::Identity("identity lock poisoned".to_string()))?;
        *slot = None;
        Ok(())
    }
}

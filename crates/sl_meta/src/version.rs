use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use tokio::fs;

use sl_core::json::VersionPatch;
use sl_core::{IntoIoError, IntoJsonError};

use crate::MetaError;

/// A handle to one (uid, version) pair in the metadata cache.
///
/// The underlying version file is read on the first [`load`](Self::load) and
/// shared from then on; components hold clones of the same `Arc` handle.
#[derive(Debug)]
pub struct VersionHandle {
    uid: String,
    version: String,
    path: PathBuf,
    data: OnceLock<Arc<VersionPatch>>,
}

impl VersionHandle {
    pub(crate) fn new(uid: String, version: String, path: PathBuf) -> Self {
        Self {
            uid,
            version,
            path,
            data: OnceLock::new(),
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// The pinned version this handle was requested for.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_loaded(&self) -> bool {
        self.data.get().is_some()
    }

    /// Reads the version file from the cache. Idempotent.
    pub async fn load(&self) -> Result<(), MetaError> {
        if self.is_loaded() {
            return Ok(());
        }
        if !self.path.is_file() {
            return Err(MetaError::MissingVersion {
                uid: self.uid.clone(),
                version: self.version.clone(),
            });
        }
        let text = fs::read_to_string(&self.path).await.path(&self.path)?;
        let patch: VersionPatch = serde_json::from_str(&text).json(text)?;
        let _ = self.data.set(Arc::new(patch));
        Ok(())
    }

    /// The loaded version file, `None` until a successful [`load`](Self::load).
    pub fn data(&self) -> Option<Arc<VersionPatch>> {
        self.data.get().cloned()
    }

    pub fn name(&self) -> Option<String> {
        self.data
            .get()
            .filter(|patch| !patch.name.is_empty())
            .map(|patch| patch.name.clone())
    }

    pub fn release_time(&self) -> Option<String> {
        self.data
            .get()
            .filter(|patch| !patch.release_time.is_empty())
            .map(|patch| patch.release_time.clone())
    }
}

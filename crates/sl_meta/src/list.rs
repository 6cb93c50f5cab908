use std::path::PathBuf;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tokio::fs;

use sl_core::{IntoIoError, IntoJsonError};

use crate::MetaError;

/// One row of a component's version list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VersionEntry {
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub release_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct VersionListFile {
    #[serde(default)]
    uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    versions: Vec<VersionEntry>,
}

/// All known versions of one component, read lazily from
/// `<meta_dir>/<uid>/index.json`.
#[derive(Debug)]
pub struct VersionList {
    uid: String,
    path: PathBuf,
    data: OnceLock<VersionListFile>,
}

impl VersionList {
    pub(crate) fn new(uid: String, path: PathBuf) -> Self {
        Self {
            uid,
            path,
            data: OnceLock::new(),
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn is_loaded(&self) -> bool {
        self.data.get().is_some()
    }

    /// Reads the list from the cache. Idempotent; a second call after a
    /// successful load is a no-op.
    pub async fn load(&self) -> Result<(), MetaError> {
        if self.is_loaded() {
            return Ok(());
        }
        let text = fs::read_to_string(&self.path).await.path(&self.path)?;
        let file: VersionListFile = serde_json::from_str(&text).json(text)?;
        let _ = self.data.set(file);
        Ok(())
    }

    /// Number of known versions; 0 while unloaded.
    pub fn count(&self) -> usize {
        self.data.get().map_or(0, |file| file.versions.len())
    }

    pub fn entries(&self) -> &[VersionEntry] {
        self.data.get().map_or(&[], |file| &file.versions)
    }

    pub fn name(&self) -> Option<&str> {
        self.data.get().and_then(|file| file.name.as_deref())
    }

    pub fn entry(&self, version: &str) -> Option<&VersionEntry> {
        self.entries().iter().find(|entry| entry.version == version)
    }
}

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use crate::{VersionHandle, VersionList};

/// The process-wide metadata index, backed by a local cache directory.
///
/// Handles and lists are created once per key and shared, so every caller
/// asking for the same (uid, version) observes the same load state. The two
/// cache maps sit behind plain mutexes that are never held across an await.
#[derive(Debug)]
pub struct MetaIndex {
    dir: PathBuf,
    lists: Mutex<HashMap<String, Arc<VersionList>>>,
    versions: Mutex<HashMap<(String, String), Arc<VersionHandle>>>,
}

impl MetaIndex {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lists: Mutex::new(HashMap::new()),
            versions: Mutex::new(HashMap::new()),
        }
    }

    /// Whether the cache knows this component at all.
    pub fn has_uid(&self, uid: &str) -> bool {
        self.dir.join(uid).join("index.json").is_file()
    }

    /// The version list for a uid, or `None` when the cache has no entry.
    /// The returned list still has to be [`load`](VersionList::load)ed.
    pub fn version_list(&self, uid: &str) -> Option<Arc<VersionList>> {
        if !self.has_uid(uid) {
            return None;
        }
        let mut lists = self.lists.lock().unwrap_or_else(PoisonError::into_inner);
        let list = lists.entry(uid.to_owned()).or_insert_with(|| {
            Arc::new(VersionList::new(
                uid.to_owned(),
                self.dir.join(uid).join("index.json"),
            ))
        });
        Some(Arc::clone(list))
    }

    /// A handle for one pinned (uid, version). Always succeeds; whether the
    /// cache actually has the version surfaces when the handle is loaded.
    pub fn get(&self, uid: &str, version: &str) -> Arc<VersionHandle> {
        let mut versions = self
            .versions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let handle = versions
            .entry((uid.to_owned(), version.to_owned()))
            .or_insert_with(|| {
                Arc::new(VersionHandle::new(
                    uid.to_owned(),
                    version.to_owned(),
                    self.dir.join(uid).join(format!("{version}.json")),
                ))
            });
        Arc::clone(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;
    use tokio::fs;

    async fn write_fixture(dir: &Path) {
        let mc = dir.join("net.minecraft");
        fs::create_dir_all(&mc).await.unwrap();
        fs::write(
            mc.join("index.json"),
            r#"{
                "uid": "net.minecraft",
                "name": "Minecraft",
                "versions": [
                    { "version": "1.12.2", "releaseTime": "2017-09-18T08:39:46+00:00" },
                    { "version": "1.7.10", "releaseTime": "2014-05-14T17:29:23+00:00" }
                ]
            }"#,
        )
        .await
        .unwrap();
        fs::write(
            mc.join("1.12.2.json"),
            r#"{
                "uid": "net.minecraft",
                "version": "1.12.2",
                "name": "Minecraft",
                "releaseTime": "2017-09-18T08:39:46+00:00",
                "mainJar": { "name": "com.mojang:minecraft:1.12.2" },
                "libraries": [{ "name": "com.google.guava:guava:21.0" }]
            }"#,
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn unknown_uid_has_no_list() {
        let dir = tempfile::TempDir::new().unwrap();
        let index = MetaIndex::new(dir.path());
        assert!(!index.has_uid("net.minecraft"));
        assert!(index.version_list("net.minecraft").is_none());
    }

    #[tokio::test]
    async fn version_list_loads_once_and_is_shared() {
        let dir = tempfile::TempDir::new().unwrap();
        write_fixture(dir.path()).await;
        let index = MetaIndex::new(dir.path());

        let list = index.version_list("net.minecraft").unwrap();
        assert!(!list.is_loaded());
        assert_eq!(list.count(), 0);

        list.load().await.unwrap();
        assert_eq!(list.count(), 2);
        assert_eq!(list.uid(), "net.minecraft");
        assert_eq!(list.name(), Some("Minecraft"));
        assert!(list.entry("1.7.10").is_some());
        assert_eq!(list.entries()[0].version, "1.12.2");

        // second lookup observes the already-loaded list
        let again = index.version_list("net.minecraft").unwrap();
        assert!(again.is_loaded());
    }

    #[tokio::test]
    async fn handle_loads_version_file() {
        let dir = tempfile::TempDir::new().unwrap();
        write_fixture(dir.path()).await;
        let index = MetaIndex::new(dir.path());

        let handle = index.get("net.minecraft", "1.12.2");
        assert!(!handle.is_loaded());
        assert!(handle.data().is_none());

        handle.load().await.unwrap();
        let patch = handle.data().unwrap();
        assert_eq!(patch.version, "1.12.2");
        assert_eq!(handle.name().as_deref(), Some("Minecraft"));

        // shared with later lookups
        assert!(index.get("net.minecraft", "1.12.2").is_loaded());
    }

    #[tokio::test]
    async fn loading_a_missing_version_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        write_fixture(dir.path()).await;
        let index = MetaIndex::new(dir.path());

        let handle = index.get("net.minecraft", "9.9.9");
        let err = handle.load().await.unwrap_err();
        assert!(matches!(err, crate::MetaError::MissingVersion { .. }));
        assert!(!handle.is_loaded());
    }
}

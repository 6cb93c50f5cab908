use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};

use sl_core::err;
use sl_core::json::{PatchProblem, ProblemSeverity, VersionPatch};
use sl_meta::{MetaIndex, VersionHandle, VersionList};

use crate::LaunchProfile;

/// Where a component's version file comes from.
#[derive(Debug, Clone)]
pub enum ComponentSource {
    /// Backed by the metadata index; the version file loads on demand.
    Remote(Arc<VersionHandle>),
    /// Backed by a patch file inside the instance. `file` is `None` when the
    /// file exists on disk but could not be parsed; the component then
    /// reports a load-error problem instead of failing the whole list.
    Local {
        path: PathBuf,
        file: Option<Arc<VersionPatch>>,
    },
}

/// One layered patch in an instance: identity, a remote or local source,
/// and the mutability flags the UI and edit operations consult.
#[derive(Debug, Clone)]
pub struct Component {
    uid: String,
    pub(crate) cached_name: String,
    pub(crate) current_version: String,
    source: ComponentSource,
    index: Arc<MetaIndex>,
    movable: bool,
    removable: bool,
    revertible: bool,
    vanilla: bool,
    order_override: Option<i32>,
}

impl Component {
    /// A component backed by the metadata index, pinned to the handle's
    /// version. Starts out vanilla.
    pub fn remote(handle: Arc<VersionHandle>, index: Arc<MetaIndex>) -> Self {
        Self {
            uid: handle.uid().to_owned(),
            cached_name: handle.name().unwrap_or_default(),
            current_version: handle.version().to_owned(),
            source: ComponentSource::Remote(handle),
            index,
            movable: false,
            removable: false,
            revertible: false,
            vanilla: true,
            order_override: None,
        }
    }

    /// A component backed by a patch file. `file` carries the parsed
    /// contents, or `None` when parsing failed.
    pub fn local(
        uid: impl Into<String>,
        path: PathBuf,
        file: Option<Arc<VersionPatch>>,
        index: Arc<MetaIndex>,
    ) -> Self {
        let (cached_name, current_version) = match &file {
            Some(file) => (file.name.clone(), file.version.clone()),
            None => (String::new(), String::new()),
        };
        Self {
            uid: uid.into(),
            cached_name,
            current_version,
            source: ComponentSource::Local { path, file },
            index,
            movable: false,
            removable: false,
            revertible: false,
            vanilla: false,
            order_override: None,
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Cached display name; falls back to the uid.
    pub fn name(&self) -> &str {
        if self.cached_name.is_empty() {
            &self.uid
        } else {
            &self.cached_name
        }
    }

    /// Declared version: remote pin, else the local file's version, else
    /// whatever the manifest cached.
    pub fn version(&self) -> &str {
        match &self.source {
            ComponentSource::Remote(handle) => handle.version(),
            ComponentSource::Local {
                file: Some(file), ..
            } if !file.version.is_empty() => &file.version,
            ComponentSource::Local { .. } => &self.current_version,
        }
    }

    pub fn release_date_time(&self) -> Option<DateTime<FixedOffset>> {
        match &self.source {
            ComponentSource::Remote(handle) => handle
                .release_time()
                .and_then(|time| DateTime::parse_from_rfc3339(&time).ok()),
            ComponentSource::Local { file, .. } => {
                file.as_ref().and_then(|file| file.release_date_time())
            }
        }
    }

    /// Ordering hint: explicit override, else the version file's `order`,
    /// else 0. Only a hint; the list's sequence order is authoritative.
    pub fn order(&self) -> i32 {
        if let Some(order) = self.order_override {
            return order;
        }
        match &self.source {
            ComponentSource::Remote(handle) => {
                handle.data().map_or(0, |file| file.order())
            }
            ComponentSource::Local { file, .. } => {
                file.as_ref().map_or(0, |file| file.order())
            }
        }
    }

    pub fn set_order(&mut self, order: i32) {
        self.order_override = Some(order);
    }

    pub fn set_movable(&mut self, movable: bool) {
        self.movable = movable;
    }

    pub fn set_removable(&mut self, removable: bool) {
        self.removable = removable;
    }

    pub fn set_revertible(&mut self, revertible: bool) {
        self.revertible = revertible;
    }

    pub fn set_vanilla(&mut self, vanilla: bool) {
        self.vanilla = vanilla;
    }

    /// The version file, loading remote metadata on demand. `None` when the
    /// patch cannot be obtained (broken local file, missing cache entry).
    pub async fn version_file(&self) -> Option<Arc<VersionPatch>> {
        match &self.source {
            ComponentSource::Remote(handle) => {
                if !handle.is_loaded() {
                    if let Err(error) = handle.load().await {
                        err!("Could not load metadata for {}: {error}", self.uid);
                    }
                }
                handle.data()
            }
            ComponentSource::Local { file, .. } => file.clone(),
        }
    }

    /// The version list the metadata index knows for this uid, if any.
    pub fn version_list(&self) -> Option<Arc<VersionList>> {
        self.index.version_list(&self.uid)
    }

    pub fn source(&self) -> &ComponentSource {
        &self.source
    }

    /// Path of the local patch file, for custom components.
    pub fn filename(&self) -> Option<&Path> {
        match &self.source {
            ComponentSource::Local { path, .. } => Some(path),
            ComponentSource::Remote(_) => None,
        }
    }

    /// A component is custom when it is backed by a local patch file.
    pub fn is_custom(&self) -> bool {
        matches!(self.source, ComponentSource::Local { .. })
    }

    /// Customizable: remote-backed and its version file actually loads.
    pub async fn is_customizable(&self) -> bool {
        match &self.source {
            ComponentSource::Remote(_) => self.version_file().await.is_some(),
            ComponentSource::Local { .. } => false,
        }
    }

    pub fn is_removable(&self) -> bool {
        self.removable
    }

    pub fn is_revertible(&self) -> bool {
        self.revertible
    }

    pub fn is_moveable(&self) -> bool {
        self.movable
    }

    pub fn is_vanilla(&self) -> bool {
        self.vanilla
    }

    /// Whether the metadata index offers versions to switch between. `false`
    /// until the index has a loadable, non-empty list for this uid.
    pub async fn is_version_changeable(&self) -> bool {
        if let Some(list) = self.version_list() {
            if !list.is_loaded() && list.load().await.is_err() {
                return false;
            }
            return list.count() != 0;
        }
        false
    }

    /// Worst severity of the component's current diagnostics. An
    /// unobtainable version file is itself an error.
    pub fn problem_severity(&self) -> ProblemSeverity {
        match &self.source {
            ComponentSource::Remote(handle) => handle
                .data()
                .map_or(ProblemSeverity::Error, |file| file.problem_severity()),
            ComponentSource::Local {
                file: Some(file), ..
            } => file.problem_severity(),
            ComponentSource::Local { file: None, .. } => ProblemSeverity::Error,
        }
    }

    pub fn problems(&self) -> Vec<PatchProblem> {
        let file = match &self.source {
            ComponentSource::Remote(handle) => handle.data(),
            ComponentSource::Local { file, .. } => file.clone(),
        };
        match file {
            Some(file) => file.problems().to_vec(),
            None => vec![PatchProblem::error("Patch is not loaded yet.")],
        }
    }

    /// Merges this component into the profile, or stamps the profile with
    /// this component's severity when the version file is unobtainable.
    pub async fn apply_to(&self, profile: &mut LaunchProfile) {
        match self.version_file().await {
            Some(file) => profile.apply_patch(&file),
            None => profile.apply_problem_severity(self.problem_severity()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_index() -> Arc<MetaIndex> {
        Arc::new(MetaIndex::new(std::env::temp_dir().join("sl-meta-none")))
    }

    fn local_patch(uid: &str, version: &str) -> Arc<VersionPatch> {
        Arc::new(VersionPatch {
            uid: uid.to_owned(),
            version: version.to_owned(),
            name: format!("{uid} name"),
            order: Some(7),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn local_component_reports_custom_and_its_file() {
        let patch = local_patch("net.minecraftforge", "14.23.5");
        let component = Component::local(
            "net.minecraftforge",
            PathBuf::from("/tmp/patches/net.minecraftforge.json"),
            Some(patch),
            empty_index(),
        );

        assert!(component.is_custom());
        assert!(matches!(
            component.source(),
            ComponentSource::Local { file: Some(_), .. }
        ));
        assert!(!component.is_customizable().await);
        assert_eq!(component.version(), "14.23.5");
        assert_eq!(component.name(), "net.minecraftforge name");
        assert_eq!(component.order(), 7);
        assert_eq!(component.problem_severity(), ProblemSeverity::None);
        assert!(component.version_file().await.is_some());
    }

    #[tokio::test]
    async fn broken_local_component_degrades_to_an_error() {
        let component = Component::local(
            "net.minecraft",
            PathBuf::from("/tmp/patches/net.minecraft.json"),
            None,
            empty_index(),
        );

        assert!(component.is_custom());
        assert_eq!(component.problem_severity(), ProblemSeverity::Error);
        let problems = component.problems();
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].description, "Patch is not loaded yet.");

        let mut profile = LaunchProfile::default();
        component.apply_to(&mut profile).await;
        assert_eq!(profile.problem_severity(), ProblemSeverity::Error);
        assert!(profile.libraries().is_empty());
    }

    #[tokio::test]
    async fn order_override_beats_the_file_hint() {
        let mut component = Component::local(
            "a.b.c",
            PathBuf::from("/tmp/patches/a.b.c.json"),
            Some(local_patch("a.b.c", "1")),
            empty_index(),
        );
        component.set_order(-2);
        assert_eq!(component.order(), -2);
    }

    #[tokio::test]
    async fn unknown_uid_is_not_version_changeable() {
        let component = Component::local(
            "org.example.unknown",
            PathBuf::from("/tmp/patches/org.example.unknown.json"),
            Some(local_patch("org.example.unknown", "1")),
            empty_index(),
        );
        assert!(component.version_list().is_none());
        assert!(!component.is_version_changeable().await);
    }

    #[tokio::test]
    async fn name_falls_back_to_uid() {
        let component = Component::local(
            "org.example.bare",
            PathBuf::from("/tmp/patches/org.example.bare.json"),
            None,
            empty_index(),
        );
        assert_eq!(component.name(), "org.example.bare");
    }
}

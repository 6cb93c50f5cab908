//! The ordered component list: persistence, edit operations and the
//! debounced save discipline.
//!
//! The list owns its components outright and is the only writer of the
//! instance's `mmc-pack.json` and `patches/` directory. All operations run
//! on the caller's event loop; the engine spawns no tasks and holds no
//! locks. Saves are debounced: every mutation restarts a 5 second deadline,
//! and the host drives [`ComponentList::save_if_due`] from its idle loop.

mod migrate;
mod model;

pub use model::{Column, Decoration, ListEvent, MoveDirection, RowFlags};

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

use tokio::fs;
use tokio::time::Instant;
use uuid::Uuid;

use sl_core::json::{GradleSpecifier, Library, VersionPatch};
use sl_core::{err, file_utils, info, pt, IntoIoError, IntoJsonError, JsonFileError};
use sl_meta::MetaIndex;

use crate::{Component, LaunchProfile, ManifestComponent, PackError, PackManifest};

/// How long a scheduled save waits for further mutations before hitting disk.
pub const SAVE_DELAY: Duration = Duration::from_secs(5);

pub(crate) const UID_MINECRAFT: &str = "net.minecraft";
pub(crate) const UID_LWJGL: &str = "org.lwjgl";

/// The two components every instance always carries.
fn is_builtin(uid: &str) -> bool {
    uid == UID_MINECRAFT || uid == UID_LWJGL
}

pub struct ComponentList {
    root: PathBuf,
    index: Arc<MetaIndex>,
    components: Vec<Component>,
    by_uid: HashMap<String, usize>,
    profile: Option<Arc<LaunchProfile>>,
    dirty: bool,
    save_deadline: Option<Instant>,
    events: Option<Sender<ListEvent>>,
    /// Versions carried over from a pre-component instance config. Consumed
    /// once, by the migration.
    old_config_versions: HashMap<String, String>,
}

impl ComponentList {
    pub fn new(root: impl Into<PathBuf>, index: Arc<MetaIndex>) -> Self {
        Self {
            root: root.into(),
            index,
            components: Vec::new(),
            by_uid: HashMap::new(),
            profile: None,
            dirty: false,
            save_deadline: None,
            events: None,
            old_config_versions: HashMap::new(),
        }
    }

    /// Registers the observer that receives row-model notifications.
    pub fn set_event_sender(&mut self, sender: Sender<ListEvent>) {
        self.events = Some(sender);
    }

    /// Seeds a pinned version for the legacy migration. Empty versions are
    /// ignored.
    pub fn set_old_config_version(&mut self, uid: &str, version: &str) {
        if version.is_empty() {
            return;
        }
        self.old_config_versions
            .insert(uid.to_owned(), version.to_owned());
    }

    pub(crate) fn old_config_version(&self, uid: &str) -> Option<String> {
        self.old_config_versions.get(uid).cloned()
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn meta_index(&self) -> &Arc<MetaIndex> {
        &self.index
    }

    // paths

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join("mmc-pack.json")
    }

    pub(crate) fn patches_dir(&self) -> PathBuf {
        self.root.join("patches")
    }

    pub(crate) fn patch_path(&self, uid: &str) -> PathBuf {
        self.patches_dir().join(format!("{uid}.json"))
    }

    fn jarmods_dir(&self) -> PathBuf {
        self.root.join("jarmods")
    }

    fn local_libraries_dir(&self) -> PathBuf {
        self.root.join("libraries")
    }

    // load/save

    /// Reads the manifest, migrating a pre-component layout when there is
    /// none. On failure the list loads empty (and logs) rather than erroring
    /// out. Any unsaved edits are discarded.
    pub async fn load(&mut self) -> bool {
        let manifest_path = self.manifest_path();
        if !manifest_path.is_file() {
            if let Err(error) = migrate::convert_pre_component_layout(self).await {
                err!(
                    "Could not convert pre-component config at {:?}: {error}",
                    self.root
                );
                self.reset_to_empty();
                return false;
            }
        }
        let components = match self.read_manifest().await {
            Ok(components) => components,
            Err(error) => {
                err!("Could not read component manifest {manifest_path:?}: {error}");
                self.reset_to_empty();
                return false;
            }
        };
        self.components = components;
        self.reindex();
        self.dirty = false;
        self.save_deadline = None;
        self.emit(ListEvent::ModelReset);
        true
    }

    /// Load plus a profile rebuild, for use after external changes.
    pub async fn reload(&mut self) -> bool {
        let ok = self.load().await;
        self.reapply_patches().await;
        ok
    }

    fn reset_to_empty(&mut self) {
        self.components.clear();
        self.by_uid.clear();
        self.dirty = false;
        self.save_deadline = None;
        self.emit(ListEvent::ModelReset);
    }

    async fn read_manifest(&self) -> Result<Vec<Component>, PackError> {
        let path = self.manifest_path();
        let text = fs::read_to_string(&path).await.path(&path)?;
        let manifest = PackManifest::parse(&text)?;

        let mut components = Vec::with_capacity(manifest.components.len());
        let mut seen = HashSet::new();
        for entry in manifest.components {
            if entry.uid.is_empty() {
                err!("Skipping manifest entry with an empty uid in {path:?}");
                continue;
            }
            if !seen.insert(entry.uid.clone()) {
                err!("Skipping duplicate manifest entry {} in {path:?}", entry.uid);
                continue;
            }
            components.push(self.component_from_manifest(entry).await);
        }
        Ok(components)
    }

    /// Rebuilds one component from its manifest entry: local when its patch
    /// file exists, remote otherwise. A patch file that fails to parse
    /// degrades only this component.
    async fn component_from_manifest(&self, entry: ManifestComponent) -> Component {
        let patch_path = self.patch_path(&entry.uid);
        let mut component = if patch_path.is_file() {
            let file = match read_patch(&patch_path).await {
                Ok(file) => Some(Arc::new(file)),
                Err(error) => {
                    err!("Could not load patch {patch_path:?}: {error}");
                    None
                }
            };
            Component::local(&entry.uid, patch_path, file, Arc::clone(&self.index))
        } else {
            Component::remote(
                self.index.get(&entry.uid, &entry.current_version),
                Arc::clone(&self.index),
            )
        };
        if component.cached_name.is_empty() {
            component.cached_name = entry.cached_name;
        }
        if component.current_version.is_empty() {
            component.current_version = entry.current_version;
        }
        self.derive_flags(&mut component);
        component
    }

    /// Mutability is not persisted in the v1 manifest; it is derived from
    /// what is on disk: built-ins never move or leave, custom components can
    /// revert when the metadata index still knows their uid.
    fn derive_flags(&self, component: &mut Component) {
        let builtin = is_builtin(component.uid());
        component.set_movable(!builtin);
        component.set_removable(!builtin);
        component.set_revertible(component.is_custom() && self.index.has_uid(component.uid()));
        component.set_vanilla(!component.is_custom());
    }

    fn manifest(&self) -> PackManifest {
        manifest_for(&self.components)
    }

    /// Writes the manifest atomically and clears the dirty flag. Returns
    /// `false` (keeping the flag set) when the write fails.
    pub async fn save(&mut self) -> bool {
        let text = match self.manifest().to_json() {
            Ok(text) => text,
            Err(error) => {
                err!("Could not serialize component list: {error}");
                return false;
            }
        };
        let path = self.manifest_path();
        if let Err(error) = file_utils::write_atomic(&path, text.as_bytes()).await {
            err!("Could not save component list {path:?}: {error}");
            return false;
        }
        info!("Component list saved for {:?}", self.root);
        self.dirty = false;
        self.save_deadline = None;
        true
    }

    /// Marks the list dirty and (re)starts the save deadline. Called by
    /// every mutation; repeated calls within the window coalesce into one
    /// save.
    pub fn schedule_save(&mut self) {
        if !self.dirty {
            self.dirty = true;
            info!("Component list save scheduled for {:?}", self.root);
        }
        self.save_deadline = Some(Instant::now() + SAVE_DELAY);
    }

    pub fn save_is_scheduled(&self) -> bool {
        self.dirty
    }

    /// Debounce tick, driven from the host's event loop. Saves once the
    /// deadline has passed; returns whether a save happened.
    pub async fn save_if_due(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        match self.save_deadline {
            Some(deadline) if Instant::now() >= deadline => self.save().await,
            _ => false,
        }
    }

    // queries

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Component> {
        self.components.get(index)
    }

    pub fn get_uid(&self, uid: &str) -> Option<&Component> {
        self.by_uid.get(uid).and_then(|&index| self.components.get(index))
    }

    pub fn find(&self, uid: &str) -> Option<usize> {
        self.by_uid.get(uid).copied()
    }

    pub fn component_version(&self, uid: &str) -> Option<String> {
        self.get_uid(uid).map(|component| component.version().to_owned())
    }

    /// `true` when no component carries local customizations.
    pub fn is_vanilla(&self) -> bool {
        self.components.iter().all(|component| !component.is_custom())
    }

    /// The most recently merged profile, if any reapply has run yet.
    pub fn profile(&self) -> Option<Arc<LaunchProfile>> {
        self.profile.clone()
    }

    /// Changing the pinned version of a remote component is not supported;
    /// pinning happens through the migration or a manual patch file.
    pub fn set_component_version(&mut self, uid: &str, _version: &str) -> bool {
        err!("Changing the pinned version of {uid} is not supported");
        false
    }

    /// Picks an order hint larger than any existing one, starting at 101.
    pub fn get_free_order_number(&self) -> i32 {
        let mut largest = 100;
        for component in &self.components {
            largest = largest.max(component.order());
        }
        largest + 1
    }

    fn reindex(&mut self) {
        self.by_uid = self
            .components
            .iter()
            .enumerate()
            .map(|(index, component)| (component.uid().to_owned(), index))
            .collect();
    }

    // mutations

    /// Appends a component. Empty and duplicate uids are rejected with a
    /// warning and leave the list (and the save schedule) untouched.
    pub fn append_component(&mut self, component: Component) -> bool {
        let uid = component.uid().to_owned();
        if uid.is_empty() {
            err!("Attempt to add a component with an empty uid");
            return false;
        }
        if self.by_uid.contains_key(&uid) {
            err!("Attempt to add a component that is already present: {uid}");
            return false;
        }
        let row = self.components.len();
        self.components.push(component);
        self.by_uid.insert(uid, row);
        self.emit(ListEvent::RowsInserted {
            first: row,
            last: row,
        });
        self.schedule_save();
        true
    }

    /// Removes the component at `index`, deleting its patch file and any
    /// locally installed jar mod files it declared.
    pub async fn remove(&mut self, index: usize) -> bool {
        let Some(component) = self.components.get(index) else {
            err!("No component at row {index}");
            return false;
        };
        if !component.is_removable() {
            err!("Component {} is non-removable", component.uid());
            return false;
        }
        if let Err(error) = self.remove_files(index).await {
            err!(
                "Component {} could not be removed: {error}",
                self.components[index].uid()
            );
            self.reapply_patches().await;
            return false;
        }
        let component = self.components.remove(index);
        self.by_uid.remove(component.uid());
        self.reindex();
        self.emit(ListEvent::RowsRemoved {
            first: index,
            last: index,
        });
        self.reapply_patches().await;
        self.schedule_save();
        true
    }

    pub async fn remove_uid(&mut self, uid: &str) -> bool {
        match self.find(uid) {
            Some(index) => self.remove(index).await,
            None => false,
        }
    }

    async fn remove_files(&self, index: usize) -> Result<(), PackError> {
        let component = &self.components[index];
        // the patch file goes first so a crash cannot resurrect the component
        if let Some(path) = component.filename() {
            file_utils::remove_file_if_exists(path).await?;
        }
        if let Some(file) = component.version_file().await {
            let jarmods_dir = self.jarmods_dir();
            for jar_mod in &file.jar_mods {
                if jar_mod.is_local() {
                    file_utils::remove_file_if_exists(&jarmods_dir.join(jar_mod.file_name()))
                        .await?;
                }
            }
        }
        Ok(())
    }

    /// Materializes a remote component's version file as a local patch, so
    /// the user can edit it. The list reloads afterwards, flipping the
    /// component into its customized state.
    pub async fn customize(&mut self, index: usize) -> bool {
        let Some(component) = self.components.get(index) else {
            err!("No component at row {index}");
            return false;
        };
        let uid = component.uid().to_owned();
        if !component.is_customizable().await {
            err!("Component {uid} is not customizable");
            return false;
        }
        let Some(file) = component.version_file().await else {
            err!("Component {uid} has no loadable version file");
            return false;
        };
        // the reload below discards unsaved edits; flush them first
        if self.dirty {
            self.save().await;
        }
        if let Err(error) = self.write_patch(&file).await {
            err!("Component {uid} could not be customized: {error}");
            return false;
        }
        self.load().await;
        self.reapply_patches().await;
        self.schedule_save();
        true
    }

    /// Deletes the local patch file and falls back to the remote baseline.
    pub async fn revert_to_base(&mut self, index: usize) -> bool {
        let Some(component) = self.components.get(index) else {
            err!("No component at row {index}");
            return false;
        };
        let uid = component.uid().to_owned();
        if !component.is_revertible() {
            err!("Component {uid} is not revertible");
            return false;
        }
        let path = component.filename().map(Path::to_path_buf);
        // the reload below discards unsaved edits; flush them first
        if self.dirty {
            self.save().await;
        }
        if let Some(path) = path {
            if let Err(error) = file_utils::remove_file_if_exists(&path).await {
                err!("Component {uid} could not be reverted: {error}");
                self.reapply_patches().await;
                return false;
            }
        }
        self.load().await;
        self.reapply_patches().await;
        self.schedule_save();
        true
    }

    /// Swaps the component with its neighbour in the given direction. Both
    /// have to be movable; there is no wrap-around at the ends.
    pub async fn move_component(&mut self, index: usize, direction: MoveDirection) -> bool {
        let other = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => index.checked_add(1),
        };
        let Some(other) = other.filter(|&other| other < self.components.len()) else {
            return false;
        };
        let Some(component) = self.components.get(index) else {
            return false;
        };
        let neighbour = &self.components[other];
        if !component.is_moveable() || !neighbour.is_moveable() {
            err!(
                "Components {} and {} cannot swap places",
                component.uid(),
                neighbour.uid()
            );
            return false;
        }
        self.emit(ListEvent::RowsAboutToMove {
            from: index,
            to: other,
        });
        self.components.swap(index, other);
        self.reindex();
        self.emit(ListEvent::RowsMoved {
            from: index,
            to: other,
        });
        self.reapply_patches().await;
        self.schedule_save();
        true
    }

    /// Installs the given jars as jar-mod components, one component per
    /// file, in the given order.
    pub async fn install_jar_mods(&mut self, paths: &[PathBuf]) -> bool {
        match self.install_jar_mods_internal(paths).await {
            Ok(()) => {
                self.reapply_patches().await;
                self.schedule_save();
                true
            }
            Err(error) => {
                err!("Could not install jar mods: {error}");
                self.reapply_patches().await;
                false
            }
        }
    }

    async fn install_jar_mods_internal(&mut self, paths: &[PathBuf]) -> Result<(), PackError> {
        file_utils::ensure_dir(&self.patches_dir()).await?;
        file_utils::ensure_dir(&self.jarmods_dir()).await?;

        for path in paths {
            let id = Uuid::new_v4().to_string();
            let stem = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| id.clone());
            let target_filename = format!("{id}.jar");
            let target = self.jarmods_dir().join(&target_filename);
            if target.exists() {
                return Err(PackError::JarModExists { path: target });
            }
            fs::copy(path, &target).await.path(path)?;

            let mut jar_mod = Library::new(GradleSpecifier {
                group: "org.multimc.jarmods".to_owned(),
                artifact: id.clone(),
                version: "1".to_owned(),
                classifier: None,
                extension: "jar".to_owned(),
            });
            jar_mod.hint = Some("local".to_owned());
            jar_mod.filename = Some(target_filename);
            jar_mod.display_name = Some(stem.clone());

            let uid = format!("org.multimc.jarmod.{id}");
            let patch = VersionPatch {
                uid: uid.clone(),
                name: format!("{stem} (jar mod)"),
                order: Some(self.get_free_order_number()),
                jar_mods: vec![jar_mod],
                ..Default::default()
            };
            self.write_patch(&patch).await?;

            let mut component = Component::local(
                &uid,
                self.patch_path(&uid),
                Some(Arc::new(patch)),
                Arc::clone(&self.index),
            );
            component.set_movable(true);
            component.set_removable(true);
            self.append_component(component);
        }
        Ok(())
    }

    /// Installs a replacement main jar as the `customjar` component. An
    /// earlier custom jar file is overwritten.
    pub async fn install_custom_jar(&mut self, path: &Path) -> bool {
        match self.install_custom_jar_internal(path).await {
            Ok(()) => {
                self.reapply_patches().await;
                self.schedule_save();
                true
            }
            Err(error) => {
                err!("Could not install custom jar: {error}");
                self.reapply_patches().await;
                false
            }
        }
    }

    async fn install_custom_jar_internal(&mut self, path: &Path) -> Result<(), PackError> {
        file_utils::ensure_dir(&self.patches_dir()).await?;

        let specifier = GradleSpecifier {
            group: "org.multimc".to_owned(),
            artifact: "customjar".to_owned(),
            version: "1".to_owned(),
            classifier: None,
            extension: "jar".to_owned(),
        };
        let target = self.local_libraries_dir().join(specifier.artifact_path());
        if let Some(parent) = target.parent() {
            file_utils::ensure_dir(parent).await?;
        }
        file_utils::remove_file_if_exists(&target).await?;
        fs::copy(path, &target).await.path(path)?;

        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| specifier.artifact.clone());
        let uid = specifier.artifact.clone();

        let mut main_jar = Library::new(specifier);
        main_jar.hint = Some("local".to_owned());
        main_jar.display_name = Some(stem.clone());

        let patch = VersionPatch {
            uid: uid.clone(),
            name: format!("{stem} (custom jar)"),
            order: Some(self.get_free_order_number()),
            main_jar: Some(main_jar),
            ..Default::default()
        };
        self.write_patch(&patch).await?;

        let mut component = Component::local(
            &uid,
            self.patch_path(&uid),
            Some(Arc::new(patch)),
            Arc::clone(&self.index),
        );
        component.set_movable(true);
        component.set_removable(true);
        self.append_component(component);
        Ok(())
    }

    /// Strips every local customization: revertible components fall back to
    /// their remote baseline, removable ones leave. Stops on the first
    /// failure but always leaves a consistent merged state behind.
    pub async fn revert_to_vanilla(&mut self) -> bool {
        // reverts reload from disk; make sure the manifest is current so no
        // pending component vanishes mid-way
        if self.dirty {
            self.save().await;
        }
        let uids: Vec<String> = self
            .components
            .iter()
            .map(|component| component.uid().to_owned())
            .collect();

        for uid in uids {
            let Some(index) = self.find(&uid) else {
                continue;
            };
            let component = &self.components[index];
            if !component.is_custom() {
                continue;
            }
            let ok = if component.is_revertible() {
                self.revert_to_base(index).await
            } else if component.is_removable() {
                self.remove(index).await
            } else {
                continue;
            };
            if !ok {
                err!("Couldn't revert {uid}, stopping here");
                self.reapply_patches().await;
                self.schedule_save();
                return false;
            }
        }
        self.reapply_patches().await;
        self.schedule_save();
        true
    }

    /// Rebuilds the launch profile from scratch by applying every component
    /// in list order. Broken components degrade to problem severity stamps
    /// on the profile; the rebuild itself always succeeds.
    pub async fn reapply_patches(&mut self) {
        let mut profile = LaunchProfile::default();
        for component in &self.components {
            pt!("Applying {}", component.uid());
            component.apply_to(&mut profile).await;
        }
        self.profile = Some(Arc::new(profile));
    }

    async fn write_patch(&self, patch: &VersionPatch) -> Result<(), PackError> {
        file_utils::ensure_dir(&self.patches_dir()).await?;
        let text = serde_json::to_string_pretty(patch).json_to()?;
        file_utils::write_atomic(&self.patch_path(&patch.uid), text.as_bytes()).await?;
        Ok(())
    }
}

impl Drop for ComponentList {
    /// A list dropped with unsaved edits flushes synchronously; destructors
    /// cannot await.
    fn drop(&mut self) {
        if !self.dirty {
            return;
        }
        match self.manifest().to_json() {
            Ok(text) => {
                if let Err(error) =
                    file_utils::write_atomic_sync(&self.manifest_path(), text.as_bytes())
                {
                    err!("Could not flush component list on shutdown: {error}");
                }
            }
            Err(error) => err!("Could not flush component list on shutdown: {error}"),
        }
    }
}

pub(crate) fn manifest_for(components: &[Component]) -> PackManifest {
    PackManifest::new(
        components
            .iter()
            .map(|component| ManifestComponent {
                uid: component.uid().to_owned(),
                current_version: component.version().to_owned(),
                cached_name: component.cached_name.clone(),
            })
            .collect(),
    )
}

pub(crate) async fn read_patch(path: &Path) -> Result<VersionPatch, JsonFileError> {
    let text = fs::read_to_string(path).await.path(path)?;
    let patch: VersionPatch = serde_json::from_str(&text).json(text)?;
    Ok(patch)
}

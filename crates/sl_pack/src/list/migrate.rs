//! One-shot migration of pre-component instances.
//!
//! Runs when `mmc-pack.json` does not exist: upgrades the ancient
//! single-file `version.json`/`custom.json` layouts into a game patch,
//! seeds the built-in components, discovers loose patches, honours the old
//! `order.json`, and writes the first manifest. `load()` then reads that
//! manifest like any other.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tokio::fs;

use sl_core::json::{Requirement, VersionPatch};
use sl_core::{err, file_utils, pt, IntoIoError, IntoJsonError, IoError};

use crate::{Component, PackError};

use super::{manifest_for, read_patch, ComponentList, UID_LWJGL, UID_MINECRAFT};

const UID_FORGE: &str = "net.minecraftforge";
const UID_LITELOADER: &str = "com.mumfrey.liteloader";

/// The migration only decides identity and order: the manifest it writes
/// keeps uid, version and cached name, and `load()` reads it straight back,
/// deriving mutability from disk state like on any other load.
pub(crate) async fn convert_pre_component_layout(
    list: &mut ComponentList,
) -> Result<(), PackError> {
    upgrade_deprecated_files(list).await?;

    // built-ins always occupy the first two rows
    let mut components = Vec::new();
    components.push(builtin_component(list, UID_MINECRAFT).await?);
    components.push(builtin_component(list, UID_LWJGL).await?);

    let mut discovered = discover_patches(list).await?;
    seed_special(list, &mut discovered, UID_FORGE, 5);
    seed_special(list, &mut discovered, UID_LITELOADER, 10);

    // the old order.json decides first; leftovers sort by their order hint,
    // ties broken by uid (stable discovery order of the map)
    for uid in read_override_order(&list.root().join("order.json")).await {
        if uid == UID_MINECRAFT || uid == UID_LWJGL {
            continue;
        }
        if let Some(component) = discovered.remove(&uid) {
            components.push(component);
        }
    }
    if !discovered.is_empty() {
        let mut buckets: BTreeMap<i32, Vec<Component>> = BTreeMap::new();
        for (_, component) in discovered {
            buckets.entry(component.order()).or_default().push(component);
        }
        for (_, bucket) in buckets {
            components.extend(bucket);
        }
    }

    let text = manifest_for(&components).to_json()?;
    file_utils::write_atomic(&list.manifest_path(), text.as_bytes()).await?;
    Ok(())
}

/// Converts the deprecated `custom.json`/`version.json` single-file layouts
/// into `patches/net.minecraft.json`. The consumed and displaced files are
/// renamed to `.old` so nothing is destroyed.
async fn upgrade_deprecated_files(list: &ComponentList) -> Result<(), PackError> {
    let version_json = list.root().join("version.json");
    let custom_json = list.root().join("custom.json");
    let mc_patch = list.patch_path(UID_MINECRAFT);

    let (source, displaced) = if custom_json.is_file() {
        (custom_json, Some(version_json))
    } else if version_json.is_file() {
        (version_json, None)
    } else {
        return Ok(());
    };
    if mc_patch.is_file() {
        return Ok(());
    }

    file_utils::ensure_dir(&list.patches_dir()).await?;
    if let Some(displaced) = displaced {
        if displaced.is_file() {
            rename_to_old(&displaced).await?;
        }
    }

    let mut file = read_patch(&source).await?;
    strip_native_bindings(&mut file);
    file.uid = UID_MINECRAFT.to_owned();
    file.version = file.minecraft_version.take().unwrap_or_default();
    file.name = "Minecraft".to_owned();
    file.requires = vec![Requirement::new(UID_LWJGL)];

    let text = serde_json::to_string_pretty(&file).json_to()?;
    file_utils::write_atomic(&mc_patch, text.as_bytes()).await?;
    rename_to_old(&source).await?;
    Ok(())
}

async fn rename_to_old(path: &Path) -> Result<(), IoError> {
    let mut renamed = path.as_os_str().to_os_string();
    renamed.push(".old");
    fs::rename(path, &renamed).await.path(path)
}

/// The native bindings moved into their own component; drop them from the
/// migrated game patch.
fn strip_native_bindings(file: &mut VersionPatch) {
    file.libraries.retain(|library| {
        let group = &library.name.group;
        !(group.starts_with("org.lwjgl")
            || group == "net.java.jinput"
            || group == "net.java.jutils")
    });
}

/// A built-in keeps its patch file's version when one exists on disk and is
/// pinned to the old instance config's version otherwise. Only the version
/// and cached name matter here; see [`convert_pre_component_layout`].
async fn builtin_component(list: &ComponentList, uid: &str) -> Result<Component, PackError> {
    let patch_path = list.patch_path(uid);
    let pinned = list.old_config_version(uid).unwrap_or_default();

    if patch_path.is_file() {
        let mut file = read_patch(&patch_path).await?;
        if file.version.is_empty() {
            file.version = pinned;
        }
        Ok(Component::local(
            uid,
            patch_path,
            Some(Arc::new(file)),
            Arc::clone(list.meta_index()),
        ))
    } else {
        Ok(Component::remote(
            list.meta_index().get(uid, &pinned),
            Arc::clone(list.meta_index()),
        ))
    }
}

/// Collects every non-builtin patch file, keyed (and therefore ordered) by
/// uid. Unreadable files are skipped with a warning; they only lose their
/// place in the migration, not their bytes.
async fn discover_patches(list: &ComponentList) -> Result<BTreeMap<String, Component>, PackError> {
    let mut discovered = BTreeMap::new();
    let patches_dir = list.patches_dir();
    if !patches_dir.is_dir() {
        return Ok(discovered);
    }

    let mut entries = fs::read_dir(&patches_dir).await.path(&patches_dir)?;
    while let Some(entry) = entries.next_entry().await.path(&patches_dir)? {
        let path = entry.path();
        if path.extension().and_then(OsStr::to_str) != Some("json") {
            continue;
        }
        pt!("Reading {:?}", entry.file_name());
        let file = match read_patch(&path).await {
            Ok(file) => file,
            Err(error) => {
                err!("Skipping unreadable patch {path:?}: {error}");
                continue;
            }
        };
        if file.uid == UID_MINECRAFT || file.uid == UID_LWJGL {
            continue;
        }
        if file.uid.is_empty() {
            err!("Skipping patch without a uid: {path:?}");
            continue;
        }

        let uid = file.uid.clone();
        let component = Component::local(
            &uid,
            path,
            Some(Arc::new(file)),
            Arc::clone(list.meta_index()),
        );
        discovered.insert(uid, component);
    }
    Ok(discovered)
}

/// Forge and LiteLoader lived in the old instance config rather than in
/// patch files; seed them from the metadata index when a version is pinned
/// and no local file overrides them. The order override slots them into the
/// conversion's leftover sort, where file-based patches use their own hints.
fn seed_special(
    list: &ComponentList,
    discovered: &mut BTreeMap<String, Component>,
    uid: &str,
    order: i32,
) {
    let Some(version) = list.old_config_version(uid) else {
        return;
    };
    if version.is_empty() || discovered.contains_key(uid) {
        return;
    }
    let mut component = Component::remote(
        list.meta_index().get(uid, &version),
        Arc::clone(list.meta_index()),
    );
    component.set_order(order);
    discovered.insert(uid.to_owned(), component);
}

#[derive(Deserialize)]
struct OverrideOrder {
    #[serde(default)]
    order: Vec<String>,
}

/// The old user-sorted patch order. Missing or malformed files mean "no
/// explicit order".
async fn read_override_order(path: &Path) -> Vec<String> {
    let Ok(text) = fs::read_to_string(path).await else {
        return Vec::new();
    };
    match serde_json::from_str::<OverrideOrder>(&text) {
        Ok(parsed) => parsed.order,
        Err(error) => {
            err!("Ignoring malformed {path:?}: {error}");
            Vec::new()
        }
    }
}

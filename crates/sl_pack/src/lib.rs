//! The component list engine.
//!
//! An instance is described by an ordered list of [`Component`]s (the base
//! game, the native bindings layer, mod loaders, jar mods, a custom main
//! jar). Each component contributes libraries, jar mods, arguments and
//! diagnostics; [`ComponentList::reapply_patches`] merges them in list order
//! into one [`LaunchProfile`] that the rest of the launcher consumes.
//!
//! The list persists itself to `mmc-pack.json` inside the instance root,
//! with per-component patch files under `patches/`. Instances from before
//! the component format are migrated on first load.

mod component;
mod error;
pub mod list;
mod manifest;
mod profile;

pub use component::{Component, ComponentSource};
pub use error::PackError;
pub use list::{
    Column, ComponentList, Decoration, ListEvent, MoveDirection, RowFlags,
};
pub use manifest::{ManifestComponent, PackManifest, CURRENT_FORMAT_VERSION};
pub use profile::LaunchProfile;

//! The metadata index gateway.
//!
//! Resolves component uids (and optionally pinned versions) against a local
//! metadata cache directory:
//!
//! ```text
//! <meta_dir>/<uid>/index.json       version list for one component
//! <meta_dir>/<uid>/<version>.json   one version file (patch format)
//! ```
//!
//! Populating the cache from the network is a separate concern; as far as
//! this crate cares, "loading" a list or a version means reading it from the
//! cache exactly once. Handles hand out their data through a fill-once cell,
//! so shared handles stay cheap to clone and lock-free after the first load.

mod error;
mod index;
mod list;
mod version;

pub use error::MetaError;
pub use index::MetaIndex;
pub use list::{VersionEntry, VersionList};
pub use version::VersionHandle;

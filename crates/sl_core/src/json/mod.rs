//! The patch data model: version files, libraries and artifact specifiers.
//!
//! These types describe the on-disk JSON the engine reads and writes
//! (`patches/<uid>.json` inside an instance, and the local metadata cache).

mod gradle;
mod patch;

pub use gradle::{GradleSpecifier, GradleSpecifierError};
pub use patch::{
    AssetIndex, Library, PatchProblem, ProblemSeverity, Requirement, VersionPatch,
};

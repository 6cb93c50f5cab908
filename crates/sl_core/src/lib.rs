//! Shared foundation for the Stratum Launcher workspace.
//!
//! This crate contains the pieces every other crate leans on:
//! - the error taxonomy ([`IoError`], [`JsonError`], [`JsonFileError`]) and
//!   the context-attaching [`IntoIoError`]/[`IntoJsonError`] traits,
//! - the `info!`/`err!`/`pt!` logging macros,
//! - atomic filesystem helpers ([`file_utils`]),
//! - the patch data model ([`json`]): version files, libraries and
//!   gradle-style artifact specifiers.

mod error;
pub mod file_utils;
pub mod json;
pub mod print;

pub use error::{IntoIoError, IntoJsonError, IoError, JsonError, JsonFileError};

use thiserror::Error;

use sl_core::{IoError, JsonError};

#[derive(Debug, Error)]
pub enum MetaError {
    #[error("metadata index has no version {version} of {uid}")]
    MissingVersion { uid: String, version: String },
    #[error(transparent)]
    Io(#[from] IoError),
    #[error(transparent)]
    Json(#[from] JsonError),
}

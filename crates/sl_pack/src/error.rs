use std::path::PathBuf;

use thiserror::Error;

use sl_core::{IoError, JsonError, JsonFileError};

#[derive(Debug, Error)]
pub enum PackError {
    #[error("invalid component file version {found}, expected {expected}")]
    FormatVersion { expected: i32, found: i32 },
    #[error("jar mod target already exists: {path:?}")]
    JarModExists { path: PathBuf },
    #[error(transparent)]
    Io(#[from] IoError),
    #[error(transparent)]
    Json(#[from] JsonError),
}

impl From<JsonFileError> for PackError {
    fn from(error: JsonFileError) -> Self {
        match error {
            JsonFileError::Io(error) => Self::Io(error),
            JsonFileError::Json(error) => Self::Json(error),
        }
    }
}

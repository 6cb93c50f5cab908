use std::path::PathBuf;

use thiserror::Error;

/// An IO error that remembers which path it happened at.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("io error: {error}\npath: {path:?}")]
    Io { error: String, path: PathBuf },
}

/// Attaches the affected path to a `std::io` result.
pub trait IntoIoError<T> {
    fn path(self, path: impl Into<PathBuf>) -> Result<T, IoError>;
}

impl<T> IntoIoError<T> for Result<T, std::io::Error> {
    fn path(self, path: impl Into<PathBuf>) -> Result<T, IoError> {
        self.map_err(|error| IoError::Io {
            error: error.to_string(),
            path: path.into(),
        })
    }
}

#[derive(Debug, Error)]
pub enum JsonError {
    #[error("could not parse json: {error}")]
    From {
        error: String,
        /// The document that failed to parse, kept for debugging.
        text: String,
    },
    #[error("could not serialize json: {error}")]
    To { error: String },
}

/// Attaches the offending document to a `serde_json` result.
pub trait IntoJsonError<T> {
    fn json(self, text: String) -> Result<T, JsonError>;
    fn json_to(self) -> Result<T, JsonError>;
}

impl<T> IntoJsonError<T> for Result<T, serde_json::Error> {
    fn json(self, text: String) -> Result<T, JsonError> {
        self.map_err(|error| JsonError::From {
            error: error.to_string(),
            text,
        })
    }

    fn json_to(self) -> Result<T, JsonError> {
        self.map_err(|error| JsonError::To {
            error: error.to_string(),
        })
    }
}

/// Either side of a "read a file, then parse it" operation.
#[derive(Debug, Error)]
pub enum JsonFileError {
    #[error(transparent)]
    Io(#[from] IoError),
    #[error(transparent)]
    Json(#[from] JsonError),
}

//! Error types for docsync-docx

use std::path::PathBuf;

/// Result type for docsync-docx operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or writing document packages
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid package at {path}: {message}")]
    Package { path: PathBuf, message: String },

    #[error("Malformed XML in part {part}: {message}")]
    Xml { part: String, message: String },

    #[error("{path} is missing required part {part}")]
    MissingPart { path: PathBuf, part: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn package(path: impl Into<PathBuf>, error: zip::result::ZipError) -> Self {
        Self::Package {
            path: path.into(),
            message: error.to_string(),
        }
    }

    pub(crate) fn xml(part: impl Into<String>, error: roxmltree::Error) -> Self {
        Self::Xml {
            part: part.into(),
            message: error.to_string(),
        }
    }
}

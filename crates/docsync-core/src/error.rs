//! Error types for docsync-core

use std::path::PathBuf;

/// Result type for docsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in docsync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error from the document model
    #[error(transparent)]
    Docx(#[from] docsync_docx::Error),

    /// Standard I/O error with the path it occurred at
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A pass found nothing to synchronize
    #[error("no candidate documents found under {root}")]
    NoDocuments { root: PathBuf },

    /// Error from the filesystem watch backend
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

//! Candidate document discovery

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// File extension identifying candidate documents.
pub const DOCUMENT_EXTENSION: &str = "docx";

/// Editor lock/temp artifacts start with this marker and are never synced.
pub const TEMP_LOCK_PREFIX: &str = "~$";

/// Whether `path` names a candidate document: the document extension, and
/// not a temp-lock artifact.
pub fn is_candidate_document(path: &Path) -> bool {
    let has_extension = path
        .extension()
        .map(|ext| ext == DOCUMENT_EXTENSION)
        .unwrap_or(false);
    let is_temp_lock = path
        .file_name()
        .map(|name| name.to_string_lossy().starts_with(TEMP_LOCK_PREFIX))
        .unwrap_or(true);
    has_extension && !is_temp_lock
}

/// All candidate documents under `root`, recursively, in sorted order.
pub fn discover_documents(root: &Path) -> Vec<PathBuf> {
    let mut documents: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_candidate_document(entry.path()))
        .map(|entry| entry.path().to_path_buf())
        .collect();
    documents.sort();
    documents
}

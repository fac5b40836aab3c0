//! Synchronization engine for docsync
//!
//! Keeps a tree of near-duplicate word-processor documents consistent with
//! the most recently edited one, swapping each target's own email identity
//! back in, then renders every document to a fixed-name PDF.

pub mod convert;
pub mod discover;
pub mod email;
mod error;
pub mod rewrite;
pub mod sync;
pub mod watch;

pub use convert::{CONVERT_TIMEOUT, CONVERTER_COMMANDS, ConvertOutcome, PdfConverter};
pub use discover::{
    DOCUMENT_EXTENSION, TEMP_LOCK_PREFIX, discover_documents, is_candidate_document,
};
pub use email::{EmailToken, find_email};
pub use error::{Error, Result};
pub use rewrite::replace_token;
pub use sync::{PDF_OUTPUT_NAME, PassReport, Synchronizer, select_source};
pub use watch::{ChangeWatcher, DEBOUNCE_INTERVAL, DebounceGate};

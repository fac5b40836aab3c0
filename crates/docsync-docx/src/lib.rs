//! WordprocessingML document model for docsync
//!
//! Opens `.docx` packages, exposes paragraph and run structure across every
//! paragraph-bearing surface (body, tables, headers, footers), applies
//! run-level text rewrites, and persists with a temp-then-rename replace.

mod document;
mod error;
mod package;
mod part;

pub use document::Document;
pub use error::{Error, Result};
pub use part::{ParagraphSpan, RunSpan, Surface};

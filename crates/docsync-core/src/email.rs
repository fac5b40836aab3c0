//! Email token discovery
//!
//! The email address is a document's identity field. Matching always runs
//! against full paragraph text — never individual runs — so tokens split
//! across styling boundaries are still found.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use docsync_docx::Document;

use crate::Result;

/// Permissive email grammar: ASCII local part and domain, TLD of two or
/// more letters.
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
        .expect("email pattern is valid")
});

/// An email-address-shaped substring used as a document's identity field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EmailToken(String);

impl EmailToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First email token inside `text`, if any.
    pub fn first_in(text: &str) -> Option<Self> {
        EMAIL_PATTERN
            .find(text)
            .map(|m| Self(m.as_str().to_string()))
    }
}

impl fmt::Display for EmailToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<str> for EmailToken {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for EmailToken {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Find the document's identity token: the first email match across all
/// surfaces in the fixed scan order (body, tables, headers, footers).
/// Read-only.
pub fn find_email(document: &Document) -> Result<Option<EmailToken>> {
    for text in document.paragraph_texts()? {
        if let Some(token) = EmailToken::first_in(&text) {
            return Ok(Some(token));
        }
    }
    Ok(None)
}

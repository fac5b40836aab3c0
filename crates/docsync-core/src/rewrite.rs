//! Run-span rewriter
//!
//! Replaces a token inside paragraph text that may be fragmented across
//! independently styled runs. The offset-to-owning-run index is rebuilt by
//! one linear scan per matching paragraph; the reconstructed text lands in
//! the paragraph's first run and every other run is cleared. Styling across
//! the edited span is deliberately not preserved — text correctness wins
//! over per-run formatting for a single identity field.

use std::collections::BTreeSet;

use tracing::debug;

use docsync_docx::{Document, ParagraphSpan};

use crate::Result;

/// Replace the first occurrence of `old` in every paragraph containing it,
/// across all surfaces. Returns whether any paragraph was modified.
pub fn replace_token(document: &mut Document, old: &str, new: &str) -> Result<bool> {
    if old.is_empty() {
        return Ok(false);
    }
    let changed = document.edit_paragraphs(|paragraph| rewrite_paragraph(paragraph, old, new))?;
    Ok(changed)
}

fn rewrite_paragraph(paragraph: &ParagraphSpan, old: &str, new: &str) -> Option<String> {
    let text = paragraph.text();
    let start = text.find(old)?;
    let end = start + old.len();

    // Offset-to-owning-run index over the concatenated text.
    let mut owners = Vec::with_capacity(text.len());
    for (index, run) in paragraph.runs.iter().enumerate() {
        owners.extend(std::iter::repeat(index).take(run.text.len()));
    }

    let affected: BTreeSet<usize> = owners
        .get(start..end.min(owners.len()))
        .into_iter()
        .flatten()
        .copied()
        .collect();
    if affected.is_empty() {
        return None;
    }

    debug!(
        surface = %paragraph.surface,
        runs = paragraph.runs.len(),
        affected = affected.len(),
        "rewriting token span"
    );

    let mut rewritten = String::with_capacity(text.len() - old.len() + new.len());
    rewritten.push_str(&text[..start]);
    rewritten.push_str(new);
    rewritten.push_str(&text[end..]);
    Some(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsync_docx::Document;
    use docsync_test_utils::DocxFixture;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn open_fixture(dir: &TempDir, name: &str, fixture: DocxFixture) -> Document {
        let path = dir.path().join(name);
        fixture.write_to(&path).unwrap();
        Document::open(&path).unwrap()
    }

    #[test]
    fn replaces_token_spanning_run_boundaries() {
        let dir = TempDir::new().unwrap();
        let mut doc = open_fixture(
            &dir,
            "split.docx",
            DocxFixture::new().body_paragraph(&["nik", "et@", "cs.cmu.edu"]),
        );

        let replaced = replace_token(&mut doc, "niket@cs.cmu.edu", "a@b.co").unwrap();
        assert!(replaced);
        assert_eq!(doc.paragraph_texts().unwrap(), vec!["a@b.co"]);
    }

    #[test]
    fn replaces_first_occurrence_and_keeps_surrounding_text() {
        let dir = TempDir::new().unwrap();
        let mut doc = open_fixture(
            &dir,
            "inline.docx",
            DocxFixture::new().body_paragraph(&["email: ", "old@x.com", " or old@x.com"]),
        );

        replace_token(&mut doc, "old@x.com", "new@y.org").unwrap();
        assert_eq!(
            doc.paragraph_texts().unwrap(),
            vec!["email: new@y.org or old@x.com"]
        );
    }

    #[test]
    fn rewrites_every_paragraph_containing_the_token() {
        let dir = TempDir::new().unwrap();
        let mut doc = open_fixture(
            &dir,
            "multi.docx",
            DocxFixture::new()
                .body_paragraph(&["contact old@x.com"])
                .table_cell(&["cell old@x.com"])
                .header_paragraph(&["head old@x.com"])
                .footer_paragraph(&["foot old@x.com"]),
        );

        let replaced = replace_token(&mut doc, "old@x.com", "new@y.org").unwrap();
        assert!(replaced);
        assert_eq!(
            doc.paragraph_texts().unwrap(),
            vec![
                "contact new@y.org",
                "cell new@y.org",
                "head new@y.org",
                "foot new@y.org",
            ]
        );
    }

    #[test]
    fn reports_no_change_when_token_is_absent() {
        let dir = TempDir::new().unwrap();
        let mut doc = open_fixture(
            &dir,
            "absent.docx",
            DocxFixture::new().body_paragraph(&["nothing to see"]),
        );

        let replaced = replace_token(&mut doc, "old@x.com", "new@y.org").unwrap();
        assert!(!replaced);
        assert_eq!(doc.paragraph_texts().unwrap(), vec!["nothing to see"]);
    }

    #[test]
    fn replacing_a_token_with_itself_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut doc = open_fixture(
            &dir,
            "idem.docx",
            DocxFixture::new().body_paragraph(&["reach ", "me@", "here.io", " now"]),
        );

        replace_token(&mut doc, "me@here.io", "you@there.io").unwrap();
        let after_first = doc.paragraph_texts().unwrap();

        replace_token(&mut doc, "you@there.io", "you@there.io").unwrap();
        assert_eq!(doc.paragraph_texts().unwrap(), after_first);
        assert_eq!(after_first, vec!["reach you@there.io now"]);
    }

    #[test]
    fn survives_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let mut doc = open_fixture(
            &dir,
            "roundtrip.docx",
            DocxFixture::new().body_paragraph(&["id ", "left@", "host.net"]),
        );

        replace_token(&mut doc, "left@host.net", "right@host.net").unwrap();
        let saved = dir.path().join("saved.docx");
        doc.save(&saved).unwrap();

        let reloaded = Document::open(&saved).unwrap();
        assert_eq!(
            reloaded.paragraph_texts().unwrap(),
            vec!["id right@host.net"]
        );
    }
}

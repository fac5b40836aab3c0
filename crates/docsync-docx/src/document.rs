//! Document handle over an OPC package
//!
//! A [`Document`] loads the paragraph-bearing parts once at open time and
//! keeps them as raw part text. Reads parse on demand; rewrites splice the
//! part text and mark it dirty, and [`Document::save`] streams the package
//! with the dirty parts substituted.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::part::{self, ParagraphSpan, Surface};
use crate::{Error, Result, package};

/// An open word-processor document.
#[derive(Debug)]
pub struct Document {
    path: PathBuf,
    parts: Vec<Part>,
}

#[derive(Debug)]
struct Part {
    name: String,
    xml: String,
    dirty: bool,
}

impl Part {
    fn surface(&self) -> Surface {
        if package::is_header_part(&self.name) {
            Surface::Header
        } else if package::is_footer_part(&self.name) {
            Surface::Footer
        } else {
            Surface::Body
        }
    }

    fn paragraphs(&self) -> Result<Vec<ParagraphSpan>> {
        part::parse_paragraphs(&self.xml, self.surface())
            .map_err(|e| Error::xml(self.name.clone(), e))
    }
}

impl Document {
    /// Open a document package from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let parts = package::read_parts(path)?
            .into_iter()
            .map(|(name, xml)| Part {
                name,
                xml,
                dirty: false,
            })
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            parts,
        })
    }

    /// The path the document was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Paragraph texts in the fixed scan order: body paragraphs, then table
    /// paragraphs, then header paragraphs, then footer paragraphs.
    pub fn paragraph_texts(&self) -> Result<Vec<String>> {
        let mut body = Vec::new();
        let mut tables = Vec::new();
        let mut sections = Vec::new();

        for spans in self.parts.iter().map(Part::paragraphs) {
            for span in spans? {
                let text = span.text();
                match span.surface {
                    Surface::Body => body.push(text),
                    Surface::Table => tables.push(text),
                    Surface::Header | Surface::Footer => sections.push(text),
                }
            }
        }

        body.extend(tables);
        body.extend(sections);
        Ok(body)
    }

    /// Visit every paragraph across all surfaces; a visitor returning
    /// `Some(new_text)` rewrites that paragraph's full text into its first
    /// run and clears the rest. Returns whether anything changed.
    pub fn edit_paragraphs<F>(&mut self, mut visit: F) -> Result<bool>
    where
        F: FnMut(&ParagraphSpan) -> Option<String>,
    {
        let mut changed_any = false;

        for part in &mut self.parts {
            let spans =
                part::parse_paragraphs(&part.xml, part.surface())
                    .map_err(|e| Error::xml(part.name.clone(), e))?;

            let mut edits = Vec::new();
            for span in &spans {
                if let Some(new_text) = visit(span) {
                    edits.extend(part::paragraph_text_edits(&part.xml, span, &new_text));
                }
            }

            if edits.is_empty() {
                continue;
            }

            // Back-to-front so earlier byte ranges stay valid.
            edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));
            for (range, replacement) in edits {
                part.xml.replace_range(range, &replacement);
            }
            part.dirty = true;
            changed_any = true;
        }

        Ok(changed_any)
    }

    /// Persist the document to `dest`, rewriting the package it was opened
    /// from with any modified parts substituted.
    pub fn save(&self, dest: impl AsRef<Path>) -> Result<()> {
        let dest = dest.as_ref();
        let replacements: BTreeMap<String, String> = self
            .parts
            .iter()
            .filter(|p| p.dirty)
            .map(|p| (p.name.clone(), p.xml.clone()))
            .collect();

        tracing::debug!(
            dest = %dest.display(),
            replaced_parts = replacements.len(),
            "saving document"
        );
        package::write_package(&self.path, dest, &replacements)
    }
}

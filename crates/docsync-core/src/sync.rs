//! Document synchronizer
//!
//! One pass: discover candidate documents, select the most recently
//! modified as the authoritative source, rebuild every other candidate from
//! a scratch copy of the source with the target's own email identity
//! substituted back in, verify, then convert everything to PDF. The source
//! file is never opened for writing.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use docsync_docx::Document;

use crate::convert::{ConvertOutcome, PdfConverter};
use crate::discover::discover_documents;
use crate::email::{EmailToken, find_email};
use crate::rewrite::replace_token;
use crate::{Error, Result};

/// Default canonical name for rendered PDFs.
pub const PDF_OUTPUT_NAME: &str = "Resume.pdf";

/// Report from one synchronization pass
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    /// Root the pass ran over
    pub root: PathBuf,
    /// Source document selected for this pass
    pub source: PathBuf,
    /// Every candidate document discovered, sorted
    pub candidates: Vec<PathBuf>,
    /// Actions taken during the pass
    pub actions: Vec<String>,
    /// Non-fatal warnings
    pub warnings: Vec<String>,
    /// Per-item errors that did not abort the pass
    pub errors: Vec<String>,
}

impl PassReport {
    /// A pass succeeded when no per-item error was recorded.
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Engine for synchronization passes over one root directory
pub struct Synchronizer {
    root: PathBuf,
    pdf_name: String,
    converter: PdfConverter,
}

impl Synchronizer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pdf_name: PDF_OUTPUT_NAME.to_string(),
            converter: PdfConverter::new(),
        }
    }

    /// Override the canonical PDF output name.
    pub fn with_pdf_name(mut self, name: impl Into<String>) -> Self {
        self.pdf_name = name.into();
        self
    }

    /// Override the converter adapter.
    pub fn with_converter(mut self, converter: PdfConverter) -> Self {
        self.converter = converter;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run one full pass: discover, select source, rewrite all targets,
    /// convert all documents.
    ///
    /// # Errors
    ///
    /// Fatal to the pass: no candidates under the root, or an unreadable
    /// source document. Everything else lands in the report.
    pub fn run_pass(&self) -> Result<PassReport> {
        let candidates = discover_documents(&self.root);
        if candidates.is_empty() {
            return Err(Error::NoDocuments {
                root: self.root.clone(),
            });
        }

        let source = select_source(&candidates)
            .cloned()
            .ok_or_else(|| Error::NoDocuments {
                root: self.root.clone(),
            })?;
        info!(
            source = %source.display(),
            candidates = candidates.len(),
            "starting sync pass"
        );

        let mut report = PassReport {
            root: self.root.clone(),
            source: source.clone(),
            candidates: candidates.clone(),
            actions: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
        };

        // The source is only ever read.
        let source_email = find_email(&Document::open(&source)?)?;
        match &source_email {
            Some(email) => info!(%email, "source identity"),
            None => {
                warn!("no email found in source document");
                report
                    .warnings
                    .push("no email found in source document".to_string());
            }
        }

        for target in candidates.iter().filter(|candidate| **candidate != source) {
            if let Err(e) = self.sync_target(&source, source_email.as_ref(), target, &mut report) {
                error!(target = %target.display(), error = %e, "failed to update target");
                report
                    .errors
                    .push(format!("{}: {}", target.display(), e));
            }
        }

        for document in &candidates {
            match self.converter.convert_to_pdf(document, &self.pdf_name) {
                Ok(ConvertOutcome::Converted) => report.actions.push(format!(
                    "Converted {} to {}",
                    document.display(),
                    self.pdf_name
                )),
                Ok(outcome) => report
                    .errors
                    .push(format!("{}: {}", document.display(), outcome)),
                Err(e) => report
                    .errors
                    .push(format!("{}: {}", document.display(), e)),
            }
        }

        info!(
            actions = report.actions.len(),
            warnings = report.warnings.len(),
            errors = report.errors.len(),
            "sync pass finished"
        );
        Ok(report)
    }

    /// Rebuild one target from a scratch copy of the source.
    fn sync_target(
        &self,
        source: &Path,
        source_email: Option<&EmailToken>,
        target: &Path,
        report: &mut PassReport,
    ) -> Result<()> {
        let target_email = find_email(&Document::open(target)?)?;
        match &target_email {
            Some(email) => debug!(target = %target.display(), %email, "target identity"),
            None => {
                warn!(target = %target.display(), "no email found in target");
                report
                    .warnings
                    .push(format!("no email found in {}", target.display()));
            }
        }

        // Work on a scratch duplicate; the source itself stays untouched.
        let scratch = scratch_path(target);
        fs::copy(source, &scratch).map_err(|e| Error::io(&scratch, e))?;
        let result = self.rewrite_into(&scratch, target, source_email, target_email.as_ref(), report);
        let _ = fs::remove_file(&scratch);
        result?;

        // Best-effort verification; a mismatch is a warning, not a failure.
        let found = find_email(&Document::open(target)?)?;
        if found.as_ref() == target_email.as_ref() {
            info!(target = %target.display(), email = %identity_label(found.as_ref()), "target updated and verified");
            report.actions.push(format!("Updated {}", target.display()));
        } else {
            warn!(
                target = %target.display(),
                expected = %identity_label(target_email.as_ref()),
                found = %identity_label(found.as_ref()),
                "verification mismatch"
            );
            report.actions.push(format!("Updated {}", target.display()));
            report.warnings.push(format!(
                "{}: expected email {} after sync, found {}",
                target.display(),
                identity_label(target_email.as_ref()),
                identity_label(found.as_ref())
            ));
        }
        Ok(())
    }

    fn rewrite_into(
        &self,
        scratch: &Path,
        target: &Path,
        source_email: Option<&EmailToken>,
        target_email: Option<&EmailToken>,
        report: &mut PassReport,
    ) -> Result<()> {
        let mut working = Document::open(scratch)?;
        if let (Some(source_email), Some(target_email)) = (source_email, target_email) {
            let replaced =
                replace_token(&mut working, source_email.as_str(), target_email.as_str())?;
            if replaced {
                debug!(target = %target.display(), from = %source_email, to = %target_email, "email replaced");
            } else {
                warn!(
                    target = %target.display(),
                    "could not replace email; it may be formatted in an unexpected way"
                );
                report.warnings.push(format!(
                    "{}: email {} not replaced",
                    target.display(),
                    source_email
                ));
            }
        }
        working.save(target)?;
        Ok(())
    }
}

fn identity_label(email: Option<&EmailToken>) -> String {
    email
        .map(|e| e.to_string())
        .unwrap_or_else(|| "none".to_string())
}

/// Scratch sibling used as the working copy for one target.
fn scratch_path(target: &Path) -> PathBuf {
    target.with_extension("docx.tmp")
}

/// Candidate with the most recent modification time. Ties break to the
/// lexicographically largest path, deterministic within a pass.
pub fn select_source(candidates: &[PathBuf]) -> Option<&PathBuf> {
    candidates
        .iter()
        .max_by_key(|path| (modified_time(path), path.to_path_buf()))
}

fn modified_time(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or(UNIX_EPOCH)
}

//! PDF conversion through a headless office-suite binary
//!
//! Probes a fixed ordered list of LibreOffice install locations, converts
//! into the document's own directory, and renames the converter's native
//! artifact to the caller's canonical name. Every failure mode is a
//! structured outcome, non-fatal to the pass that requested it.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::{Error, Result};

/// Conversion timeout per document.
pub const CONVERT_TIMEOUT: Duration = Duration::from_secs(30);

/// Ordered probe list of converter invocation targets.
pub const CONVERTER_COMMANDS: [&str; 5] = [
    "soffice",
    "libreoffice",
    "/Applications/LibreOffice.app/Contents/MacOS/soffice",
    "/usr/bin/soffice",
    "/usr/bin/libreoffice",
];

/// Structured result of one conversion attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertOutcome {
    /// The canonical PDF is in place
    Converted,
    /// No binary in the probe list exists
    BinaryNotFound,
    /// A binary ran and exited non-zero
    ConverterFailed { stderr: String },
    /// The conversion exceeded the timeout
    TimedOut,
    /// The converter reported success but its artifact never appeared
    MissingArtifact { expected: PathBuf },
}

impl ConvertOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Converted)
    }
}

impl fmt::Display for ConvertOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Converted => write!(f, "converted"),
            Self::BinaryNotFound => write!(
                f,
                "converter not found; install LibreOffice (macOS: brew install --cask libreoffice, Linux: apt-get install libreoffice)"
            ),
            Self::ConverterFailed { stderr } => {
                write!(f, "converter exited with an error: {}", stderr.trim())
            }
            Self::TimedOut => write!(f, "conversion timed out"),
            Self::MissingArtifact { expected } => write!(
                f,
                "converter reported success but {} was not created",
                expected.display()
            ),
        }
    }
}

/// Adapter around the external document converter.
#[derive(Debug, Clone)]
pub struct PdfConverter {
    commands: Vec<String>,
    timeout: Duration,
}

impl Default for PdfConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfConverter {
    pub fn new() -> Self {
        Self::with_commands(CONVERTER_COMMANDS.iter().map(|c| c.to_string()).collect())
    }

    /// Use a custom probe list instead of the built-in one.
    pub fn with_commands(commands: Vec<String>) -> Self {
        Self {
            commands,
            timeout: CONVERT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Convert `document` to a PDF named `output_name` in its own directory.
    ///
    /// The probe list is tried in order; the first binary that exists
    /// decides the outcome. Binaries that are absent are skipped silently.
    pub fn convert_to_pdf(&self, document: &Path, output_name: &str) -> Result<ConvertOutcome> {
        let output_dir = document.parent().unwrap_or_else(|| Path::new("."));

        for command in &self.commands {
            let output = match self.run_converter(command, document, output_dir) {
                Ok(Some(output)) => output,
                Ok(None) => {
                    warn!(document = %document.display(), %command, "conversion timed out");
                    return Ok(ConvertOutcome::TimedOut);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(%command, "converter binary not present, trying next");
                    continue;
                }
                Err(e) => return Err(Error::io(document, e)),
            };

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr).to_string();
                warn!(%command, stderr = %stderr.trim(), "converter failed");
                return Ok(ConvertOutcome::ConverterFailed { stderr });
            }

            // The converter names its artifact after the input stem.
            let stem = document
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let native = output_dir.join(format!("{stem}.pdf"));
            let canonical = output_dir.join(output_name);

            if !native.exists() {
                warn!(expected = %native.display(), "converter artifact missing");
                return Ok(ConvertOutcome::MissingArtifact { expected: native });
            }
            if native != canonical {
                if canonical.exists() {
                    fs::remove_file(&canonical).map_err(|e| Error::io(&canonical, e))?;
                }
                fs::rename(&native, &canonical).map_err(|e| Error::io(&canonical, e))?;
            }

            info!(document = %document.display(), pdf = %canonical.display(), "converted to PDF");
            return Ok(ConvertOutcome::Converted);
        }

        Ok(ConvertOutcome::BinaryNotFound)
    }

    /// First binary in the probe list that answers `--version`, with its
    /// reported version line. Used by dependency checks.
    pub fn probe(&self) -> Option<(String, String)> {
        for command in &self.commands {
            let mut probe = tokio::process::Command::new(command);
            probe.arg("--version");
            match run_with_timeout(probe, Duration::from_secs(5)) {
                Ok(Some(output)) if output.status.success() => {
                    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    return Some((command.clone(), version));
                }
                _ => continue,
            }
        }
        None
    }

    fn run_converter(
        &self,
        program: &str,
        document: &Path,
        output_dir: &Path,
    ) -> io::Result<Option<Output>> {
        let mut command = tokio::process::Command::new(program);
        command
            .args(["--headless", "--convert-to", "pdf", "--outdir"])
            .arg(output_dir)
            .arg(document);
        run_with_timeout(command, self.timeout)
    }
}

/// Run a command to completion, returning `None` when the timeout elapses.
/// The child is killed when it outlives the timeout.
fn run_with_timeout(
    mut command: tokio::process::Command,
    timeout: Duration,
) -> io::Result<Option<Output>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async move {
        match tokio::time::timeout(timeout, command.kill_on_drop(true).output()).await {
            Ok(output) => output.map(Some),
            Err(_elapsed) => Ok(None),
        }
    })
}

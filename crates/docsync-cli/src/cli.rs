//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use docsync_core::PDF_OUTPUT_NAME;

/// docsync - Keep near-duplicate documents consistent and rendered to PDF
#[derive(Parser, Debug)]
#[command(name = "docsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run one synchronization pass over a directory tree
    ///
    /// Selects the most recently modified document as the source, rebuilds
    /// every other document from it with its own email swapped back in,
    /// then converts everything to PDF.
    ///
    /// Examples:
    ///   docsync sync              # Sync the current directory
    ///   docsync sync ~/resumes    # Sync a specific tree
    ///   docsync sync --json       # Machine-readable report
    Sync {
        /// Root directory holding the documents
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Canonical filename for rendered PDFs
        #[arg(long, default_value = PDF_OUTPUT_NAME)]
        pdf_name: String,

        /// Output the pass report as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Watch a directory tree and re-sync on document changes
    ///
    /// Runs until interrupted with Ctrl-C. Changes arriving within the
    /// debounce window of a running pass are dropped.
    Watch {
        /// Root directory to watch
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Canonical filename for rendered PDFs
        #[arg(long, default_value = PDF_OUTPUT_NAME)]
        pdf_name: String,
    },

    /// Verify external dependencies are installed
    Check,
}

//! docsync CLI
//!
//! Keeps a directory of near-duplicate word-processor documents consistent
//! and renders each to a fixed-name PDF.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Sync {
            root,
            pdf_name,
            json,
        } => commands::run_sync(&root, &pdf_name, json),
        Commands::Watch { root, pdf_name } => commands::run_watch(&root, &pdf_name),
        Commands::Check => commands::run_check(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_error_user() {
        let error = crate::error::CliError::user("test error");
        assert_eq!(format!("{}", error), "test error");
    }

    #[test]
    fn sync_on_an_empty_directory_fails() {
        let temp = tempfile::TempDir::new().unwrap();
        let result = commands::run_sync(temp.path(), "Resume.pdf", false);
        assert!(result.is_err());
    }

    #[test]
    fn sync_on_a_missing_directory_fails() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        let result = commands::run_sync(&missing, "Resume.pdf", false);
        assert!(result.is_err());
    }
}

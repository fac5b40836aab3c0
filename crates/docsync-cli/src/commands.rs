//! Command implementations

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use colored::Colorize;

use docsync_core::{ChangeWatcher, PassReport, PdfConverter, Synchronizer};

use crate::error::{CliError, Result};

fn require_root(root: &Path) -> Result<()> {
    if root.exists() {
        Ok(())
    } else {
        Err(CliError::user(format!(
            "directory '{}' does not exist",
            root.display()
        )))
    }
}

/// Run the sync command: one full pass over `root`.
pub fn run_sync(root: &Path, pdf_name: &str, json: bool) -> Result<()> {
    require_root(root)?;

    let synchronizer = Synchronizer::new(root).with_pdf_name(pdf_name);
    let report = synchronizer.run_pass()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Run the watch command: continuous re-sync until Ctrl-C.
pub fn run_watch(root: &Path, pdf_name: &str) -> Result<()> {
    require_root(root)?;

    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancelled);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;

    println!(
        "{} Watching {} for document changes",
        "=>".blue().bold(),
        root.display()
    );
    println!("Press Ctrl-C to stop.");

    let synchronizer = Synchronizer::new(root).with_pdf_name(pdf_name);
    let mut watcher = ChangeWatcher::new(root);
    watcher.watch(&synchronizer, &cancelled)?;

    println!("{} Watcher stopped.", "OK".green().bold());
    Ok(())
}

/// Run the check command: verify the external converter is available.
pub fn run_check() -> Result<()> {
    println!("{} Checking external dependencies...", "=>".blue().bold());

    match PdfConverter::new().probe() {
        Some((command, version)) => {
            println!(
                "{} Converter found: {} ({})",
                "OK".green().bold(),
                command.cyan(),
                version
            );
            Ok(())
        }
        None => {
            println!("{} LibreOffice was not found.", "MISSING".red().bold());
            println!();
            println!("Install it with:");
            println!("   macOS: {}", "brew install --cask libreoffice".cyan());
            println!("   Linux: {}", "sudo apt-get install libreoffice".cyan());
            println!(
                "   Or download from {}",
                "https://www.libreoffice.org/".cyan()
            );
            Err(CliError::user("missing required dependencies"))
        }
    }
}

fn print_report(report: &PassReport) {
    println!(
        "{} Synchronized documents under {}",
        "=>".blue().bold(),
        report.root.display()
    );
    println!();

    println!("Found {} document(s):", report.candidates.len());
    for candidate in &report.candidates {
        let marker = if candidate == &report.source {
            " (source)".green().bold().to_string()
        } else {
            String::new()
        };
        println!(
            "   {} {} {}{}",
            "-".dimmed(),
            candidate.display(),
            format!("(modified: {})", modified_label(candidate)).dimmed(),
            marker
        );
    }
    println!();

    for action in &report.actions {
        println!("   {} {}", "+".green(), action);
    }
    for warning in &report.warnings {
        println!("   {} {}", "!".yellow(), warning);
    }
    for error in &report.errors {
        println!("   {} {}", "x".red(), error);
    }
    println!();

    if report.success() {
        println!("{} Synchronization complete.", "OK".green().bold());
    } else {
        println!(
            "{} Synchronization finished with {} error(s).",
            "WARN".yellow().bold(),
            report.errors.len()
        );
    }
}

fn modified_label(path: &Path) -> String {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(format_time)
        .unwrap_or_else(|_| "unknown".to_string())
}

fn format_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

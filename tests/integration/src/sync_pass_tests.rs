//! End-to-end synchronization scenarios
//!
//! Each test builds a real directory tree of document packages, runs a full
//! pass, and asserts on the persisted results: target content, source
//! stability, and rendered PDF artifacts (through a fake converter).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use docsync_core::{PdfConverter, Synchronizer, find_email};
use docsync_docx::Document;
use docsync_test_utils::DocxFixture;
use tempfile::TempDir;

fn set_mtime(path: &Path, time: SystemTime) {
    let file = fs::OpenOptions::new().append(true).open(path).unwrap();
    file.set_modified(time).unwrap();
}

/// Converter whose probe list holds no real binary.
fn absent_converter() -> PdfConverter {
    PdfConverter::with_commands(vec!["/nonexistent/soffice".to_string()])
}

#[cfg(unix)]
fn fake_converter(dir: &Path) -> PdfConverter {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("fake-soffice");
    fs::write(
        &script,
        "#!/bin/sh\noutdir=\"$5\"\ninput=\"$6\"\nstem=$(basename \"$input\" .docx)\nprintf 'pdf' > \"$outdir/$stem.pdf\"\n",
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    PdfConverter::with_commands(vec![
        "/nonexistent/soffice".to_string(),
        "/also/nonexistent/libreoffice".to_string(),
        script.to_string_lossy().to_string(),
    ])
}

/// Lay out the canonical two-variant tree: a newer A and an older B in
/// separate subdirectories, as resume folders usually are.
fn two_variant_tree(root: &Path) -> (PathBuf, PathBuf) {
    let a = root.join("cmu/A.docx");
    let b = root.join("gmail/B.docx");
    fs::create_dir_all(a.parent().unwrap()).unwrap();
    fs::create_dir_all(b.parent().unwrap()).unwrap();

    DocxFixture::new()
        .body_paragraph(&["Niket Jain"])
        .body_paragraph(&["Pittsburgh, PA | ", "a@", "x.com"])
        .body_paragraph(&["Recently updated experience section."])
        .write_to(&a)
        .unwrap();
    DocxFixture::new()
        .body_paragraph(&["Niket Jain"])
        .body_paragraph(&["Pittsburgh, PA | b@y.com"])
        .body_paragraph(&["Outdated experience section."])
        .write_to(&b)
        .unwrap();

    let now = SystemTime::now();
    set_mtime(&b, now - Duration::from_secs(3600));
    set_mtime(&a, now);

    (a, b)
}

#[test]
fn pass_propagates_content_and_preserves_identities() {
    let root = TempDir::new().unwrap();
    let (a, b) = two_variant_tree(root.path());
    let a_bytes = fs::read(&a).unwrap();

    let report = Synchronizer::new(root.path())
        .with_converter(absent_converter())
        .run_pass()
        .unwrap();

    assert_eq!(report.source, a);

    // A untouched, byte for byte.
    assert_eq!(fs::read(&a).unwrap(), a_bytes);

    // B now carries A's content with B's own email swapped back in.
    let rebuilt = Document::open(&b).unwrap();
    assert_eq!(
        rebuilt.paragraph_texts().unwrap(),
        vec![
            "Niket Jain",
            "Pittsburgh, PA | b@y.com",
            "Recently updated experience section.",
        ]
    );
    assert_eq!(find_email(&rebuilt).unwrap().unwrap(), "b@y.com");
}

#[cfg(unix)]
#[test]
fn pass_renders_a_canonical_pdf_next_to_each_document() {
    let root = TempDir::new().unwrap();
    let (a, b) = two_variant_tree(root.path());

    let report = Synchronizer::new(root.path())
        .with_converter(fake_converter(root.path()))
        .with_pdf_name("Resume_Niket_Jain.pdf")
        .run_pass()
        .unwrap();

    assert!(report.success(), "errors: {:?}", report.errors);
    assert!(a.parent().unwrap().join("Resume_Niket_Jain.pdf").exists());
    assert!(b.parent().unwrap().join("Resume_Niket_Jain.pdf").exists());

    // The converter's native names were renamed away.
    assert!(!a.parent().unwrap().join("A.pdf").exists());
    assert!(!b.parent().unwrap().join("B.pdf").exists());
}

#[test]
fn temp_lock_artifacts_are_invisible_to_a_pass() {
    let root = TempDir::new().unwrap();
    let (a, _b) = two_variant_tree(root.path());

    // An abandoned editor lock next to the source, newer than everything.
    let lock = a.parent().unwrap().join("~$A.docx");
    fs::write(&lock, b"lock").unwrap();
    set_mtime(&lock, SystemTime::now() + Duration::from_secs(60));

    let report = Synchronizer::new(root.path())
        .with_converter(absent_converter())
        .run_pass()
        .unwrap();

    assert_eq!(report.source, a);
    assert_eq!(report.candidates.len(), 2);
}

#[test]
fn repeated_passes_are_stable() {
    let root = TempDir::new().unwrap();
    let (a, b) = two_variant_tree(root.path());

    let sync = Synchronizer::new(root.path()).with_converter(absent_converter());
    sync.run_pass().unwrap();

    // Pin mtimes so the second pass selects the same source.
    let now = SystemTime::now();
    set_mtime(&b, now - Duration::from_secs(3600));
    set_mtime(&a, now);
    let texts_after_first = Document::open(&b).unwrap().paragraph_texts().unwrap();

    sync.run_pass().unwrap();

    let rebuilt = Document::open(&b).unwrap();
    assert_eq!(find_email(&rebuilt).unwrap().unwrap(), "b@y.com");
    assert_eq!(rebuilt.paragraph_texts().unwrap(), texts_after_first);
}

#[test]
fn cross_run_identity_survives_the_full_binary_path() {
    let root = TempDir::new().unwrap();
    two_variant_tree(root.path());

    assert_cmd::Command::cargo_bin("docsync")
        .unwrap()
        .arg("sync")
        .arg(root.path())
        .assert()
        .success();

    let b = root.path().join("gmail/B.docx");
    let rebuilt = Document::open(&b).unwrap();
    assert_eq!(find_email(&rebuilt).unwrap().unwrap(), "b@y.com");
}

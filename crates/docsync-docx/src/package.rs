//! OPC package access
//!
//! Reads the paragraph-bearing parts out of a `.docx` zip and rewrites the
//! package by streaming every entry to a temp file, substituting replaced
//! parts, then renaming over the destination.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use zip::ZipArchive;
use zip::write::SimpleFileOptions;

use crate::{Error, Result};

/// The main document part every package must carry.
pub(crate) const DOCUMENT_PART: &str = "word/document.xml";

pub(crate) fn is_header_part(name: &str) -> bool {
    name.starts_with("word/header") && name.ends_with(".xml")
}

pub(crate) fn is_footer_part(name: &str) -> bool {
    name.starts_with("word/footer") && name.ends_with(".xml")
}

/// Read the paragraph-bearing parts, ordered document, headers, footers.
pub(crate) fn read_parts(path: &Path) -> Result<Vec<(String, String)>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| Error::package(path, e))?;

    let mut headers = Vec::new();
    let mut footers = Vec::new();
    let mut has_document = false;
    for index in 0..archive.len() {
        let entry = archive.by_index(index).map_err(|e| Error::package(path, e))?;
        let name = entry.name().to_string();
        if name == DOCUMENT_PART {
            has_document = true;
        } else if is_header_part(&name) {
            headers.push(name);
        } else if is_footer_part(&name) {
            footers.push(name);
        }
    }

    if !has_document {
        return Err(Error::MissingPart {
            path: path.to_path_buf(),
            part: DOCUMENT_PART.to_string(),
        });
    }

    headers.sort();
    footers.sort();

    let mut ordered = vec![DOCUMENT_PART.to_string()];
    ordered.extend(headers);
    ordered.extend(footers);

    let mut parts = Vec::with_capacity(ordered.len());
    for name in ordered {
        let mut entry = archive.by_name(&name).map_err(|e| Error::package(path, e))?;
        let mut xml = String::new();
        entry
            .read_to_string(&mut xml)
            .map_err(|e| Error::io(path, e))?;
        parts.push((name, xml));
    }

    Ok(parts)
}

/// Rewrite the package at `source` into `dest`, substituting `replacements`.
///
/// Entries keep their original compression method. The new package is
/// written to a hidden temp sibling of `dest` first, then renamed over it.
pub(crate) fn write_package(
    source: &Path,
    dest: &Path,
    replacements: &BTreeMap<String, String>,
) -> Result<()> {
    let source_file = File::open(source).map_err(|e| Error::io(source, e))?;
    let mut archive = ZipArchive::new(source_file).map_err(|e| Error::package(source, e))?;

    let temp_name = format!(
        ".{}.{}.tmp",
        dest.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = dest.with_file_name(&temp_name);

    let temp_file = File::create(&temp_path).map_err(|e| Error::io(&temp_path, e))?;
    let mut writer = zip::ZipWriter::new(temp_file);

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| Error::package(source, e))?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();

        let options = SimpleFileOptions::default().compression_method(entry.compression());
        writer
            .start_file(name.as_str(), options)
            .map_err(|e| Error::package(&temp_path, e))?;

        if let Some(xml) = replacements.get(&name) {
            writer
                .write_all(xml.as_bytes())
                .map_err(|e| Error::io(&temp_path, e))?;
        } else {
            let mut original = Vec::new();
            entry
                .read_to_end(&mut original)
                .map_err(|e| Error::io(source, e))?;
            writer
                .write_all(&original)
                .map_err(|e| Error::io(&temp_path, e))?;
        }
    }

    writer.finish().map_err(|e| Error::package(&temp_path, e))?;

    fs::rename(&temp_path, dest).map_err(|e| Error::io(dest, e))?;

    Ok(())
}

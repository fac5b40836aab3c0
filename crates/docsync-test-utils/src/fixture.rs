//! [`DocxFixture`] builder for word-processor document fixtures.
//!
//! Assembles a real OPC package (content types, relationships, document,
//! header and footer parts) from run-fragmented paragraph specs, so tests
//! exercise the same zip + XML surface production documents have.
//!
//! # Example
//!
//! ```rust,no_run
//! use docsync_test_utils::DocxFixture;
//!
//! DocxFixture::new()
//!     .body_paragraph(&["nik", "et@", "cs.cmu.edu"])
//!     .table_cell(&["niket@cs.cmu.edu"])
//!     .write_to(std::path::Path::new("/tmp/sample.docx"))
//!     .unwrap();
//! ```

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;

const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const RELS_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const ROOT_RELS: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
     <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
     <Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"word/document.xml\"/>\
     </Relationships>";

/// Builder for a minimal but structurally honest `.docx` package.
#[derive(Debug, Default)]
pub struct DocxFixture {
    body: Vec<String>,
    tables: Vec<String>,
    headers: Vec<String>,
    footers: Vec<String>,
}

impl DocxFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a body paragraph built from one run per text fragment.
    pub fn body_paragraph(mut self, runs: &[&str]) -> Self {
        self.body.push(paragraph_xml(runs));
        self
    }

    /// Append a single-cell table whose cell holds one paragraph.
    pub fn table_cell(mut self, runs: &[&str]) -> Self {
        self.tables.push(format!(
            "<w:tbl><w:tr><w:tc>{}</w:tc></w:tr></w:tbl>",
            paragraph_xml(runs)
        ));
        self
    }

    /// Append a paragraph to the header part.
    pub fn header_paragraph(mut self, runs: &[&str]) -> Self {
        self.headers.push(paragraph_xml(runs));
        self
    }

    /// Append a paragraph to the footer part.
    pub fn footer_paragraph(mut self, runs: &[&str]) -> Self {
        self.footers.push(paragraph_xml(runs));
        self
    }

    /// Write the package to `path`.
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        let mut zip = zip::ZipWriter::new(file);

        start(&mut zip, "[Content_Types].xml")?;
        zip.write_all(self.content_types().as_bytes())?;

        start(&mut zip, "_rels/.rels")?;
        zip.write_all(ROOT_RELS.as_bytes())?;

        start(&mut zip, "word/_rels/document.xml.rels")?;
        zip.write_all(self.document_rels().as_bytes())?;

        start(&mut zip, "word/document.xml")?;
        zip.write_all(self.document_xml().as_bytes())?;

        if !self.headers.is_empty() {
            start(&mut zip, "word/header1.xml")?;
            zip.write_all(self.header_xml().as_bytes())?;
        }
        if !self.footers.is_empty() {
            start(&mut zip, "word/footer1.xml")?;
            zip.write_all(self.footer_xml().as_bytes())?;
        }

        zip.finish().map_err(io::Error::other)?;
        Ok(())
    }

    fn content_types(&self) -> String {
        let mut overrides = String::from(
            r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
        );
        if !self.headers.is_empty() {
            overrides.push_str(
                r#"<Override PartName="/word/header1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml"/>"#,
            );
        }
        if !self.footers.is_empty() {
            overrides.push_str(
                r#"<Override PartName="/word/footer1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"/>"#,
            );
        }
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
             <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
             <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
             {overrides}</Types>"
        )
    }

    fn document_rels(&self) -> String {
        let mut rels = String::new();
        if !self.headers.is_empty() {
            rels.push_str(&format!(
                r#"<Relationship Id="rIdHdr" Type="{RELS_NS}/header" Target="header1.xml"/>"#
            ));
        }
        if !self.footers.is_empty() {
            rels.push_str(&format!(
                r#"<Relationship Id="rIdFtr" Type="{RELS_NS}/footer" Target="footer1.xml"/>"#
            ));
        }
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
             {rels}</Relationships>"
        )
    }

    fn document_xml(&self) -> String {
        let mut sect = String::new();
        if !self.headers.is_empty() {
            sect.push_str(r#"<w:headerReference w:type="default" r:id="rIdHdr"/>"#);
        }
        if !self.footers.is_empty() {
            sect.push_str(r#"<w:footerReference w:type="default" r:id="rIdFtr"/>"#);
        }
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:document xmlns:w=\"{WORDML_NS}\" xmlns:r=\"{RELS_NS}\">\
             <w:body>{}{}<w:sectPr>{sect}</w:sectPr></w:body></w:document>",
            self.body.concat(),
            self.tables.concat(),
        )
    }

    fn header_xml(&self) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:hdr xmlns:w=\"{WORDML_NS}\">{}</w:hdr>",
            self.headers.concat()
        )
    }

    fn footer_xml(&self) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:ftr xmlns:w=\"{WORDML_NS}\">{}</w:ftr>",
            self.footers.concat()
        )
    }
}

fn start(zip: &mut zip::ZipWriter<File>, name: &str) -> io::Result<()> {
    zip.start_file(name, SimpleFileOptions::default())
        .map_err(io::Error::other)
}

fn paragraph_xml(runs: &[&str]) -> String {
    let runs: String = runs
        .iter()
        .map(|text| {
            format!(
                "<w:r><w:t xml:space=\"preserve\">{}</w:t></w:r>",
                escape_text(text)
            )
        })
        .collect();
    format!("<w:p>{runs}</w:p>")
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

//! Paragraph and run spans over a WordprocessingML part
//!
//! Parsing keeps byte ranges back into the raw part text, so rewrites are
//! applied as targeted splices instead of a full re-serialization. Elements
//! are matched by local name, which tolerates unusual namespace prefixes.

use std::ops::Range;

use roxmltree::{Document as XmlTree, Node};

/// A paragraph-bearing container in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Top-level body paragraphs
    Body,
    /// Paragraphs inside table cells
    Table,
    /// Header part paragraphs
    Header,
    /// Footer part paragraphs
    Footer,
}

impl Surface {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Table => "table",
            Self::Header => "header",
            Self::Footer => "footer",
        }
    }
}

impl std::fmt::Display for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single styled text fragment inside a paragraph.
#[derive(Debug, Clone)]
pub struct RunSpan {
    /// Byte range of the `<w:r>` element in the part text
    pub(crate) element: Range<usize>,
    /// Byte ranges of each `<w:t>` element owned by this run
    pub(crate) text_elements: Vec<Range<usize>>,
    /// Concatenated text content of the run
    pub text: String,
}

/// A paragraph with its ordered runs.
#[derive(Debug, Clone)]
pub struct ParagraphSpan {
    /// Byte range of the `<w:p>` element in the part text
    pub(crate) element: Range<usize>,
    pub surface: Surface,
    pub runs: Vec<RunSpan>,
}

impl ParagraphSpan {
    /// Full paragraph text: run texts concatenated in order, no separators.
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

fn is_tag(node: Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

/// Parse every paragraph in a part, in document order.
///
/// `default_surface` is the surface of the part itself; body paragraphs
/// nested inside a `<w:tbl>` are reclassified as table paragraphs.
pub(crate) fn parse_paragraphs(
    xml: &str,
    default_surface: Surface,
) -> std::result::Result<Vec<ParagraphSpan>, roxmltree::Error> {
    let tree = XmlTree::parse(xml)?;
    let mut spans = Vec::new();

    for paragraph in tree.descendants().filter(|n| is_tag(*n, "p")) {
        let surface = if default_surface == Surface::Body
            && paragraph.ancestors().any(|a| is_tag(a, "tbl"))
        {
            Surface::Table
        } else {
            default_surface
        };

        let mut runs = Vec::new();
        for run in paragraph.descendants().filter(|n| is_tag(*n, "r")) {
            // Runs nested under a deeper paragraph (text boxes) belong there.
            let owner = run.ancestors().find(|a| is_tag(*a, "p"));
            if owner.map(|o| o.id()) != Some(paragraph.id()) {
                continue;
            }

            let mut text = String::new();
            let mut text_elements = Vec::new();
            for t in run.descendants().filter(|n| is_tag(*n, "t")) {
                let t_owner = t.ancestors().find(|a| is_tag(*a, "r"));
                if t_owner.map(|o| o.id()) != Some(run.id()) {
                    continue;
                }
                text.push_str(t.text().unwrap_or_default());
                text_elements.push(t.range());
            }

            runs.push(RunSpan {
                element: run.range(),
                text_elements,
                text,
            });
        }

        spans.push(ParagraphSpan {
            element: paragraph.range(),
            surface,
            runs,
        });
    }

    Ok(spans)
}

pub(crate) const EMPTY_TEXT_ELEMENT: &str = "<w:t/>";

/// Render a `<w:t>` element carrying `text`.
pub(crate) fn text_element(text: &str) -> String {
    if text.is_empty() {
        EMPTY_TEXT_ELEMENT.to_string()
    } else {
        format!("<w:t xml:space=\"preserve\">{}</w:t>", escape_text(text))
    }
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Splices that clear every run's text and place `text` in the paragraph's
/// first run, creating a run when the paragraph has none.
pub(crate) fn paragraph_text_edits(
    xml: &str,
    paragraph: &ParagraphSpan,
    text: &str,
) -> Vec<(Range<usize>, String)> {
    let mut edits = Vec::new();
    let mut keep: Option<Range<usize>> = None;

    match paragraph.runs.first() {
        Some(first) => match first.text_elements.first() {
            Some(range) => {
                keep = Some(range.clone());
                edits.push((range.clone(), text_element(text)));
            }
            None => {
                // First run carries no text element; give it one.
                if let Some(edit) = append_inside(xml, &first.element, "w:r", &text_element(text)) {
                    edits.push(edit);
                }
            }
        },
        None => {
            let run = format!("<w:r>{}</w:r>", text_element(text));
            if let Some(edit) = append_inside(xml, &paragraph.element, "w:p", &run) {
                edits.push(edit);
            }
        }
    }

    for run in &paragraph.runs {
        for range in &run.text_elements {
            if Some(range) != keep.as_ref() {
                edits.push((range.clone(), EMPTY_TEXT_ELEMENT.to_string()));
            }
        }
    }

    edits
}

/// Splice inserting `inner` just before the closing tag of `element`,
/// expanding a self-closing element when needed.
fn append_inside(
    xml: &str,
    element: &Range<usize>,
    tag: &str,
    inner: &str,
) -> Option<(Range<usize>, String)> {
    let slice = &xml[element.clone()];
    let closing = format!("</{}>", tag);
    if slice.ends_with(&closing) {
        let at = element.end - closing.len();
        Some((at..at, inner.to_string()))
    } else if slice.ends_with("/>") {
        Some((element.end - 2..element.end, format!(">{}{}", inner, closing)))
    } else {
        None
    }
}

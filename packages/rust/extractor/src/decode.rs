//! Docx container decoding.
//!
//! Turns the binary docx package into the flat paragraph stream the
//! extraction state machine consumes. Heading style IDs are resolved through
//! the document's style table to the labels desktop editors display
//! (`Heading1` → `heading 1`); non-heading style IDs pass through as-is.

use std::collections::HashMap;

use docx_rs::{DocumentChild, ParagraphChild, RunChild, read_docx};
use tracing::debug;

use faqpilot_shared::{FaqPilotError, Result};

/// Style name attached to paragraphs that carry no explicit style.
const DEFAULT_STYLE_NAME: &str = "Normal";

/// One unit of extractor input: paragraph text plus its style name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawParagraph {
    pub text: String,
    pub style_name: String,
}

/// Decode a `.docx` container into its ordered paragraph stream.
///
/// Tables, images, and other non-paragraph content are skipped; within a
/// paragraph, run text is concatenated (descending into hyperlinks), with
/// tabs and soft line breaks preserved as `\t` and `\n`.
pub fn decode_paragraphs(bytes: &[u8]) -> Result<Vec<RawParagraph>> {
    let docx = read_docx(bytes)
        .map_err(|e| FaqPilotError::decode(format!("failed to read docx container: {e}")))?;

    // styleId -> heading label, e.g. "Heading1" -> "heading 1", rebuilt from
    // the style's heading level. Non-heading styles are not mapped.
    let heading_names: HashMap<String, String> = docx
        .styles
        .styles
        .iter()
        .filter_map(|s| {
            s.name
                .get_heading_number()
                .map(|n| (s.style_id.clone(), format!("heading {n}")))
        })
        .collect();

    let mut paragraphs = Vec::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(p) = child {
            let mut text = String::new();
            collect_text(&p.children, &mut text);

            let style_name = match &p.property.style {
                Some(style) => heading_names
                    .get(&style.val)
                    .cloned()
                    // Non-heading IDs pass through so callers can still see them
                    .unwrap_or_else(|| style.val.clone()),
                None => DEFAULT_STYLE_NAME.to_string(),
            };

            paragraphs.push(RawParagraph { text, style_name });
        }
    }

    debug!(count = paragraphs.len(), "decoded paragraph stream");
    Ok(paragraphs)
}

/// Concatenate the visible text of runs, descending into hyperlinks.
fn collect_text(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    match run_child {
                        RunChild::Text(t) => out.push_str(&t.text),
                        RunChild::Tab(_) => out.push('\t'),
                        RunChild::Break(_) => out.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => collect_text(&link.children, out),
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

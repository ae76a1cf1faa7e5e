//! Section/question/answer reconstruction.
//!
//! Walks the style-labeled paragraph stream and rebuilds the two-level
//! heading structure with running state: the current section heading, the
//! current question heading, and the answer body accumulated since the last
//! question. Last-seen heading wins; there is no look-ahead.

use tracing::debug;

use faqpilot_shared::FaqRecord;

use crate::decode::RawParagraph;

/// Style labels that demarcate document structure.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Label of the coarse heading level grouping questions into a section.
    pub section_label: String,
    /// Label of the fine heading level starting one FAQ entry.
    pub question_label: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            section_label: "heading 1".into(),
            question_label: "heading 2".into(),
        }
    }
}

/// Extract FAQ records from an ordered paragraph stream.
///
/// Single pass. A record is emitted at each question boundary (and once at
/// end of input) only when section, question, and accumulated answer are all
/// non-empty after trimming; anything else is dropped silently. Label
/// matching is case-insensitive.
pub fn extract_records(paragraphs: &[RawParagraph], opts: &ExtractOptions) -> Vec<FaqRecord> {
    let section_label = opts.section_label.to_lowercase();
    let question_label = opts.question_label.to_lowercase();

    let mut records = Vec::new();
    let mut section = String::new();
    let mut question = String::new();
    let mut answer = String::new();

    for paragraph in paragraphs {
        let text = clean_line(&paragraph.text);
        if text.is_empty() {
            continue;
        }

        let style = paragraph.style_name.to_lowercase();
        if style == section_label {
            section = text;
        } else if style == question_label {
            flush(&mut records, &section, &question, &answer);
            answer.clear();
            question = text;
        } else {
            // Each body line lands behind a newline; consumers trim.
            answer.push('\n');
            answer.push_str(&text);
        }
    }

    flush(&mut records, &section, &question, &answer);

    debug!(records = records.len(), "extraction complete");
    records
}

/// Emit the pending block if section, question, and answer are all non-empty.
fn flush(records: &mut Vec<FaqRecord>, section: &str, question: &str, answer: &str) {
    let answer = answer.trim();
    if !answer.is_empty() && !section.is_empty() && !question.is_empty() {
        records.push(FaqRecord {
            text: answer.to_string(),
            section: section.to_string(),
            question: question.to_string(),
        });
    }
}

/// Trim surrounding whitespace and strip a leading byte-order mark.
fn clean_line(text: &str) -> String {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix('\u{feff}').unwrap_or(trimmed);
    trimmed.trim().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

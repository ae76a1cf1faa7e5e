//! Core domain types for the faqpilot corpus.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// FaqRecord
// ---------------------------------------------------------------------------

/// One extracted FAQ entry: a question, its section, and the accumulated
/// answer body.
///
/// A record only exists with all three fields non-empty after trimming;
/// the extractor never emits anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqRecord {
    /// Answer body, newline-joined from the source paragraphs.
    pub text: String,
    /// Most recent section heading at the time the question was seen.
    pub section: String,
    /// The question heading text.
    pub question: String,
}

// ---------------------------------------------------------------------------
// CourseDocuments
// ---------------------------------------------------------------------------

/// All records extracted from one course's FAQ document.
///
/// A sequence of these is the persisted interchange artifact
/// (`documents.json`) between extraction and indexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDocuments {
    /// Course identifier, e.g. `data-engineering-zoomcamp`.
    pub course: String,
    /// Extracted records in document order.
    pub documents: Vec<FaqRecord>,
}

// ---------------------------------------------------------------------------
// IndexedFaqRecord
// ---------------------------------------------------------------------------

/// A [`FaqRecord`] denormalized with its course, the unit stored in the
/// search index and returned from queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedFaqRecord {
    pub text: String,
    pub section: String,
    pub question: String,
    /// Exact-match course keyword.
    pub course: String,
}

impl IndexedFaqRecord {
    /// Attach a course to an extracted record.
    pub fn new(course: impl Into<String>, record: FaqRecord) -> Self {
        Self {
            text: record.text,
            section: record.section,
            question: record.question,
            course: course.into(),
        }
    }
}

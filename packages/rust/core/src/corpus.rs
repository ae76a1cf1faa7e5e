//! Corpus persistence: the JSON file handed from `extract` to `index`.

use std::fs;
use std::path::Path;

use tracing::debug;

use faqpilot_shared::{CourseDocuments, FaqPilotError, IndexedFaqRecord, Result};

/// Write the corpus as pretty-printed JSON, courses in the given order.
pub fn save_corpus(path: &Path, corpus: &[CourseDocuments]) -> Result<()> {
    let json = serde_json::to_string_pretty(corpus)
        .map_err(|e| FaqPilotError::validation(format!("corpus serialization failed: {e}")))?;
    fs::write(path, json).map_err(|e| FaqPilotError::io(path, e))?;

    debug!(path = %path.display(), courses = corpus.len(), "corpus written");
    Ok(())
}

/// Load a corpus written by [`save_corpus`].
pub fn load_corpus(path: &Path) -> Result<Vec<CourseDocuments>> {
    let json = fs::read_to_string(path).map_err(|e| FaqPilotError::io(path, e))?;
    serde_json::from_str(&json).map_err(|e| {
        FaqPilotError::validation(format!(
            "corpus at {} is not valid JSON: {e}",
            path.display()
        ))
    })
}

/// Flatten course groups into indexable records: course order, then document
/// order within each course.
pub fn flatten_corpus(corpus: Vec<CourseDocuments>) -> Vec<IndexedFaqRecord> {
    let mut records = Vec::new();
    for CourseDocuments { course, documents } in corpus {
        for doc in documents {
            records.push(IndexedFaqRecord::new(course.clone(), doc));
        }
    }
    records
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

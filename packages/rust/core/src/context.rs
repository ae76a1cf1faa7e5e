//! Context and prompt assembly for the completion model.

use faqpilot_shared::IndexedFaqRecord;

/// Render retrieved records into the context block, preserving rank order.
pub fn build_context(records: &[IndexedFaqRecord]) -> String {
    let mut context = String::new();
    for record in records {
        context.push_str(&format!(
            "Section: {}\nQuestion: {}\nAnswer: {}\n\n",
            record.section, record.question, record.text
        ));
    }
    context.trim().to_string()
}

/// Wrap the user's question and the context block in the instruction
/// template sent to the model.
pub fn build_prompt(question: &str, context: &str) -> String {
    format!(
        "You're a course teaching assistant.
Answer the user QUESTION based on CONTEXT - the documents retrieved from our FAQ database.
Don't use other information outside of the provided CONTEXT.

QUESTION: {question}

CONTEXT:

{context}"
    )
    .trim()
    .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Pipeline orchestration and domain logic for faqpilot.
//!
//! This crate ties the extractor, the search store, and the completion
//! provider together into the three end-to-end workflows behind the CLI:
//! `extract` (documents → corpus file), `index` (corpus file → search index),
//! and `ask` (question → retrieved context → model answer).

pub mod context;
pub mod corpus;
pub mod pipeline;

pub use pipeline::{
    AskConfig, AskResult, DOCS_EXPORT_BASE, ExtractConfig, ExtractResult, IndexConfig,
    IndexResult, ProgressReporter, SilentProgress, answer_question, extract_corpus, index_corpus,
};

//! Chat-completion integration for answer generation.
//!
//! [`CompletionProvider`] is the single seam the answer pipeline depends on:
//! a finished prompt goes in, the model's answer text comes out. The provider
//! never sees retrieval internals and the pipeline never sees API wire types.

use faqpilot_shared::Result;

pub mod openai;

pub use openai::OpenAiClient;

/// Turns a fully assembled prompt into an answer.
pub trait CompletionProvider: Send + Sync {
    /// Run one completion over `prompt` and return the model's text.
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}

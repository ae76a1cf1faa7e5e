//! FAQ document extraction: docx decoding and heading-driven parsing.
//!
//! The extractor is a pure transform — bytes of a docx container in, ordered
//! [`FaqRecord`](faqpilot_shared::FaqRecord)s out. It performs no network or
//! file I/O; fetching the container and persisting the records are the
//! caller's concern.

pub mod decode;
pub mod parser;

pub use decode::{RawParagraph, decode_paragraphs};
pub use parser::{ExtractOptions, extract_records};

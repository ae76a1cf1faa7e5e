//! Shared types, error model, and configuration for faqpilot.
//!
//! This crate is the foundation depended on by all other faqpilot crates.
//! It provides:
//! - [`FaqPilotError`] — the unified error type
//! - Domain types ([`FaqRecord`], [`CourseDocuments`], [`IndexedFaqRecord`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, OpenAiConfig, SearchConfig, SourceEntry, config_dir,
    config_file_path, init_config, load_config, load_config_from, resolve_api_key,
};
pub use error::{FaqPilotError, Result};
pub use types::{CourseDocuments, FaqRecord, IndexedFaqRecord};

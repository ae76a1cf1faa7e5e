//! Application configuration for faqpilot.
//!
//! User config lives at `~/.faqpilot/faqpilot.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FaqPilotError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "faqpilot.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".faqpilot";

// ---------------------------------------------------------------------------
// Config structs (matching faqpilot.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Search engine settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// OpenAI settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// FAQ document sources, one per course.
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceEntry>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            defaults: DefaultsConfig::default(),
            search: SearchConfig::default(),
            openai: OpenAiConfig::default(),
            sources: default_sources(),
        }
    }
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Where the extracted corpus is written/read.
    #[serde(default = "default_documents_path")]
    pub documents_path: String,

    /// Course used for `ask` when none is given.
    #[serde(default = "default_course")]
    pub course: String,

    /// How many records a query retrieves.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            documents_path: default_documents_path(),
            course: default_course(),
            top_k: default_top_k(),
        }
    }
}

fn default_documents_path() -> String {
    "documents.json".into()
}
fn default_course() -> String {
    "data-engineering-zoomcamp".into()
}
fn default_top_k() -> usize {
    5
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the search engine.
    #[serde(default = "default_search_url")]
    pub url: String,

    /// Index name for the FAQ records.
    #[serde(default = "default_index")]
    pub index: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: default_search_url(),
            index: default_index(),
        }
    }
}

fn default_search_url() -> String {
    "http://localhost:9200".into()
}
fn default_index() -> String {
    "course-questions".into()
}

/// `[openai]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Chat model used for answer synthesis.
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL; override to point at a compatible server.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            base_url: default_base_url(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}

/// `[[sources]]` entry — one course FAQ document in the remote store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Course identifier, also the index's course keyword.
    pub course: String,
    /// Remote document identifier.
    pub file_id: String,
}

fn default_sources() -> Vec<SourceEntry> {
    vec![
        SourceEntry {
            course: "data-engineering-zoomcamp".into(),
            file_id: "19bnYs80DwuUimHM65UV3sylsCn2j1vziPOwzBwQrebw".into(),
        },
        SourceEntry {
            course: "machine-learning-zoomcamp".into(),
            file_id: "1LpPanc33QJJ6BSsyxVg-pWNMplal84TdZtq10naIhD8".into(),
        },
        SourceEntry {
            course: "mlops-zoomcamp".into(),
            file_id: "12TlBfhIiKtyBv8RnsoJR6F72bkPDGEvPOItJIxaEzE0".into(),
        },
    ]
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.faqpilot/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| FaqPilotError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.faqpilot/faqpilot.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| FaqPilotError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        FaqPilotError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| FaqPilotError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| FaqPilotError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| FaqPilotError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the OpenAI API key from the configured env var.
pub fn resolve_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.openai.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(FaqPilotError::config(format!(
            "OpenAI API key not found. Set the {var_name} environment variable.\n\
             Get a key at https://platform.openai.com/api-keys"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("documents.json"));
        assert!(toml_str.contains("OPENAI_API_KEY"));
        assert!(toml_str.contains("course-questions"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.top_k, 5);
        assert_eq!(parsed.defaults.course, "data-engineering-zoomcamp");
        assert_eq!(parsed.openai.api_key_env, "OPENAI_API_KEY");
        assert_eq!(parsed.search.url, "http://localhost:9200");
    }

    #[test]
    fn default_sources_cover_all_courses() {
        let config = AppConfig::default();
        assert_eq!(config.sources.len(), 3);
        assert_eq!(config.sources[0].course, "data-engineering-zoomcamp");
        assert_eq!(config.sources[2].course, "mlops-zoomcamp");
    }

    #[test]
    fn config_with_custom_sources() {
        let toml_str = r#"
[search]
url = "http://search.internal:9200"

[[sources]]
course = "test-course"
file_id = "abc123"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].file_id, "abc123");
        assert_eq!(config.search.url, "http://search.internal:9200");
        // Untouched sections keep their defaults
        assert_eq!(config.defaults.top_k, 5);
        assert_eq!(config.openai.model, "gpt-3.5-turbo");
    }

    #[test]
    fn api_key_resolution() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.openai.api_key_env = "FAQPILOT_TEST_NONEXISTENT_KEY_12345".into();
        let result = resolve_api_key(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key not found"));
    }
}

//! Application configuration for Lexi.
//!
//! User config lives at `~/.lexi/lexi.toml`.
//! A `--config` flag overrides the location; missing files fall back to defaults.
//! The knowledge records are part of the config, so the seeded record below is
//! only a default, not the canonical list.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LexiError, Result};
use crate::types::{Citation, KnowledgeRecord};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "lexi.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".lexi";

// ---------------------------------------------------------------------------
// Config structs (matching lexi.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Assistant persona and pacing.
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Where cited documents are served from.
    #[serde(default)]
    pub documents: DocumentsConfig,

    /// Knowledge records, scanned in declaration order.
    #[serde(default = "default_records")]
    pub records: Vec<KnowledgeRecord>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assistant: AssistantConfig::default(),
            documents: DocumentsConfig::default(),
            records: default_records(),
        }
    }
}

/// `[assistant]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Display name used in headers and prompts.
    #[serde(default = "default_name")]
    pub name: String,

    /// Delay between a submission and the assistant's answer, in ms.
    #[serde(default = "default_pacing_delay")]
    pub pacing_delay_ms: u64,

    /// Answer used when no record matches.
    #[serde(default = "default_fallback_answer")]
    pub fallback_answer: String,

    /// Text shown while the transcript is empty.
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            pacing_delay_ms: default_pacing_delay(),
            fallback_answer: default_fallback_answer(),
            greeting: default_greeting(),
        }
    }
}

fn default_name() -> String {
    "Lexi".into()
}
fn default_pacing_delay() -> u64 {
    1000
}
fn default_fallback_answer() -> String {
    "I'm sorry, I couldn't find relevant legal information for your question.".into()
}
fn default_greeting() -> String {
    "Ask me a legal question and I'll cite real judgments.".into()
}

/// `[documents]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsConfig {
    /// Directory that site-absolute citation links resolve against.
    #[serde(default = "default_documents_root")]
    pub root: String,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            root: default_documents_root(),
        }
    }
}

fn default_documents_root() -> String {
    "public".into()
}

/// The seeded precedent shipped with the default config.
fn default_records() -> Vec<KnowledgeRecord> {
    vec![KnowledgeRecord {
        keywords: vec![
            "motor accident".into(),
            "self-employed".into(),
            "section 166".into(),
        ],
        answer: "Yes, under Section 166 of the Motor Vehicles Act, 1988, the claimants are \
                 entitled to an addition for future prospects..."
            .into(),
        citation: Citation {
            text: "Para 7: 10% of annual income should have been awarded on account of \
                   future prospects."
                .into(),
            link: "/Dani_Devi_v_Pritam_Singh.pdf".into(),
            highlights: vec![
                "54-55 years".into(),
                "future prospects".into(),
                "age of the deceased".into(),
            ],
            note: Some("Highlighted Para 7".into()),
        },
    }]
}

// ---------------------------------------------------------------------------
// Assistant settings (runtime, derived from config)
// ---------------------------------------------------------------------------

/// Runtime assistant settings handed to the conversation session.
#[derive(Debug, Clone)]
pub struct AssistantSettings {
    /// Display name.
    pub name: String,
    /// Pacing delay before an answer is appended.
    pub pacing_delay: Duration,
    /// Fallback answer for unmatched queries.
    pub fallback_answer: String,
    /// Empty-transcript greeting.
    pub greeting: String,
}

impl From<&AppConfig> for AssistantSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            name: config.assistant.name.clone(),
            pacing_delay: Duration::from_millis(config.assistant.pacing_delay_ms),
            fallback_answer: config.assistant.fallback_answer.clone(),
            greeting: config.assistant.greeting.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.lexi/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| LexiError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.lexi/lexi.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| LexiError::io(path, e))?;

    let config = toml::from_str(&content)
        .map_err(|e| LexiError::config(format!("failed to parse {}: {e}", path.display())))?;
    tracing::debug!(?path, "loaded config");
    Ok(config)
}

/// Load from `path` when given (must exist), otherwise from the default location.
pub fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(p) => load_config_from(p),
        None => load_config(),
    }
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LexiError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content = toml::to_string_pretty(&config).map_err(|e| LexiError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LexiError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("pacing_delay_ms"));
        assert!(toml_str.contains("section 166"));
        assert!(toml_str.contains("Dani_Devi_v_Pritam_Singh.pdf"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.assistant.pacing_delay_ms, 1000);
        assert_eq!(parsed.records, config.records);
    }

    #[test]
    fn missing_records_fall_back_to_seed() {
        let config: AppConfig = toml::from_str("[assistant]\nname = \"Counsel\"\n").expect("parse");
        assert_eq!(config.assistant.name, "Counsel");
        assert_eq!(config.records.len(), 1);
        assert_eq!(config.documents.root, "public");
    }

    #[test]
    fn config_with_custom_records() {
        let toml_str = r#"
[assistant]
pacing_delay_ms = 250

[[records]]
keywords = ["tenancy", "eviction"]
answer = "A landlord must serve notice before eviction."

[records.citation]
text = "Para 12: notice is mandatory."
link = "/tenancy.pdf"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.records.len(), 1);
        assert_eq!(config.records[0].keywords, vec!["tenancy", "eviction"]);
        assert!(config.records[0].citation.highlights.is_empty());

        let settings = AssistantSettings::from(&config);
        assert_eq!(settings.pacing_delay, Duration::from_millis(250));
        assert_eq!(settings.name, "Lexi");
    }

    #[test]
    fn empty_record_list_is_kept() {
        let config: AppConfig = toml::from_str("records = []\n").expect("parse");
        assert!(config.records.is_empty());
    }

    #[test]
    fn config_fixture_validates() {
        let config = load_config_from(Path::new("../../../fixtures/config/lexi.fixture.toml"))
            .expect("load fixture config");
        assert_eq!(config.assistant.pacing_delay_ms, 500);
        assert_eq!(config.records.len(), 2);
        assert_eq!(config.records[1].citation.note.as_deref(), Some("Highlighted Para 4"));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let result = resolve_config(Some(Path::new("/nonexistent/lexi-test-12345.toml")));
        assert!(matches!(result, Err(LexiError::Io { .. })));
    }
}

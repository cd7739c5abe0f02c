//! Configuration structures for the analysis pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Main configuration for lvdoc.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LvdocConfig {
    /// Language model configuration.
    pub llm: LlmConfig,

    /// Input history configuration.
    pub history: HistoryConfig,

    /// Prompt tuning.
    pub prompts: PromptConfig,
}

/// Which generation backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// OpenAI-compatible chat completions endpoint.
    #[default]
    OpenAi,
    /// Scripted mock backend (offline runs).
    Mock,
}

/// Language model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub backend: BackendKind,

    /// Base URL of the chat completions API.
    pub endpoint: String,

    /// Model name.
    pub model: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Transport timeout in seconds.
    pub timeout_secs: u64,

    /// JSON array of scripted replies for the mock backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mock_replies: Option<PathBuf>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::OpenAi,
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.0,
            timeout_secs: 60,
            mock_replies: None,
        }
    }
}

#[cfg(feature = "http")]
impl LlmConfig {
    /// Build the HTTP backend configuration, reading the API key from the
    /// environment.
    pub fn to_openai_config(&self) -> Result<lvdoc_llm::OpenAiConfig, ConfigError> {
        let api_key = std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey(self.api_key_env.clone()))?;

        Ok(lvdoc_llm::OpenAiConfig {
            endpoint: self.endpoint.clone(),
            api_key: Some(api_key),
            model: self.model.clone(),
            temperature: self.temperature,
            timeout_secs: self.timeout_secs,
        })
    }
}

/// Input history configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Persist submitted inputs.
    pub enabled: bool,

    /// Directory of the history store (default: platform data dir).
    pub dir: Option<PathBuf>,

    /// Maximum number of entries kept (capped at 5).
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            max_entries: crate::history::MAX_HISTORY_ENTRIES,
        }
    }
}

/// Prompt tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Lower bound of the requested summary length, in sentences.
    pub summary_min_sentences: u8,

    /// Upper bound of the requested summary length, in sentences.
    pub summary_max_sentences: u8,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            summary_min_sentences: 3,
            summary_max_sentences: 5,
        }
    }
}

impl LvdocConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

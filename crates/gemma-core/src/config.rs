//! Configuration model.
//!
//! Every field has a default so an absent or partial `config.toml` is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Loopback address of the local Ollama service.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Model identifier sent with every generation request.
pub const DEFAULT_MODEL: &str = "gemma3:4b";

pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AssistantConfig {
    pub ollama: OllamaConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct OllamaConfig {
    /// Base URL of the inference service (without the `/api` suffix).
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Request timeout in seconds. Absent means the transport default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the platform data directory holding `chats.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when neither `GEMMA_LOG` nor `RUST_LOG` is set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config: AssistantConfig = toml::from_str("").unwrap();
        assert_eq!(config, AssistantConfig::default());
        assert_eq!(config.ollama.base_url, DEFAULT_OLLAMA_URL);
        assert_eq!(config.ollama.model, DEFAULT_MODEL);
        assert!(config.ollama.timeout_secs.is_none());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: AssistantConfig = toml::from_str(
            r#"
            [ollama]
            model = "llama3.2"
            "#,
        )
        .unwrap();
        assert_eq!(config.ollama.model, "llama3.2");
        assert_eq!(config.ollama.base_url, DEFAULT_OLLAMA_URL);
        assert_eq!(config.logging.level, DEFAULT_LOG_LEVEL);
    }
}

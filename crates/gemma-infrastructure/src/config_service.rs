//! Configuration service implementation.
//!
//! Loads `config.toml` and layers environment overrides on top. Command-line
//! overrides are applied by the binary after this.

use crate::paths::GemmaPaths;
use gemma_core::config::AssistantConfig;
use gemma_core::error::{AssistantError, Result};
use std::path::{Path, PathBuf};

/// Overrides `ollama.base_url`.
pub const ENV_OLLAMA_URL: &str = "GEMMA_OLLAMA_URL";
/// Overrides `ollama.model`.
pub const ENV_MODEL: &str = "GEMMA_MODEL";

/// Resolves the effective configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: Option<PathBuf>,
}

impl ConfigService {
    /// Uses the platform config file. When its location cannot be determined
    /// the service falls back to defaults.
    pub fn new() -> Self {
        let path = match GemmaPaths::config_file() {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("Config file location unavailable: {}", e);
                None
            }
        };
        Self { path }
    }

    /// Uses an explicit config file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Reads the file (or defaults when absent) and applies process env overrides.
    ///
    /// # Errors
    ///
    /// Returns `Config` when the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<AssistantConfig> {
        let mut config = self.load_file()?;
        apply_overrides(&mut config, |key| std::env::var(key).ok());
        Ok(config)
    }

    /// Reads the file only, without environment overrides.
    pub fn load_file(&self) -> Result<AssistantConfig> {
        let Some(path) = self.path.as_deref() else {
            return Ok(AssistantConfig::default());
        };

        if !path.exists() {
            tracing::debug!("No config file at {:?}, using defaults", path);
            return Ok(AssistantConfig::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AssistantError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|e| {
            AssistantError::config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies `GEMMA_OLLAMA_URL` / `GEMMA_MODEL` from `lookup`. Blank values are ignored.
pub fn apply_overrides<F>(config: &mut AssistantConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_OLLAMA_URL).filter(|v| !v.trim().is_empty()) {
        tracing::debug!("{} overrides Ollama URL: {}", ENV_OLLAMA_URL, url);
        config.ollama.base_url = url.trim().trim_end_matches('/').to_string();
    }
    if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.trim().is_empty()) {
        tracing::debug!("{} overrides model: {}", ENV_MODEL, model);
        config.ollama.model = model.trim().to_string();
    }
}

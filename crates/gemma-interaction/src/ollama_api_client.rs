//! OllamaApiClient - Direct REST API implementation for a local Ollama service.
//!
//! Calls `POST {base_url}/api/generate` with streaming disabled and returns
//! the `response` field of the reply verbatim.

use async_trait::async_trait;
use gemma_core::config::{DEFAULT_MODEL, DEFAULT_OLLAMA_URL, OllamaConfig};
use gemma_core::error::{AssistantError, Result};
use gemma_core::model_client::ModelClient;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GENERATE_PATH: &str = "/api/generate";

/// Longest error body excerpt carried into an error message.
const ERROR_BODY_EXCERPT: usize = 200;

/// Model client that talks to the Ollama HTTP API.
#[derive(Clone)]
pub struct OllamaApiClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaApiClient {
    /// Creates a client for `base_url` using `model`, with transport-default timeouts.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: normalize_base_url(base_url.into()),
            model: model.into(),
        }
    }

    /// Creates a client from the `[ollama]` config section.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the HTTP client cannot be built with the requested timeout.
    pub fn from_config(config: &OllamaConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|err| AssistantError::config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: normalize_base_url(config.base_url.clone()),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_url(&self) -> String {
        format!("{}{}", self.base_url, GENERATE_PATH)
    }

    async fn send_request(&self, body: &GenerateRequest<'_>) -> Result<String> {
        let url = self.generate_url();
        tracing::debug!(model = %self.model, url = %url, "Sending generation request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| unavailable(describe_transport_error(&err)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Ollama error body".to_string());
            return Err(map_http_error(status, &body_text));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|err| unavailable(format!("invalid response body: {err}")))?;

        tracing::debug!(
            model = %self.model,
            chars = parsed.response.len(),
            "Generation request completed"
        );
        Ok(parsed.response)
    }
}

impl Default for OllamaApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_OLLAMA_URL, DEFAULT_MODEL)
    }
}

#[async_trait]
impl ModelClient for OllamaApiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        match self.send_request(&request).await {
            Ok(text) => Ok(text),
            Err(err) => {
                tracing::warn!(model = %self.model, "Ollama request failed: {}", err);
                Err(err)
            }
        }
    }

    fn endpoint(&self) -> &str {
        &self.base_url
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

fn normalize_base_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn unavailable(detail: impl std::fmt::Display) -> AssistantError {
    AssistantError::model_unavailable(format!("Failed to communicate with Ollama: {detail}"))
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out ({err})")
    } else if err.is_connect() {
        format!("connection failed ({err})")
    } else {
        err.to_string()
    }
}

fn map_http_error(status: StatusCode, body: &str) -> AssistantError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| wrapper.error)
        .unwrap_or_else(|_| body.chars().take(ERROR_BODY_EXCERPT).collect());

    if message.trim().is_empty() {
        unavailable(format!("HTTP {status}"))
    } else {
        unavailable(format!("HTTP {status}: {}", message.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(GenerateRequest {
            model: "gemma3:4b",
            prompt: "hi",
            stream: false,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"model": "gemma3:4b", "prompt": "hi", "stream": false})
        );
    }

    #[test]
    fn test_trailing_slash_is_dropped() {
        let client = OllamaApiClient::new("http://localhost:11434/", "gemma3:4b");
        assert_eq!(client.endpoint(), "http://localhost:11434");
        assert_eq!(client.generate_url(), "http://localhost:11434/api/generate");
    }

    #[test]
    fn test_http_error_prefers_ollama_error_field() {
        let err = map_http_error(
            StatusCode::NOT_FOUND,
            r#"{"error":"model 'gemma3:4b' not found"}"#,
        );
        assert!(err.is_model_unavailable());
        assert_eq!(
            err.to_string(),
            "Failed to communicate with Ollama: HTTP 404 Not Found: model 'gemma3:4b' not found"
        );
    }

    #[test]
    fn test_http_error_truncates_raw_body() {
        let body = "x".repeat(1000);
        let err = map_http_error(StatusCode::INTERNAL_SERVER_ERROR, &body);
        assert!(err.to_string().len() < 400);
    }

    #[test]
    fn test_from_config_applies_model_and_url() {
        let config = OllamaConfig {
            base_url: "http://10.0.0.2:11434".to_string(),
            model: "gemma3:1b".to_string(),
            timeout_secs: Some(5),
        };
        let client = OllamaApiClient::from_config(&config).unwrap();
        assert_eq!(client.endpoint(), "http://10.0.0.2:11434");
        assert_eq!(client.model(), "gemma3:1b");
    }
}

//! Model access: the Ollama HTTP client and the prompt templates built
//! around it.

pub mod ollama_api_client;
pub mod prompts;

pub use ollama_api_client::OllamaApiClient;
pub use prompts::{edit_prompt, remediation_text};

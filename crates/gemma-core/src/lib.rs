//! Domain layer of the Gemma assistant.
//!
//! Holds the conversation model, the shared error type and the traits the
//! other layers implement: topic persistence, model access and the host
//! capability interface.

pub mod config;
pub mod error;
pub mod event;
pub mod host;
pub mod model_client;
pub mod topic;

// Re-export common types
pub use config::AssistantConfig;
pub use error::{AssistantError, Result};
pub use event::{ControllerEvent, PanelEvent};
pub use model_client::ModelClient;
pub use topic::{ChatMessage, ChatTopic, TopicRepository};

//! Chat topic domain module.
//!
//! This module contains the conversation data model and the repository
//! interface used to persist it.
//!
//! # Module Structure
//!
//! - `message`: A single transcript entry (`ChatMessage`)
//! - `model`: A named conversation thread (`ChatTopic`), the whole store
//!   (`ChatHistory`) and id allocation
//! - `repository`: Persistence contract (`TopicRepository`)

mod message;
mod model;
mod repository;

// Re-export public API
pub use message::ChatMessage;
pub use model::{ChatHistory, ChatTopic, TopicState, WELCOME_TOPIC_NAME, next_topic_id};
pub use repository::TopicRepository;

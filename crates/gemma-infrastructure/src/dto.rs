//! Data Transfer Objects (DTOs) for persistence.
//!
//! These DTOs represent the versioned schema of `chats.json`. They are private
//! to the infrastructure layer and absorb the evolution of the storage format
//! so the domain types stay free of compatibility baggage.
//!
//! ## Schema Versioning (Semantic Versioning)
//!
//! - **MAJOR (X.0.0)**: Breaking changes (document shape, field removal)
//! - **MINOR (2.X.0)**: Backward-compatible additions (new optional fields)
//!
//! ### Chat History Version History
//! - **1.0.0**: Bare JSON array of topics (no version field)
//! - **2.0.0**: Flat versioned object `{ "version": "2.0.0", "topics": [...] }`

use gemma_core::error::{AssistantError, Result};
use gemma_core::topic::{ChatHistory, ChatMessage, ChatTopic};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use version_migrate::{FromDomain, IntoDomain, MigratesTo, Migrator, Versioned};

/// Entity name the chat history is registered under.
pub const CHAT_HISTORY_ENTITY: &str = "chat_history";

/// Schema version of the legacy bare-array document.
pub const CHAT_HISTORY_V1_VERSION: &str = "1.0.0";

/// Key the flat format stores the schema version under.
const VERSION_KEY: &str = "version";

// ============================================================================
// Topic DTOs (unchanged since 1.0.0)
// ============================================================================

/// Persisted form of a transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageV1 {
    pub text: String,
    pub is_user: bool,
    #[serde(default)]
    pub is_error: bool,
    #[serde(default)]
    pub time: String,
}

/// Persisted form of a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTopicV1 {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub messages: Vec<ChatMessageV1>,
    #[serde(default)]
    pub created_at: String,
}

// ============================================================================
// ChatHistory DTOs
// ============================================================================

/// Chat history V1.0.0: topics stored as a bare array, before versioning.
///
/// Never written any more. A bare array is wrapped into this shape
/// before it reaches the migrator (see [`versioned_document`]).
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct ChatHistoryV1_0_0 {
    pub topics: Vec<ChatTopicV1>,
}

/// Chat history V2.0.0: the versioned document.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "2.0.0")]
pub struct ChatHistoryV2_0_0 {
    pub topics: Vec<ChatTopicV1>,
}

// ============================================================================
// Migration implementations
// ============================================================================

/// V1.0.0 → V2.0.0 only adds the version envelope; topics carry over as-is.
impl MigratesTo<ChatHistoryV2_0_0> for ChatHistoryV1_0_0 {
    fn migrate(self) -> ChatHistoryV2_0_0 {
        ChatHistoryV2_0_0 {
            topics: self.topics,
        }
    }
}

// ============================================================================
// Domain model conversions
// ============================================================================

impl IntoDomain<ChatHistory> for ChatHistoryV2_0_0 {
    fn into_domain(self) -> ChatHistory {
        ChatHistory {
            topics: self.topics.into_iter().map(ChatTopic::from).collect(),
        }
    }
}

impl FromDomain<ChatHistory> for ChatHistoryV2_0_0 {
    fn from_domain(history: ChatHistory) -> Self {
        ChatHistoryV2_0_0 {
            topics: history.topics.iter().map(ChatTopicV1::from).collect(),
        }
    }
}

impl From<&ChatMessage> for ChatMessageV1 {
    fn from(message: &ChatMessage) -> Self {
        Self {
            text: message.text.clone(),
            is_user: message.is_user,
            is_error: message.is_error,
            time: message.time.clone(),
        }
    }
}

impl From<ChatMessageV1> for ChatMessage {
    fn from(dto: ChatMessageV1) -> Self {
        ChatMessage {
            text: dto.text,
            is_user: dto.is_user,
            is_error: dto.is_error,
            time: dto.time,
        }
    }
}

impl From<&ChatTopic> for ChatTopicV1 {
    fn from(topic: &ChatTopic) -> Self {
        Self {
            id: topic.id.clone(),
            name: topic.name.clone(),
            messages: topic.messages.iter().map(ChatMessageV1::from).collect(),
            created_at: topic.created_at.clone(),
        }
    }
}

impl From<ChatTopicV1> for ChatTopic {
    fn from(dto: ChatTopicV1) -> Self {
        ChatTopic {
            id: dto.id,
            name: dto.name,
            messages: dto.messages.into_iter().map(ChatMessage::from).collect(),
            created_at: dto.created_at,
        }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates and configures a Migrator instance for the chat history.
///
/// # Migration Path
///
/// - V1.0.0 → V2.0.0: Wraps the bare topic array in a versioned object
/// - V2.0.0 → ChatHistory: Converts DTO to domain model
///
/// Any version not on this path, including a newer major, fails to load.
pub fn create_chat_history_migrator() -> Result<Migrator> {
    let mut migrator = Migrator::builder().build();

    let history_path = Migrator::define(CHAT_HISTORY_ENTITY)
        .from::<ChatHistoryV1_0_0>()
        .step::<ChatHistoryV2_0_0>()
        .into_with_save::<ChatHistory>();

    migrator.register(history_path).map_err(|e| {
        AssistantError::migration(format!("Failed to register chat_history migration path: {}", e))
    })?;

    Ok(migrator)
}

/// Maps a bare topic array onto the V1.0.0 entry; versioned objects pass through.
pub fn versioned_document(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Array(topics) => {
            tracing::info!(
                "Migrating legacy chat array ({} topics) from V{}",
                topics.len(),
                CHAT_HISTORY_V1_VERSION
            );
            let mut document = serde_json::Map::new();
            document.insert(VERSION_KEY.to_string(), JsonValue::from(CHAT_HISTORY_V1_VERSION));
            document.insert("topics".to_string(), JsonValue::Array(topics));
            JsonValue::Object(document)
        }
        other => other,
    }
}

/// Loads any registered document version into the domain model.
pub fn load_chat_history(migrator: &Migrator, value: JsonValue) -> Result<ChatHistory> {
    migrator
        .load_flat_from(CHAT_HISTORY_ENTITY, versioned_document(value))
        .map_err(|e| AssistantError::migration(format!("Failed to migrate chat history: {}", e)))
}

/// Serializes the domain model as the latest flat versioned document.
pub fn save_chat_history(migrator: &Migrator, history: ChatHistory) -> Result<JsonValue> {
    let json_str = migrator
        .save_domain_flat(CHAT_HISTORY_ENTITY, history)
        .map_err(|e| AssistantError::Serialization {
            format: "JSON".to_string(),
            message: format!("Failed to serialize chat history: {}", e),
        })?;
    Ok(serde_json::from_str(&json_str)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn migrator() -> Migrator {
        create_chat_history_migrator().unwrap()
    }

    #[test]
    fn test_legacy_array_is_migrated() {
        let legacy = json!([
            {
                "id": "1712000000000",
                "name": "Welcome",
                "messages": [
                    {"text": "hello", "isUser": true, "isError": false, "time": "09:15"}
                ],
                "createdAt": "2024-04-01T19:33:20.000Z"
            }
        ]);

        let history = load_chat_history(&migrator(), legacy).unwrap();

        assert_eq!(history.topics.len(), 1);
        assert_eq!(history.topics[0].name, "Welcome");
        assert!(history.topics[0].messages[0].is_user);
    }

    #[test]
    fn test_saved_document_is_flat_and_versioned() {
        let mut topic = ChatTopic::new("5", "Rust");
        topic.append(ChatMessage::user("hello"));
        topic.append(ChatMessage::assistant("hi"));
        let history = ChatHistory {
            topics: vec![topic],
        };

        let value = save_chat_history(&migrator(), history.clone()).unwrap();
        assert_eq!(value[VERSION_KEY], "2.0.0");
        assert_eq!(value["topics"][0]["messages"][1]["isUser"], false);

        assert_eq!(load_chat_history(&migrator(), value).unwrap(), history);
    }

    #[test]
    fn test_newer_major_version_is_rejected() {
        let value = json!({"version": "3.0.0", "topics": []});
        let err = load_chat_history(&migrator(), value).unwrap_err();
        assert!(matches!(err, AssistantError::Migration(_)));
    }

    #[test]
    fn test_missing_version_is_rejected() {
        assert!(load_chat_history(&migrator(), json!({"topics": []})).is_err());
    }

    #[test]
    fn test_scalar_root_is_rejected() {
        assert!(load_chat_history(&migrator(), json!("chats")).is_err());
    }
}

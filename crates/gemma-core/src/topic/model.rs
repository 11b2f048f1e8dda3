//! Chat topic domain model.

use super::message::ChatMessage;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Name of the topic seeded into an empty store.
pub const WELCOME_TOPIC_NAME: &str = "Welcome";

/// A named, independently persisted conversation thread.
///
/// `id` is unique for the lifetime of the store. `messages` only grows,
/// except through [`ChatTopic::reset`], which replaces the whole transcript
/// with an empty one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTopic {
    /// Time-derived unique identifier (decimal Unix milliseconds)
    pub id: String,
    /// Human-readable topic name
    pub name: String,
    /// Chronological transcript
    pub messages: Vec<ChatMessage>,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
}

/// Every topic in the store, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatHistory {
    pub topics: Vec<ChatTopic>,
}

/// Per-topic transcript state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicState {
    Empty,
    HasMessages,
}

impl ChatTopic {
    /// Creates an empty topic stamped with the current time.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            messages: Vec::new(),
            created_at: Utc::now().to_rfc3339(),
        }
    }

    /// Appends a message to the end of the transcript.
    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Replaces the transcript with an empty one.
    pub fn reset(&mut self) {
        self.messages = Vec::new();
    }

    /// `Empty` after creation or a reset, `HasMessages` after any append.
    pub fn state(&self) -> TopicState {
        if self.messages.is_empty() {
            TopicState::Empty
        } else {
            TopicState::HasMessages
        }
    }
}

/// Allocates an id for a new topic.
///
/// The id is the creation time in Unix milliseconds. When that value is
/// already taken (two topics created within the same millisecond, or a clock
/// that went backwards), the next integer above the largest numeric id in
/// `existing` is used instead.
pub fn next_topic_id(existing: &[ChatTopic], now_millis: i64) -> String {
    let taken = |candidate: &str| existing.iter().any(|topic| topic.id == candidate);

    let candidate = now_millis.to_string();
    if !taken(&candidate) {
        return candidate;
    }

    let highest = existing
        .iter()
        .filter_map(|topic| topic.id.parse::<i64>().ok())
        .max()
        .unwrap_or(now_millis);

    let mut next = highest.max(now_millis).saturating_add(1);
    while taken(&next.to_string()) {
        next = next.saturating_add(1);
    }
    next.to_string()
}

//! Panel ↔ controller message contract.
//!
//! Both directions are tagged records with a `type` discriminator and
//! camelCase payload fields, so a web-based panel can exchange them as plain
//! JSON.

use serde::{Deserialize, Serialize};

use crate::topic::{ChatMessage, ChatTopic};

/// Events a panel sends to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PanelEvent {
    /// The user submitted a message. Without a topic id the active topic is used.
    SendMessage {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        topic_id: Option<String>,
        text: String,
    },
    /// The panel asks for its copy of a transcript to be persisted.
    SaveChat {
        topic_id: String,
        messages: Vec<ChatMessage>,
    },
    /// Create a new topic with the given (already validated) name.
    CreateTopic { name: String },
    /// Clear a topic's transcript. Only sent after the user confirmed.
    ResetChat { topic_id: String },
    /// Show a topic, or just bring the panel forward when no id is given.
    OpenChat {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        topic_id: Option<String>,
    },
}

/// Events the controller sends back to a panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ControllerEvent {
    /// A model reply for `topic_id`.
    Response { topic_id: String, text: String },
    /// A failed generation request; `text` carries the remediation hint.
    Error { topic_id: String, text: String },
    /// A topic was created and should become the active one.
    TopicCreated { topic: ChatTopic },
    /// A topic's transcript was cleared.
    ChatReset { topic_id: String },
    /// The panel should render `topic`.
    SwitchTopic { topic: ChatTopic },
}

impl ControllerEvent {
    /// Returns `true` for the events that settle an outstanding request.
    pub fn settles_request(&self) -> bool {
        matches!(self, Self::Response { .. } | Self::Error { .. })
    }
}

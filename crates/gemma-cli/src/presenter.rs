//! Terminal rendition of the chat panel.
//!
//! `PanelPresenter` keeps its own copy of what the user sees: the topic list,
//! the active topic and the transcripts it has been shown. It turns user
//! actions into `PanelEvent`s and folds `ControllerEvent`s back into its view.
//! It never talks to the controller itself.

use colored::Colorize;
use gemma_application::ControllerSnapshot;
use gemma_core::topic::{ChatMessage, ChatTopic};
use gemma_core::{ControllerEvent, PanelEvent};
use std::collections::HashMap;

pub const TYPING_INDICATOR: &str = "Gemma is typing...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicOption {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Default)]
pub struct PanelPresenter {
    topics: Vec<TopicOption>,
    active_topic_id: Option<String>,
    transcripts: HashMap<String, Vec<ChatMessage>>,
    /// Sends still waiting for a reply or an error.
    outstanding: usize,
}

impl PanelPresenter {
    /// Builds the initial view from the controller's state.
    pub fn from_snapshot(snapshot: &ControllerSnapshot) -> Self {
        let mut presenter = Self::default();
        for topic in &snapshot.topics {
            presenter.upsert_topic(topic);
        }
        presenter.active_topic_id = snapshot.active_topic_id.clone();
        presenter
    }

    pub fn active_topic_id(&self) -> Option<&str> {
        self.active_topic_id.as_deref()
    }

    pub fn active_topic_name(&self) -> Option<&str> {
        let id = self.active_topic_id.as_deref()?;
        self.topics
            .iter()
            .find(|topic| topic.id == id)
            .map(|topic| topic.name.as_str())
    }

    pub fn topics(&self) -> &[TopicOption] {
        &self.topics
    }

    pub fn is_typing(&self) -> bool {
        self.outstanding > 0
    }

    /// Messages currently shown for the active topic.
    pub fn transcript(&self) -> &[ChatMessage] {
        self.active_topic_id
            .as_ref()
            .and_then(|id| self.transcripts.get(id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // ============================================================================
    // User actions
    // ============================================================================

    /// Echoes `text` into the transcript and shows the typing indicator.
    ///
    /// Blank input produces no event.
    pub fn submit(&mut self, text: &str) -> Option<PanelEvent> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let topic_id = self.active_topic_id.clone()?;

        self.transcripts
            .entry(topic_id.clone())
            .or_default()
            .push(ChatMessage::user(text));
        self.outstanding += 1;

        Some(PanelEvent::SendMessage {
            topic_id: Some(topic_id),
            text: text.to_string(),
        })
    }

    /// A cancelled prompt (`None`) or a blank name creates nothing.
    pub fn request_new_topic(&self, name: Option<&str>) -> Option<PanelEvent> {
        let name = name?.trim();
        if name.is_empty() {
            return None;
        }
        Some(PanelEvent::CreateTopic {
            name: name.to_string(),
        })
    }

    /// Only a confirmed reset is dispatched.
    pub fn request_reset(&self, confirmed: bool) -> Option<PanelEvent> {
        if !confirmed {
            return None;
        }
        Some(PanelEvent::ResetChat {
            topic_id: self.active_topic_id.clone()?,
        })
    }

    pub fn select_topic(&self, topic_id: &str) -> Option<PanelEvent> {
        self.topics
            .iter()
            .any(|topic| topic.id == topic_id)
            .then(|| PanelEvent::OpenChat {
                topic_id: Some(topic_id.to_string()),
            })
    }

    /// Asks for the shown transcript of the active topic to be persisted.
    pub fn save(&self) -> Option<PanelEvent> {
        Some(PanelEvent::SaveChat {
            topic_id: self.active_topic_id.clone()?,
            messages: self.transcript().to_vec(),
        })
    }

    /// Resolves a 1-based list position, a topic id or a topic name
    /// (case-insensitive), in that order.
    pub fn resolve_topic(&self, reference: &str) -> Option<String> {
        let reference = reference.trim();
        if let Ok(position) = reference.parse::<usize>() {
            if let Some(topic) = position.checked_sub(1).and_then(|i| self.topics.get(i)) {
                return Some(topic.id.clone());
            }
        }
        self.topics
            .iter()
            .find(|topic| topic.id == reference)
            .or_else(|| {
                self.topics
                    .iter()
                    .find(|topic| topic.name.eq_ignore_ascii_case(reference))
            })
            .map(|topic| topic.id.clone())
    }

    // ============================================================================
    // Controller events
    // ============================================================================

    /// Folds a controller event into the view. Each reply or error settles
    /// one outstanding send; the indicator stays up while others remain.
    pub fn apply(&mut self, event: &ControllerEvent) {
        if event.settles_request() {
            self.outstanding = self.outstanding.saturating_sub(1);
        }

        match event {
            ControllerEvent::Response { topic_id, text } => {
                self.transcripts
                    .entry(topic_id.clone())
                    .or_default()
                    .push(ChatMessage::assistant(text.clone()));
            }
            ControllerEvent::Error { topic_id, text } => {
                self.transcripts
                    .entry(topic_id.clone())
                    .or_default()
                    .push(ChatMessage::error(text.clone()));
            }
            ControllerEvent::TopicCreated { topic } => {
                self.upsert_topic(topic);
                self.active_topic_id = Some(topic.id.clone());
            }
            ControllerEvent::ChatReset { topic_id } => {
                self.transcripts.insert(topic_id.clone(), Vec::new());
            }
            ControllerEvent::SwitchTopic { topic } => {
                self.upsert_topic(topic);
                self.active_topic_id = Some(topic.id.clone());
            }
        }
    }

    fn upsert_topic(&mut self, topic: &ChatTopic) {
        match self.topics.iter_mut().find(|option| option.id == topic.id) {
            Some(option) => option.name = topic.name.clone(),
            None => self.topics.push(TopicOption {
                id: topic.id.clone(),
                name: topic.name.clone(),
            }),
        }
        self.transcripts
            .insert(topic.id.clone(), topic.messages.clone());
    }

    // ============================================================================
    // Rendering
    // ============================================================================

    /// The active transcript, one line block per message.
    pub fn render_transcript(&self) -> String {
        let mut out = String::new();
        let title = self.active_topic_name().unwrap_or("(no topic)");
        out.push_str(&format!("=== {} ===", title).bright_magenta().bold().to_string());
        out.push('\n');

        let transcript = self.transcript();
        if transcript.is_empty() {
            out.push_str(&"No messages yet.".bright_black().to_string());
            out.push('\n');
        }
        for message in transcript {
            out.push_str(&render_message(message));
            out.push('\n');
        }
        if self.is_typing() {
            out.push_str(&TYPING_INDICATOR.bright_black().italic().to_string());
            out.push('\n');
        }
        out
    }

    /// Numbered topic list; the active topic is starred.
    pub fn render_topics(&self) -> String {
        let mut out = String::new();
        for (index, topic) in self.topics.iter().enumerate() {
            let marker = if self.active_topic_id.as_deref() == Some(topic.id.as_str()) {
                "*"
            } else {
                " "
            };
            let count = self.transcripts.get(&topic.id).map_or(0, Vec::len);
            let line = format!("{} {}. {} ({} messages)", marker, index + 1, topic.name, count);
            if marker == "*" {
                out.push_str(&line.bright_green().to_string());
            } else {
                out.push_str(&line);
            }
            out.push('\n');
        }
        out
    }
}

/// Formats one transcript entry.
pub fn render_message(message: &ChatMessage) -> String {
    if message.is_user {
        format!("[{}] You: {}", message.time, message.text)
            .green()
            .to_string()
    } else if message.is_error {
        format!("[{}] {}", message.time, message.text)
            .red()
            .to_string()
    } else {
        format!("[{}] Gemma: {}", message.time, message.text)
            .bright_blue()
            .to_string()
    }
}

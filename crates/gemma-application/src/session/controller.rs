use super::transcript::{Reconciliation, reconcile};
use chrono::Utc;
use gemma_core::event::{ControllerEvent, PanelEvent};
use gemma_core::host::{Host, NotificationLevel, Panel};
use gemma_core::model_client::ModelClient;
use gemma_core::topic::{ChatMessage, ChatTopic, TopicRepository, WELCOME_TOPIC_NAME, next_topic_id};
use gemma_interaction::remediation_text;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Title of the chat panel created through the host.
pub const PANEL_TITLE: &str = "Gemma Chat";

/// Warning shown when a saved transcript would rewrite stored history.
pub const TRANSCRIPT_DIVERGED: &str = "Chat history changed elsewhere; kept the stored copy";

/// Topic list and active topic, as needed for a first render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSnapshot {
    pub topics: Vec<ChatTopic>,
    pub active_topic_id: Option<String>,
}

impl ControllerSnapshot {
    /// The active topic, if any.
    pub fn active_topic(&self) -> Option<&ChatTopic> {
        let id = self.active_topic_id.as_deref()?;
        self.topics.iter().find(|topic| topic.id == id)
    }
}

#[derive(Debug)]
struct SessionState {
    topics: Vec<ChatTopic>,
    active_topic_id: Option<String>,
}

impl SessionState {
    fn find_mut(&mut self, topic_id: &str) -> Option<&mut ChatTopic> {
        self.topics.iter_mut().find(|topic| topic.id == topic_id)
    }

    fn find(&self, topic_id: &str) -> Option<&ChatTopic> {
        self.topics.iter().find(|topic| topic.id == topic_id)
    }
}

/// Owns the in-memory topic list and mediates between a panel, the topic
/// store and the model client.
///
/// `SessionController` is responsible for:
/// - Seeding a `Welcome` topic when the store is empty
/// - Appending user messages, replies and error entries
/// - Creating and resetting topics
/// - Tracking which topic the panel shows
/// - Holding the (at most one) open panel
///
/// Every mutation is flushed to the store in full before the matching event
/// is emitted. The state lock is never held across the model request, so
/// other events are processed while a reply is outstanding.
pub struct SessionController {
    /// Persistence backend (never raises)
    repository: Arc<dyn TopicRepository>,
    /// Inference endpoint
    client: Arc<dyn ModelClient>,
    /// Topics and active topic
    state: Mutex<SessionState>,
    /// Currently open panel, cleared on disposal
    panel: RwLock<Option<Arc<dyn Panel>>>,
    /// Host used for error notifications
    host: RwLock<Option<Arc<dyn Host>>>,
}

impl SessionController {
    /// Loads topics from `repository`, seeding a `Welcome` topic when the
    /// store is empty. The first topic becomes active.
    ///
    /// The seed lives in memory until the first mutation flushes the store.
    /// An empty load may stand for an unreadable document, which must stay on
    /// disk untouched until the user changes something.
    pub fn new(repository: Arc<dyn TopicRepository>, client: Arc<dyn ModelClient>) -> Self {
        let mut topics = repository.load();
        if topics.is_empty() {
            let welcome = ChatTopic::new(
                next_topic_id(&topics, Utc::now().timestamp_millis()),
                WELCOME_TOPIC_NAME,
            );
            tracing::info!("Seeding empty store with '{}' topic", WELCOME_TOPIC_NAME);
            topics.push(welcome);
        }

        let active_topic_id = topics.first().map(|topic| topic.id.clone());
        tracing::debug!("Session controller ready with {} topics", topics.len());

        Self {
            repository,
            client,
            state: Mutex::new(SessionState {
                topics,
                active_topic_id,
            }),
            panel: RwLock::new(None),
            host: RwLock::new(None),
        }
    }

    /// Sets the host that receives error notifications.
    pub async fn attach_host(&self, host: Arc<dyn Host>) {
        *self.host.write().await = Some(host);
    }

    /// Returns the topic list and active topic id.
    pub async fn snapshot(&self) -> ControllerSnapshot {
        let state = self.state.lock().await;
        ControllerSnapshot {
            topics: state.topics.clone(),
            active_topic_id: state.active_topic_id.clone(),
        }
    }

    /// Returns a copy of one topic.
    pub async fn topic(&self, topic_id: &str) -> Option<ChatTopic> {
        self.state.lock().await.find(topic_id).cloned()
    }

    /// Returns `true` while a panel is attached.
    pub async fn has_panel(&self) -> bool {
        self.panel.read().await.is_some()
    }

    // ============================================================================
    // Panel lifecycle
    // ============================================================================

    /// Creates the panel through `host` on first call, otherwise reveals it.
    ///
    /// When `topic_id` names a known topic it becomes active and a
    /// `switchTopic` event is emitted.
    pub async fn open_panel(&self, host: Arc<dyn Host>, topic_id: Option<&str>) {
        {
            let mut panel = self.panel.write().await;
            match panel.as_ref() {
                Some(existing) => existing.reveal(),
                None => {
                    tracing::info!("Opening chat panel");
                    *panel = Some(host.create_panel(PANEL_TITLE));
                }
            }
        }

        {
            let mut attached = self.host.write().await;
            if attached.is_none() {
                *attached = Some(host);
            }
        }

        if let Some(topic_id) = topic_id {
            self.switch_topic(topic_id).await;
        }
    }

    /// Forgets the panel. Later events are discarded until a new one opens.
    pub async fn panel_disposed(&self) {
        if self.panel.write().await.take().is_some() {
            tracing::info!("Chat panel disposed");
        }
    }

    // ============================================================================
    // Inbound events
    // ============================================================================

    /// Dispatches one panel event.
    pub async fn handle(&self, event: PanelEvent) {
        match event {
            PanelEvent::SendMessage { topic_id, text } => {
                self.send_message(topic_id.as_deref(), &text).await;
            }
            PanelEvent::SaveChat { topic_id, messages } => {
                self.save_chat(&topic_id, messages).await;
            }
            PanelEvent::CreateTopic { name } => {
                self.create_topic(&name).await;
            }
            PanelEvent::ResetChat { topic_id } => {
                self.reset_topic(&topic_id).await;
            }
            PanelEvent::OpenChat { topic_id: Some(id) } => {
                self.switch_topic(&id).await;
            }
            PanelEvent::OpenChat { topic_id: None } => {
                if let Some(panel) = self.panel.read().await.as_ref() {
                    panel.reveal();
                }
            }
        }
    }

    /// Appends `text` as a user message, asks the model, then appends the
    /// reply (or an error entry) to the same topic.
    ///
    /// Without `topic_id` the active topic is used. The user message is stored
    /// before the request is issued. Replies to overlapping sends are appended
    /// in arrival order.
    ///
    /// Returns the emitted event, or `None` when the topic is unknown.
    pub async fn send_message(&self, topic_id: Option<&str>, text: &str) -> Option<ControllerEvent> {
        let topic_id = {
            let mut state = self.state.lock().await;
            let Some(topic_id) = topic_id
                .map(str::to_string)
                .or_else(|| state.active_topic_id.clone())
            else {
                tracing::warn!("sendMessage without a topic and no active topic");
                return None;
            };

            let Some(topic) = state.find_mut(&topic_id) else {
                tracing::warn!("sendMessage for unknown topic '{}' ignored", topic_id);
                return None;
            };
            topic.append(ChatMessage::user(text));
            self.repository.save(&state.topics);
            topic_id
        };

        tracing::debug!(topic_id = %topic_id, "Requesting model reply");
        let outcome = self.client.generate(text).await;

        let mut failure = None;
        let event = {
            let mut state = self.state.lock().await;
            let Some(topic) = state.find_mut(&topic_id) else {
                tracing::warn!("Topic '{}' vanished while awaiting reply", topic_id);
                return None;
            };

            let event = match outcome {
                Ok(reply) => {
                    topic.append(ChatMessage::assistant(reply.clone()));
                    ControllerEvent::Response {
                        topic_id: topic_id.clone(),
                        text: reply,
                    }
                }
                Err(err) => {
                    let message = err.to_string();
                    tracing::warn!(topic_id = %topic_id, "Model request failed: {}", message);
                    let remediation = remediation_text(&message, self.client.endpoint());
                    topic.append(ChatMessage::error(remediation.clone()));
                    failure = Some(message);
                    ControllerEvent::Error {
                        topic_id: topic_id.clone(),
                        text: remediation,
                    }
                }
            };
            self.repository.save(&state.topics);
            event
        };

        self.emit(event.clone()).await;
        if let Some(message) = failure {
            self.notify(NotificationLevel::Error, &message).await;
        }
        Some(event)
    }

    /// Creates a topic named `name` and makes it active.
    ///
    /// Blank names are rejected without any mutation.
    pub async fn create_topic(&self, name: &str) -> Option<ChatTopic> {
        let name = name.trim();
        if name.is_empty() {
            tracing::warn!("createTopic with empty name ignored");
            return None;
        }

        let topic = {
            let mut state = self.state.lock().await;
            let id = next_topic_id(&state.topics, Utc::now().timestamp_millis());
            let topic = ChatTopic::new(id, name);
            state.topics.push(topic.clone());
            state.active_topic_id = Some(topic.id.clone());
            self.repository.save(&state.topics);
            topic
        };

        tracing::info!(topic_id = %topic.id, "Created topic '{}'", topic.name);
        self.emit(ControllerEvent::TopicCreated {
            topic: topic.clone(),
        })
        .await;
        Some(topic)
    }

    /// Clears the transcript of `topic_id`. Returns `false` for unknown topics.
    pub async fn reset_topic(&self, topic_id: &str) -> bool {
        {
            let mut state = self.state.lock().await;
            let Some(topic) = state.find_mut(topic_id) else {
                tracing::warn!("resetChat for unknown topic '{}' ignored", topic_id);
                return false;
            };
            topic.reset();
            self.repository.save(&state.topics);
        }

        tracing::info!(topic_id = %topic_id, "Reset topic");
        self.emit(ControllerEvent::ChatReset {
            topic_id: topic_id.to_string(),
        })
        .await;
        true
    }

    /// Makes `topic_id` active and asks the panel to render it. Nothing is persisted.
    pub async fn switch_topic(&self, topic_id: &str) -> Option<ChatTopic> {
        let topic = {
            let mut state = self.state.lock().await;
            let Some(topic) = state.find(topic_id).cloned() else {
                tracing::warn!("switchTopic to unknown topic '{}' ignored", topic_id);
                return None;
            };
            state.active_topic_id = Some(topic.id.clone());
            topic
        };

        self.emit(ControllerEvent::SwitchTopic {
            topic: topic.clone(),
        })
        .await;
        Some(topic)
    }

    /// Merges a panel-held transcript into `topic_id`.
    ///
    /// Messages beyond the stored transcript are appended; a copy that
    /// rewrites stored history is rejected with a host warning. The store is
    /// flushed either way.
    pub async fn save_chat(&self, topic_id: &str, messages: Vec<ChatMessage>) -> Reconciliation {
        let outcome = {
            let mut state = self.state.lock().await;
            let Some(topic) = state.find_mut(topic_id) else {
                tracing::warn!("saveChat for unknown topic '{}' ignored", topic_id);
                return Reconciliation::Diverged;
            };

            let outcome = reconcile(&topic.messages, &messages);
            match &outcome {
                Reconciliation::Append(extra) => {
                    tracing::debug!(topic_id = %topic_id, "saveChat appends {} messages", extra.len());
                    for message in extra {
                        topic.append(message.clone());
                    }
                }
                Reconciliation::UpToDate => {}
                Reconciliation::Diverged => {
                    tracing::warn!(
                        topic_id = %topic_id,
                        "saveChat transcript rewrites stored history; keeping stored copy"
                    );
                }
            }
            self.repository.save(&state.topics);
            outcome
        };

        if outcome == Reconciliation::Diverged {
            self.notify(NotificationLevel::Warning, TRANSCRIPT_DIVERGED).await;
        }
        outcome
    }

    // ============================================================================
    // Outbound delivery
    // ============================================================================

    async fn emit(&self, event: ControllerEvent) {
        match self.panel.read().await.as_ref() {
            Some(panel) => panel.post(event),
            None => tracing::debug!("No panel attached; discarding {:?}", event),
        }
    }

    async fn notify(&self, level: NotificationLevel, message: &str) {
        if let Some(host) = self.host.read().await.as_ref() {
            host.show_notification(level, message);
        }
    }
}

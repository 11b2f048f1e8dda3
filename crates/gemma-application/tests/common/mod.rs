#![allow(dead_code)]

use async_trait::async_trait;
use gemma_core::error::{AssistantError, Result};
use gemma_core::host::{Host, HostCommand, NotificationLevel, Panel, TextEditor};
use gemma_core::{ChatTopic, ControllerEvent, ModelClient, TopicRepository};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

pub const STUB_ENDPOINT: &str = "http://localhost:11434";

// ============================================================================
// Model clients
// ============================================================================

/// Always answers with the same text and records every prompt.
pub struct ScriptedClient {
    reply: String,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }

    fn endpoint(&self) -> &str {
        STUB_ENDPOINT
    }
}

/// Fails every request the way an unreachable service would.
pub struct FailingClient;

#[async_trait]
impl ModelClient for FailingClient {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(AssistantError::model_unavailable(
            "Failed to communicate with Ollama: connection refused",
        ))
    }

    fn endpoint(&self) -> &str {
        STUB_ENDPOINT
    }
}

/// Holds each request until the test releases it through a oneshot sender.
pub struct GatedClient {
    gates: Mutex<HashMap<String, oneshot::Receiver<Result<String>>>>,
}

impl GatedClient {
    pub fn new() -> Self {
        Self {
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a gate for `prompt`; sending on the returned handle completes the request.
    pub fn gate(&self, prompt: &str) -> oneshot::Sender<Result<String>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(prompt.to_string(), rx);
        tx
    }
}

#[async_trait]
impl ModelClient for GatedClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let gate = self.gates.lock().unwrap().remove(prompt);
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(AssistantError::internal("gate dropped"))),
            None => Err(AssistantError::internal(format!("no gate for {prompt}"))),
        }
    }

    fn endpoint(&self) -> &str {
        STUB_ENDPOINT
    }
}

// ============================================================================
// Storage
// ============================================================================

/// In-memory store that counts flushes.
#[derive(Default)]
pub struct MemoryRepository {
    pub topics: Mutex<Vec<ChatTopic>>,
    pub saves: AtomicUsize,
}

impl MemoryRepository {
    pub fn with_topics(topics: Vec<ChatTopic>) -> Self {
        Self {
            topics: Mutex::new(topics),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn stored(&self) -> Vec<ChatTopic> {
        self.topics.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl TopicRepository for MemoryRepository {
    fn load(&self) -> Vec<ChatTopic> {
        self.stored()
    }

    fn save(&self, topics: &[ChatTopic]) {
        *self.topics.lock().unwrap() = topics.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Host
// ============================================================================

#[derive(Default)]
pub struct RecordingPanel {
    pub events: Mutex<Vec<ControllerEvent>>,
    pub reveals: AtomicUsize,
}

impl RecordingPanel {
    pub fn events(&self) -> Vec<ControllerEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Panel for RecordingPanel {
    fn post(&self, event: ControllerEvent) {
        self.events.lock().unwrap().push(event);
    }

    fn reveal(&self) {
        self.reveals.fetch_add(1, Ordering::SeqCst);
    }
}

/// Editor with a fixed selection that records replacements.
pub struct MemoryEditor {
    pub selection: String,
    pub replaced: Mutex<Option<String>>,
}

impl MemoryEditor {
    pub fn new(selection: &str) -> Self {
        Self {
            selection: selection.to_string(),
            replaced: Mutex::new(None),
        }
    }

    pub fn replacement(&self) -> Option<String> {
        self.replaced.lock().unwrap().clone()
    }
}

impl TextEditor for MemoryEditor {
    fn selected_text(&self) -> String {
        self.selection.clone()
    }

    fn replace_selection(&self, replacement: &str) -> Result<()> {
        *self.replaced.lock().unwrap() = Some(replacement.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingHost {
    pub commands: Mutex<Vec<HostCommand>>,
    pub notifications: Mutex<Vec<(NotificationLevel, String)>>,
    pub inputs: Mutex<VecDeque<Option<String>>>,
    pub editor: Option<Arc<MemoryEditor>>,
    pub panel: Arc<RecordingPanel>,
    pub panels_created: AtomicUsize,
}

impl RecordingHost {
    pub fn with_editor(editor: Arc<MemoryEditor>) -> Self {
        Self {
            editor: Some(editor),
            ..Self::default()
        }
    }

    pub fn queue_input(&self, input: Option<&str>) {
        self.inputs
            .lock()
            .unwrap()
            .push_back(input.map(str::to_string));
    }

    pub fn notifications(&self) -> Vec<(NotificationLevel, String)> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn panels_created(&self) -> usize {
        self.panels_created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Host for RecordingHost {
    fn register_command(&self, command: HostCommand) {
        self.commands.lock().unwrap().push(command);
    }

    fn create_panel(&self, _title: &str) -> Arc<dyn Panel> {
        self.panels_created.fetch_add(1, Ordering::SeqCst);
        self.panel.clone()
    }

    async fn show_input(&self, _prompt: &str) -> Option<String> {
        self.inputs.lock().unwrap().pop_front().flatten()
    }

    fn show_notification(&self, level: NotificationLevel, message: &str) {
        self.notifications
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }

    fn active_editor(&self) -> Option<Arc<dyn TextEditor>> {
        self.editor
            .clone()
            .map(|editor| editor as Arc<dyn TextEditor>)
    }
}

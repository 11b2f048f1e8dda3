//! Host capabilities backed by the terminal.
//!
//! The "panel" is a channel: controller events are forwarded to the REPL's
//! printer task, which owns the presenter.

use async_trait::async_trait;
use colored::Colorize;
use gemma_core::ControllerEvent;
use gemma_core::host::{Host, HostCommand, NotificationLevel, Panel, TextEditor};
use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Forwards controller events to the printer task.
pub struct ChannelPanel {
    sender: mpsc::UnboundedSender<ControllerEvent>,
}

impl Panel for ChannelPanel {
    fn post(&self, event: ControllerEvent) {
        if self.sender.send(event).is_err() {
            tracing::debug!("Printer task gone; dropping controller event");
        }
    }

    fn reveal(&self) {}
}

pub struct TerminalHost {
    events: mpsc::UnboundedSender<ControllerEvent>,
    editor: Option<Arc<dyn TextEditor>>,
    /// Answer for the next `show_input` call, used instead of prompting.
    preset_input: Mutex<Option<String>>,
}

impl TerminalHost {
    pub fn new(events: mpsc::UnboundedSender<ControllerEvent>) -> Self {
        Self {
            events,
            editor: None,
            preset_input: Mutex::new(None),
        }
    }

    pub fn with_editor(mut self, editor: Arc<dyn TextEditor>) -> Self {
        self.editor = Some(editor);
        self
    }

    pub fn with_preset_input(self, input: Option<String>) -> Self {
        if let Ok(mut preset) = self.preset_input.lock() {
            *preset = input;
        }
        self
    }

    fn take_preset_input(&self) -> Option<String> {
        self.preset_input
            .lock()
            .ok()
            .and_then(|mut preset| preset.take())
    }
}

#[async_trait]
impl Host for TerminalHost {
    fn register_command(&self, command: HostCommand) {
        tracing::debug!("Registered command {} ({})", command, command.title());
    }

    fn create_panel(&self, title: &str) -> Arc<dyn Panel> {
        tracing::debug!("Creating terminal panel '{}'", title);
        Arc::new(ChannelPanel {
            sender: self.events.clone(),
        })
    }

    async fn show_input(&self, prompt: &str) -> Option<String> {
        if let Some(preset) = self.take_preset_input() {
            return Some(preset);
        }

        let prompt = prompt.to_string();
        let line = tokio::task::spawn_blocking(move || -> io::Result<Option<String>> {
            print!("{} ", prompt.bright_yellow());
            io::stdout().flush()?;
            let mut line = String::new();
            let read = io::stdin().lock().read_line(&mut line)?;
            Ok((read > 0).then(|| line.trim_end_matches(['\r', '\n']).to_string()))
        })
        .await;

        match line {
            Ok(Ok(line)) => line,
            Ok(Err(e)) => {
                tracing::warn!("Failed to read input: {}", e);
                None
            }
            Err(e) => {
                tracing::warn!("Input task failed: {}", e);
                None
            }
        }
    }

    fn show_notification(&self, level: NotificationLevel, message: &str) {
        match level {
            NotificationLevel::Warning => eprintln!("{}", message.yellow()),
            NotificationLevel::Error => eprintln!("{}", message.red().bold()),
        }
    }

    fn active_editor(&self) -> Option<Arc<dyn TextEditor>> {
        self.editor.clone()
    }
}

//! Host capability interface.
//!
//! The assistant never talks to a windowing system directly. Whatever front
//! end embeds it (an editor extension host, a terminal, a web page) provides
//! these capabilities.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::event::ControllerEvent;

/// Commands the assistant contributes to its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostCommand {
    /// Open the chat panel, or focus it when already open.
    StartChat,
    /// Open the chat panel on a particular topic.
    OpenChat,
    /// Rewrite the active selection with the model's suggestion.
    EditCode,
}

impl HostCommand {
    /// All commands, in registration order.
    pub const ALL: [HostCommand; 3] = [Self::StartChat, Self::OpenChat, Self::EditCode];

    /// Stable command identifier.
    pub fn id(&self) -> &'static str {
        match self {
            Self::StartChat => "gemma-assistant.startChat",
            Self::OpenChat => "gemma-assistant.openChat",
            Self::EditCode => "gemma-assistant.editCode",
        }
    }

    /// Human-readable title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::StartChat => "Start Gemma Chat",
            Self::OpenChat => "Open Chat",
            Self::EditCode => "Edit Code with Gemma",
        }
    }
}

impl fmt::Display for HostCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Severity of a transient host notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// A corrected user mistake or a rejected request; nothing was lost.
    Warning,
    Error,
}

/// A live chat panel created by the host.
pub trait Panel: Send + Sync {
    /// Delivers a controller event to the panel.
    fn post(&self, event: ControllerEvent);

    /// Brings the panel to the front.
    fn reveal(&self);
}

/// A text editor with an active selection.
pub trait TextEditor: Send + Sync {
    /// The currently selected text (may be empty).
    fn selected_text(&self) -> String;

    /// Replaces the selection with `replacement`.
    fn replace_selection(&self, replacement: &str) -> Result<()>;
}

/// Capabilities the host supplies to the assistant.
#[async_trait]
pub trait Host: Send + Sync {
    /// Makes a command available to the user.
    fn register_command(&self, command: HostCommand);

    /// Creates the chat panel. Called at most once per open panel.
    fn create_panel(&self, title: &str) -> Arc<dyn Panel>;

    /// Prompts the user for a line of text. `None` means cancelled.
    async fn show_input(&self, prompt: &str) -> Option<String>;

    /// Shows a transient notification.
    fn show_notification(&self, level: NotificationLevel, message: &str);

    /// The editor the user is currently working in, if any.
    fn active_editor(&self) -> Option<Arc<dyn TextEditor>>;
}

//! Rewrite the active selection with a model suggestion.
//!
//! The reply replaces the selection as-is. Nothing checks that it is valid
//! code, or even code at all, and there is no confirmation step. A chatty
//! reply ("Sure! Here is...") lands in the buffer verbatim.

use gemma_core::host::{Host, NotificationLevel};
use gemma_core::model_client::ModelClient;
use gemma_interaction::edit_prompt;

/// Prompt shown when asking for the edit instruction.
pub const INSTRUCTION_PROMPT: &str = "What changes would you like to make to this code?";

pub const NO_ACTIVE_EDITOR: &str = "No active editor";
pub const NO_TEXT_SELECTED: &str = "No text selected";
pub const MODEL_FAILED: &str = "Failed to get response from Ollama";

/// How an edit request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The selection now holds the model's reply.
    Replaced { replacement: String },
    NoEditor,
    EmptySelection,
    /// The user cancelled or gave a blank instruction.
    Cancelled,
    ModelFailed,
    /// The editor refused the replacement.
    ApplyFailed,
}

/// Runs the edit flow against the host's active editor.
///
/// Validation failures happen before any network call and never touch the
/// editor.
pub async fn edit_selection(host: &dyn Host, client: &dyn ModelClient) -> EditOutcome {
    let Some(editor) = host.active_editor() else {
        host.show_notification(NotificationLevel::Error, NO_ACTIVE_EDITOR);
        return EditOutcome::NoEditor;
    };

    let selected = editor.selected_text();
    if selected.trim().is_empty() {
        host.show_notification(NotificationLevel::Warning, NO_TEXT_SELECTED);
        return EditOutcome::EmptySelection;
    }

    let instruction = match host.show_input(INSTRUCTION_PROMPT).await {
        Some(instruction) if !instruction.trim().is_empty() => instruction,
        _ => {
            tracing::debug!("Edit cancelled before sending");
            return EditOutcome::Cancelled;
        }
    };

    let reply = match client.generate(&edit_prompt(&selected, &instruction)).await {
        Ok(reply) => reply,
        Err(err) => {
            tracing::warn!("Edit request failed: {}", err);
            host.show_notification(NotificationLevel::Error, MODEL_FAILED);
            return EditOutcome::ModelFailed;
        }
    };

    if let Err(err) = editor.replace_selection(&reply) {
        tracing::error!("Failed to apply edit: {}", err);
        host.show_notification(
            NotificationLevel::Error,
            &format!("Failed to apply edit: {}", err),
        );
        return EditOutcome::ApplyFailed;
    }

    tracing::info!("Replaced {} selected chars with model reply", selected.len());
    EditOutcome::Replaced { replacement: reply }
}

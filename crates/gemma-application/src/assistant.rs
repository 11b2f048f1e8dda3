//! Command registration and dispatch.

use crate::edit_selection::{EditOutcome, edit_selection};
use crate::session::SessionController;
use gemma_core::host::{Host, HostCommand};
use gemma_core::model_client::ModelClient;
use std::sync::Arc;

/// The activated assistant: the commands it contributed and the services
/// behind them.
pub struct Assistant {
    host: Arc<dyn Host>,
    controller: Arc<SessionController>,
    client: Arc<dyn ModelClient>,
}

impl Assistant {
    /// Registers every [`HostCommand`] with `host` and wires the controller to it.
    pub async fn activate(
        host: Arc<dyn Host>,
        controller: Arc<SessionController>,
        client: Arc<dyn ModelClient>,
    ) -> Self {
        for command in HostCommand::ALL {
            host.register_command(command);
        }
        controller.attach_host(host.clone()).await;
        tracing::info!("Assistant activated against {}", client.endpoint());

        Self {
            host,
            controller,
            client,
        }
    }

    pub fn controller(&self) -> &Arc<SessionController> {
        &self.controller
    }

    /// Runs `command` with no argument.
    pub async fn execute(&self, command: HostCommand) {
        self.execute_with(command, None).await;
    }

    /// Runs `command`. `topic_id` is only meaningful for `OpenChat`.
    pub async fn execute_with(&self, command: HostCommand, topic_id: Option<&str>) {
        tracing::debug!("Executing {}", command);
        match command {
            HostCommand::StartChat => {
                self.controller.open_panel(self.host.clone(), None).await;
            }
            HostCommand::OpenChat => {
                // Without an open panel this behaves like StartChat.
                let topic_id = if self.controller.has_panel().await {
                    topic_id
                } else {
                    None
                };
                self.controller.open_panel(self.host.clone(), topic_id).await;
            }
            HostCommand::EditCode => {
                self.edit_code().await;
            }
        }
    }

    /// Runs the edit-selection flow.
    pub async fn edit_code(&self) -> EditOutcome {
        edit_selection(self.host.as_ref(), self.client.as_ref()).await
    }
}

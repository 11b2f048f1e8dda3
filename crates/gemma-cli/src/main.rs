use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tokio::sync::mpsc;

use gemma_application::{Assistant, EditOutcome, SessionController, edit_selection};
use gemma_core::host::HostCommand;
use gemma_core::topic::TopicState;
use gemma_core::{AssistantConfig, ModelClient};
use gemma_infrastructure::{ConfigService, GemmaPaths, JsonTopicRepository};
use gemma_interaction::OllamaApiClient;

mod file_editor;
mod logging;
mod presenter;
mod repl;
mod terminal_host;

use file_editor::{FileSelectionEditor, LineRange};
use terminal_host::TerminalHost;

#[derive(Parser)]
#[command(name = "gemma")]
#[command(about = "Chat with a local Gemma model served by Ollama", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding chats.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Model identifier sent to Ollama
    #[arg(long, global = true)]
    model: Option<String>,

    /// Ollama base URL
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive chat (default)
    Chat {
        /// Topic id to open
        #[arg(long)]
        topic: Option<String>,
    },
    /// Rewrite a line range of a file with the model's suggestion
    Edit {
        file: PathBuf,
        /// Inclusive 1-based range, e.g. 10:24
        #[arg(long)]
        lines: LineRange,
        /// Edit instruction; prompted for when omitted
        #[arg(long)]
        instruction: Option<String>,
    },
    /// List stored topics
    Topics,
}

impl Cli {
    fn resolve_config(&self) -> Result<AssistantConfig> {
        let service = match &self.config {
            Some(path) => ConfigService::with_path(path),
            None => ConfigService::new(),
        };
        let mut config = service.load().context("Failed to load configuration")?;

        if let Some(url) = &self.url {
            config.ollama.base_url = url.clone();
        }
        if let Some(model) = &self.model {
            config.ollama.model = model.clone();
        }
        if let Some(data_dir) = &self.data_dir {
            config.storage.data_dir = Some(data_dir.clone());
        }
        Ok(config)
    }
}

fn data_dir(config: &AssistantConfig) -> Result<PathBuf> {
    match &config.storage.data_dir {
        Some(dir) => Ok(dir.clone()),
        None => GemmaPaths::data_dir().context("Failed to resolve data directory"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    let logs_dir = GemmaPaths::logs_dir().context("Failed to resolve log directory")?;
    let _guard = logging::init_logging(&logs_dir, &config.logging.level)?;
    tracing::info!(
        "gemma {} starting (model {}, endpoint {})",
        env!("CARGO_PKG_VERSION"),
        config.ollama.model,
        config.ollama.base_url
    );

    let repository = Arc::new(JsonTopicRepository::in_dir(data_dir(&config)?));

    match cli.command.unwrap_or(Commands::Chat { topic: None }) {
        Commands::Chat { topic } => run_chat(&config, repository, topic).await,
        Commands::Edit {
            file,
            lines,
            instruction,
        } => run_edit(&config, file, lines, instruction).await,
        Commands::Topics => list_topics(&repository),
    }
}

fn build_client(config: &AssistantConfig) -> Result<Arc<dyn ModelClient>> {
    Ok(Arc::new(OllamaApiClient::from_config(&config.ollama)?))
}

async fn run_chat(
    config: &AssistantConfig,
    repository: Arc<JsonTopicRepository>,
    topic: Option<String>,
) -> Result<()> {
    let client = build_client(config)?;
    let controller = Arc::new(SessionController::new(repository, client.clone()));

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let host = Arc::new(TerminalHost::new(event_tx));
    let assistant = Assistant::activate(host, controller.clone(), client).await;

    // Switch before the panel exists so the REPL's first render already shows it.
    if let Some(topic) = topic.as_deref() {
        if controller.switch_topic(topic).await.is_none() {
            eprintln!("{}", format!("No topic with id '{}'", topic).yellow());
        }
    }
    assistant.execute(HostCommand::StartChat).await;

    repl::run(controller, event_rx).await
}

async fn run_edit(
    config: &AssistantConfig,
    file: PathBuf,
    lines: LineRange,
    instruction: Option<String>,
) -> Result<()> {
    let editor = FileSelectionEditor::open(&file, lines)
        .with_context(|| format!("Cannot select {}:{} in {}", lines.start, lines.end, file.display()))?;

    let client = build_client(config)?;
    let (event_tx, _event_rx) = mpsc::unbounded_channel();
    let host = TerminalHost::new(event_tx)
        .with_editor(Arc::new(editor))
        .with_preset_input(instruction);

    match edit_selection(&host, client.as_ref()).await {
        EditOutcome::Replaced { replacement } => {
            println!(
                "{}",
                format!(
                    "Replaced lines {}:{} of {} ({} lines written)",
                    lines.start,
                    lines.end,
                    file.display(),
                    replacement.lines().count()
                )
                .bright_green()
            );
            Ok(())
        }
        EditOutcome::Cancelled => {
            println!("{}", "Edit cancelled.".bright_black());
            Ok(())
        }
        outcome => bail!("Edit did not complete: {:?}", outcome),
    }
}

fn list_topics(repository: &JsonTopicRepository) -> Result<()> {
    let topics = repository
        .try_load()
        .with_context(|| format!("Failed to read {}", repository.path().display()))?;

    if topics.is_empty() {
        println!("{}", "No topics yet.".bright_black());
        return Ok(());
    }
    for (index, topic) in topics.iter().enumerate() {
        let contents = match topic.state() {
            TopicState::Empty => "empty".to_string(),
            TopicState::HasMessages => format!("{} messages", topic.messages.len()),
        };
        println!(
            "{:>3}. {} {} {}",
            index + 1,
            topic.name.bold(),
            format!("[{}]", topic.id).bright_black(),
            format!("{}, created {}", contents, topic.created_at).bright_black()
        );
    }
    Ok(())
}

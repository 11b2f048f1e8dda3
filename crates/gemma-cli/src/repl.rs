//! Interactive chat loop.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;

use gemma_application::SessionController;
use gemma_core::ControllerEvent;

use crate::presenter::{PanelPresenter, render_message};

const COMMANDS: [&str; 7] = ["/new", "/reset", "/topics", "/switch", "/save", "/help", "/quit"];

const SWITCH_PREFIX: &str = "/switch ";

/// rustyline helper: completes slash commands and, after `/switch`, the
/// names of the topics the presenter currently lists.
#[derive(Clone)]
struct ReplHelper {
    presenter: Arc<Mutex<PanelPresenter>>,
}

impl ReplHelper {
    fn new(presenter: Arc<Mutex<PanelPresenter>>) -> Self {
        Self { presenter }
    }

    /// Candidates for the text before the cursor and the byte offset they
    /// replace from. A presenter busy with an event yields no topic names.
    fn candidates(&self, line: &str) -> (usize, Vec<String>) {
        if let Some(partial) = line.strip_prefix(SWITCH_PREFIX) {
            let names = match self.presenter.try_lock() {
                Ok(presenter) => presenter
                    .topics()
                    .iter()
                    .filter(|topic| topic.name.starts_with(partial))
                    .map(|topic| topic.name.clone())
                    .collect(),
                Err(_) => Vec::new(),
            };
            return (SWITCH_PREFIX.len(), names);
        }

        if line.starts_with('/') && !line.contains(' ') {
            let commands = COMMANDS
                .iter()
                .filter(|command| command.starts_with(line))
                .map(|command| command.to_string())
                .collect();
            return (0, commands);
        }
        (0, Vec::new())
    }
}

impl Helper for ReplHelper {}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, candidates) = self.candidates(&line[..pos]);
        let pairs = candidates
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if !line.starts_with('/') {
            return Borrowed(line);
        }
        match line.split_once(' ') {
            Some((command, rest)) => Owned(format!("{} {}", command.bright_cyan(), rest)),
            None => Owned(line.bright_cyan().to_string()),
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, line: &str, _pos: usize, _forced: bool) -> bool {
        line.starts_with('/')
    }
}

impl Hinter for ReplHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        let (start, candidates) = self.candidates(line);
        let typed = &line[start..];
        candidates
            .into_iter()
            .find(|candidate| candidate.len() > typed.len())
            .and_then(|candidate| candidate.get(typed.len()..).map(str::to_string))
    }
}

impl Validator for ReplHelper {}

/// A parsed REPL line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Send(String),
    New(Option<String>),
    Reset,
    Topics,
    Switch(String),
    Save,
    Help,
    Quit,
    Unknown(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if !line.starts_with('/') {
            return Some(Self::Send(line.to_string()));
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        let argument = (!rest.is_empty()).then(|| rest.to_string());

        Some(match command {
            "/new" => Self::New(argument),
            "/reset" => Self::Reset,
            "/topics" => Self::Topics,
            "/switch" => match argument {
                Some(target) => Self::Switch(target),
                None => Self::Unknown(line.to_string()),
            },
            "/save" => Self::Save,
            "/help" => Self::Help,
            "/quit" | "/exit" => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        })
    }
}

fn print_help() {
    println!("{}", "Type a message to chat, or use:".bright_black());
    for (command, description) in [
        ("/new [name]", "create a topic"),
        ("/reset", "clear the current topic"),
        ("/topics", "list topics"),
        ("/switch <n|name>", "show another topic"),
        ("/save", "persist the shown transcript"),
        ("/help", "show this help"),
        ("/quit", "exit"),
    ] {
        println!("  {:<16} {}", command.bright_cyan(), description.bright_black());
    }
}

/// Prints controller events as they arrive, keeping the presenter in sync.
async fn print_events(
    mut events: mpsc::UnboundedReceiver<ControllerEvent>,
    presenter: Arc<Mutex<PanelPresenter>>,
) {
    while let Some(event) = events.recv().await {
        let mut presenter = presenter.lock().await;
        presenter.apply(&event);

        match &event {
            ControllerEvent::Response { topic_id, .. } | ControllerEvent::Error { topic_id, .. } => {
                if presenter.active_topic_id() == Some(topic_id.as_str()) {
                    if let Some(message) = presenter.transcript().last() {
                        println!("{}", render_message(message));
                    }
                } else {
                    println!(
                        "{}",
                        format!("(reply arrived in another topic: {})", topic_id).bright_black()
                    );
                }
            }
            ControllerEvent::TopicCreated { topic } => {
                println!("{}", format!("Created topic '{}'", topic.name).bright_green());
            }
            ControllerEvent::ChatReset { .. } => {
                println!("{}", "Chat cleared.".bright_green());
            }
            ControllerEvent::SwitchTopic { .. } => {
                print!("{}", presenter.render_transcript());
            }
        }
    }
}

fn ask_confirmation(rl: &mut Editor<ReplHelper, DefaultHistory>, question: &str) -> bool {
    match rl.readline(question) {
        Ok(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

/// Runs the chat REPL until `/quit` or end of input.
///
/// Outstanding replies are awaited before returning so that they still land
/// in the store after the panel is gone.
pub async fn run(
    controller: Arc<SessionController>,
    events: mpsc::UnboundedReceiver<ControllerEvent>,
) -> Result<()> {
    let presenter = Arc::new(Mutex::new(PanelPresenter::from_snapshot(
        &controller.snapshot().await,
    )));
    let printer = tokio::spawn(print_events(events, presenter.clone()));

    let mut rl: Editor<ReplHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(ReplHelper::new(presenter.clone())));

    println!("{}", "=== Gemma Chat ===".bright_magenta().bold());
    print!("{}", presenter.lock().await.render_transcript());
    println!("{}", "Type /help for commands.".bright_black());

    let mut requests = JoinSet::new();

    loop {
        let line = match rl.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type /quit to exit.".yellow());
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        };

        let Some(command) = ReplCommand::parse(&line) else {
            continue;
        };
        let _ = rl.add_history_entry(line.trim());

        // Reap finished requests so the set does not grow without bound.
        while requests.try_join_next().is_some() {}

        match command {
            ReplCommand::Send(text) => {
                let event = presenter.lock().await.submit(&text);
                if let Some(event) = event {
                    let controller = controller.clone();
                    requests.spawn(async move { controller.handle(event).await });
                }
            }
            ReplCommand::New(name) => {
                let name = match name {
                    Some(name) => Some(name),
                    None => rl.readline("Topic name: ").ok(),
                };
                let event = presenter.lock().await.request_new_topic(name.as_deref());
                match event {
                    Some(event) => controller.handle(event).await,
                    None => println!("{}", "Topic creation cancelled.".bright_black()),
                }
            }
            ReplCommand::Reset => {
                let confirmed = ask_confirmation(&mut rl, "Clear this topic's transcript? (y/N) ");
                let event = presenter.lock().await.request_reset(confirmed);
                if let Some(event) = event {
                    controller.handle(event).await;
                }
            }
            ReplCommand::Topics => {
                print!("{}", presenter.lock().await.render_topics());
            }
            ReplCommand::Switch(target) => {
                let event = {
                    let presenter = presenter.lock().await;
                    presenter
                        .resolve_topic(&target)
                        .and_then(|id| presenter.select_topic(&id))
                };
                match event {
                    Some(event) => controller.handle(event).await,
                    None => println!("{}", format!("No topic '{}'", target).yellow()),
                }
            }
            ReplCommand::Save => {
                let event = presenter.lock().await.save();
                if let Some(event) = event {
                    controller.handle(event).await;
                    println!("{}", "Saved.".bright_green());
                }
            }
            ReplCommand::Help => print_help(),
            ReplCommand::Quit => break,
            ReplCommand::Unknown(line) => {
                println!("{}", format!("Unknown command: {}", line).bright_black());
            }
        }
    }

    controller.panel_disposed().await;
    if !requests.is_empty() {
        println!(
            "{}",
            format!("Waiting for {} outstanding replies...", requests.len()).bright_black()
        );
    }
    while let Some(result) = requests.join_next().await {
        if let Err(e) = result {
            tracing::warn!("Request task failed: {}", e);
        }
    }
    printer.abort();
    println!("{}", "Goodbye!".bright_green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemma_application::ControllerSnapshot;
    use gemma_core::topic::ChatTopic;

    #[test]
    fn test_plain_text_is_sent() {
        assert_eq!(
            ReplCommand::parse("  hello there "),
            Some(ReplCommand::Send("hello there".to_string()))
        );
        assert_eq!(ReplCommand::parse("   "), None);
    }

    #[test]
    fn test_new_with_and_without_name() {
        assert_eq!(
            ReplCommand::parse("/new Rust questions"),
            Some(ReplCommand::New(Some("Rust questions".to_string())))
        );
        assert_eq!(ReplCommand::parse("/new"), Some(ReplCommand::New(None)));
    }

    #[test]
    fn test_switch_requires_target() {
        assert_eq!(
            ReplCommand::parse("/switch 2"),
            Some(ReplCommand::Switch("2".to_string()))
        );
        assert!(matches!(
            ReplCommand::parse("/switch"),
            Some(ReplCommand::Unknown(_))
        ));
    }

    #[test]
    fn test_unknown_slash_command() {
        assert_eq!(
            ReplCommand::parse("/frobnicate"),
            Some(ReplCommand::Unknown("/frobnicate".to_string()))
        );
        assert_eq!(ReplCommand::parse("/quit"), Some(ReplCommand::Quit));
    }

    fn helper() -> ReplHelper {
        let snapshot = ControllerSnapshot {
            topics: vec![
                ChatTopic::new("1", "Welcome"),
                ChatTopic::new("2", "Rust questions"),
                ChatTopic::new("3", "Release notes"),
            ],
            active_topic_id: Some("1".to_string()),
        };
        ReplHelper::new(Arc::new(Mutex::new(PanelPresenter::from_snapshot(&snapshot))))
    }

    #[test]
    fn test_hint_completes_command() {
        let helper = helper();
        let history = DefaultHistory::new();
        let ctx = Context::new(&history);
        assert_eq!(helper.hint("/top", 4, &ctx), Some("ics".to_string()));
        assert_eq!(helper.hint("hello", 5, &ctx), None);
    }

    #[test]
    fn test_switch_completes_topic_names() {
        let helper = helper();

        let (start, names) = helper.candidates("/switch R");
        assert_eq!(start, SWITCH_PREFIX.len());
        assert_eq!(names, vec!["Rust questions".to_string(), "Release notes".to_string()]);

        let history = DefaultHistory::new();
        let ctx = Context::new(&history);
        assert_eq!(
            helper.hint("/switch Wel", 11, &ctx),
            Some("come".to_string())
        );
    }

    #[test]
    fn test_busy_presenter_offers_no_topic_names() {
        let helper = helper();
        let _guard = helper.presenter.try_lock().unwrap();
        assert!(helper.candidates("/switch ").1.is_empty());
    }
}

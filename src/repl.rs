//! Interactive chat loop on stdin/stdout.

use std::io::Write;
use std::path::PathBuf;

use pdf_chat_lib::commands::{chat, documents, settings, AppState};
use pdf_chat_lib::Session;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
  /load FILE...     load PDF (or .txt/.md) files, replacing the current set
  /docs             list loaded documents
  /summary [NAME]   summarize a document (first one by default)
  /history          show the conversation so far
  /clear            drop documents and conversation
  /models           list available models
  /model NAME       switch model (e.g. ollama/llama3, claude/claude-sonnet-4-20250514)
  /settings         show effective settings
  /help             this help
  /quit             exit
  Anything else is sent as a question.";

#[derive(Debug, PartialEq, Eq)]
pub enum ReplCommand {
    Ask(String),
    Load(Vec<PathBuf>),
    Docs,
    Summary(Option<String>),
    History,
    Clear,
    Models,
    Model(String),
    Settings,
    Help,
    Quit,
    Invalid(String),
}

impl ReplCommand {
    /// `None` for blank input.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            return Some(ReplCommand::Quit);
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Some(ReplCommand::Ask(line.to_string()));
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        let command = match (name, args.as_slice()) {
            ("load", []) => ReplCommand::Invalid("usage: /load FILE...".into()),
            ("load", files) => ReplCommand::Load(files.iter().map(PathBuf::from).collect()),
            ("docs", []) => ReplCommand::Docs,
            ("summary", []) => ReplCommand::Summary(None),
            ("summary", [doc]) => ReplCommand::Summary(Some(doc.to_string())),
            ("history", []) => ReplCommand::History,
            ("clear", []) => ReplCommand::Clear,
            ("models", []) => ReplCommand::Models,
            ("model", [model]) => ReplCommand::Model(model.to_string()),
            ("model", _) => ReplCommand::Invalid("usage: /model NAME".into()),
            ("settings", []) => ReplCommand::Settings,
            ("help", _) => ReplCommand::Help,
            ("quit" | "exit", _) => ReplCommand::Quit,
            (other, _) => ReplCommand::Invalid(format!("unknown command /{other}, try /help")),
        };
        Some(command)
    }
}

pub async fn run(state: AppState, mut session: Session) -> Result<(), Box<dyn std::error::Error>> {
    println!();
    println!("  PDF Chat: ask questions about your documents");
    println!("  Model:     {}", session.model);
    println!("  Documents: {}", session.documents().len());
    println!("  Type /help for commands, /quit to exit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(command) = ReplCommand::parse(&line) else {
            continue;
        };

        match command {
            ReplCommand::Quit => break,
            ReplCommand::Help => println!("{HELP}"),
            ReplCommand::Invalid(msg) => println!("  {msg}"),
            ReplCommand::Ask(question) => {
                eprint!("  Thinking...");
                let result = chat::ask(&state, &mut session, &question).await;
                eprint!("\r              \r");
                match result {
                    Ok(answer) => println!("\n  AI > {answer}\n"),
                    Err(e) => println!("\n  {}\n", e.user_message()),
                }
            }
            ReplCommand::Load(paths) => {
                let report = documents::process_documents(&state, &mut session, &paths);
                for doc in &report.loaded {
                    println!(
                        "  loaded {} ({} pages, {} words, {} chunks)",
                        doc.name, doc.pages, doc.stats.words, doc.chunks
                    );
                }
                for (path, reason) in &report.skipped {
                    println!("  skipped {path}: {reason}");
                }
                if !report.loaded.is_empty() {
                    println!("  Conversation cleared for the new documents");
                }
            }
            ReplCommand::Docs => {
                let docs = documents::list_documents(&state, &session);
                if docs.is_empty() {
                    println!("  No documents loaded");
                }
                for doc in docs {
                    println!(
                        "  • {}: {} pages, {} characters",
                        doc.name, doc.pages, doc.stats.characters
                    );
                    if let Some(meta) = &doc.metadata {
                        println!(
                            "    title: {}, author: {}, creator: {}",
                            meta.title, meta.author, meta.creator
                        );
                    }
                }
            }
            ReplCommand::Summary(name) => {
                eprint!("  Summarizing...");
                let result = chat::summarize(&state, &session, name.as_deref()).await;
                eprint!("\r                \r");
                match result {
                    Ok(summary) => println!("\n{summary}\n"),
                    Err(e) => println!("  {}", e.user_message()),
                }
            }
            ReplCommand::History => {
                if session.history.is_empty() {
                    println!("  (empty)");
                } else {
                    println!("{}", session.history.summarize());
                }
            }
            ReplCommand::Clear => {
                documents::clear(&mut session);
                println!("  Cleared documents and conversation");
            }
            ReplCommand::Models => {
                let models = settings::get_available_models(&state).await;
                if models.is_empty() {
                    println!("  No models found. Is Ollama running? (ollama serve)");
                }
                for model in models {
                    let marker = if model.id == session.model || model.name == session.model {
                        "*"
                    } else {
                        " "
                    };
                    println!("  {marker} {:<40} {}", model.id, model.provider);
                }
            }
            ReplCommand::Model(model) => {
                tracing::info!(from = %session.model, to = %model, "model switched");
                session.model = model;
                println!("  Using {}", session.model);
            }
            ReplCommand::Settings => {
                for (key, value) in settings::get_settings(&state.settings) {
                    println!("  {key:<22} {value}");
                }
            }
        }
    }

    println!("  Bye.");
    Ok(())
}

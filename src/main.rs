//! pdf-chat: ask questions about PDF documents using a local or hosted LLM.
//!
//! Commands:
//! - `chat`    Interactive chat, optionally preloading documents
//! - `ask`     One question, answer printed to stdout
//! - `models`  List available models
//! - `status`  Check the Ollama connection
//! - `chunks`  Show how a document is split into chunks
//! - `stats`   Show text statistics for a document

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pdf_chat_lib::commands::{chat, documents, settings, AppState};
use pdf_chat_lib::config::ProviderKind;
use pdf_chat_lib::{AppSettings, Session};

mod repl;

#[derive(Parser)]
#[command(
    name = "pdf-chat",
    about = "Chat with your PDF documents through a local or hosted LLM",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (TOML)
    #[arg(short, long, global = true, env = "PDF_CHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Model to use, optionally prefixed with its provider (e.g. claude/claude-sonnet-4-20250514)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Provider for models given without a prefix
    #[arg(long, global = true, value_parser = parse_provider)]
    provider: Option<ProviderKind>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat
    Chat {
        /// Documents to load before the first question
        #[arg(short, long = "pdf")]
        pdfs: Vec<PathBuf>,
    },

    /// Ask a single question and print the answer
    Ask {
        /// Documents to answer from
        #[arg(short, long = "pdf")]
        pdfs: Vec<PathBuf>,

        question: String,
    },

    /// List available models
    Models,

    /// Show connection status
    Status,

    /// Print the chunks a document is split into
    Chunks { file: PathBuf },

    /// Print text statistics for a document
    Stats { file: PathBuf },
}

fn parse_provider(value: &str) -> Result<ProviderKind, String> {
    value.parse().map_err(|e: pdf_chat_lib::ConfigError| e.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Before parsing, so `.env` can supply PDF_CHAT_CONFIG
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match dotenv {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Failed to load .env: {e}"),
    }

    let mut app_settings = AppSettings::load(cli.config.as_deref())?;
    if let Some(model) = cli.model {
        app_settings.model = model;
    }
    if let Some(provider) = cli.provider {
        app_settings.provider = provider;
    }
    let state = AppState::new(app_settings)?;
    let mut session = Session::new(&state.settings)?;

    match cli.command {
        Commands::Chat { pdfs } => {
            if !pdfs.is_empty() {
                let report = documents::process_documents(&state, &mut session, &pdfs);
                for (path, reason) in &report.skipped {
                    eprintln!("  skipped {path}: {reason}");
                }
            }
            repl::run(state, session).await?;
        }
        Commands::Ask { pdfs, question } => {
            let report = documents::process_documents(&state, &mut session, &pdfs);
            for (path, reason) in &report.skipped {
                eprintln!("  skipped {path}: {reason}");
            }
            match chat::ask(&state, &mut session, &question).await {
                Ok(answer) => println!("{answer}"),
                Err(e) => {
                    eprintln!("{}", e.user_message());
                    return Err(e.into());
                }
            }
        }
        Commands::Models => {
            for model in settings::get_available_models(&state).await {
                println!("{:<40} {}", model.id, model.provider);
            }
        }
        Commands::Status => {
            let report = settings::status(&state, &session.model).await;
            if report.ollama_connected {
                println!("Ollama connected ({})", report.ollama_host);
            } else {
                println!("Ollama not running at {}; run: ollama serve", report.ollama_host);
            }
            println!("Model: {}", report.model);
            if let Some(suggested) = report.suggested_model {
                println!("{} is not installed; try --model {suggested}", report.model);
            }
        }
        Commands::Chunks { file } => {
            for (i, chunk) in documents::document_chunks(&state, &file)?.iter().enumerate() {
                println!(
                    "--- chunk {} [{}..{}] ---\n{}",
                    i + 1,
                    chunk.start_offset,
                    chunk.end_offset,
                    chunk.text
                );
            }
        }
        Commands::Stats { file } => {
            let summary = documents::document_stats(&state, &file)?;
            println!("{}", summary.name);
            println!("  pages:      {}", summary.pages);
            println!("  characters: {}", summary.stats.characters);
            println!("  words:      {}", summary.stats.words);
            println!("  lines:      {}", summary.stats.lines);
            println!("  paragraphs: {}", summary.stats.paragraphs);
            println!("  chunks:     {}", summary.chunks);
            if let Some(meta) = &summary.metadata {
                println!("  title:      {}", meta.title);
                println!("  author:     {}", meta.author);
                println!("  creator:    {}", meta.creator);
                println!("  pdf pages:  {}", meta.pages);
            }
        }
    }

    Ok(())
}

pub mod chat;
pub mod documents;
pub mod settings;

use reqwest::Client;

use crate::chunker::Chunker;
use crate::config::AppSettings;
use crate::context::ContextAssembler;
use crate::doc_processor::DocumentError;
use crate::error::ConfigError;
use crate::llm::{self, LlmError};

/// Read-only state shared by every handler: validated settings, the text
/// pipeline built from them and the HTTP client.
#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: AppSettings,
    pub chunker: Chunker,
    pub assembler: ContextAssembler,
    pub client: Client,
}

impl AppState {
    pub fn new(settings: AppSettings) -> Result<Self, CommandError> {
        settings.validate()?;
        let client = llm::http_client(settings.request_timeout())?;
        Ok(Self {
            chunker: settings.chunker()?,
            assembler: settings.context_assembler()?,
            settings,
            client,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("No documents loaded")]
    NoDocuments,
    #[error("No document named {0}")]
    UnknownDocument(String),
}

impl CommandError {
    /// Text for the chat window; model-service failures get the friendlier
    /// wording from [`LlmError::user_message`].
    pub fn user_message(&self) -> String {
        match self {
            CommandError::Llm(e) => e.user_message(),
            other => format!("Error: {other}"),
        }
    }
}

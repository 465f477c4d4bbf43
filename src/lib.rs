pub mod chunker;
pub mod commands;
pub mod config;
pub mod context;
pub mod doc_processor;
pub mod error;
pub mod history;
pub mod llm;
pub mod prompt;
pub mod session;

pub use chunker::{Chunk, Chunker};
pub use config::AppSettings;
pub use context::ContextAssembler;
pub use doc_processor::{clean_text, Document, Page, PdfMetadata};
pub use error::ConfigError;
pub use history::{ConversationHistory, Message, Role};
pub use session::Session;

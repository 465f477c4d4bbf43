use crate::config::AppSettings;
use crate::doc_processor::Document;
use crate::error::ConfigError;
use crate::history::ConversationHistory;

/// Everything one user accumulates while chatting: loaded documents, the
/// bounded chat log and the model currently selected. Handlers receive it
/// explicitly; nothing outlives the process.
#[derive(Debug, Clone)]
pub struct Session {
    documents: Vec<Document>,
    pub history: ConversationHistory,
    pub model: String,
}

impl Session {
    pub fn new(settings: &AppSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            documents: Vec::new(),
            history: settings.new_history()?,
            model: settings.model.clone(),
        })
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn replace_documents(&mut self, documents: Vec<Document>) {
        self.documents = documents;
    }

    pub fn find_document(&self, name: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.name == name)
    }

    /// Full text of every loaded document, in load order.
    pub fn document_texts(&self) -> Vec<String> {
        self.documents.iter().map(Document::text).collect()
    }

    /// Forget documents and conversation; the selected model stays.
    pub fn clear(&mut self) {
        self.documents.clear();
        self.history.clear();
    }
}

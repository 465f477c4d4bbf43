pub mod claude;
pub mod ollama;
pub mod openai;

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::history::Message;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub provider: String,
}

/// Sampling knobs forwarded to the backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 300,
            top_p: 0.9,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub model: String,
    pub options: GenerationOptions,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub model: String,
}

/// Unified LLM provider enum, dispatching to OpenAI-compatible or Claude backends.
#[derive(Debug, Clone)]
pub enum Provider {
    OpenAi(openai::OpenAiConfig),
    Azure(openai::AzureConfig),
    Claude(claude::ClaudeConfig),
    Ollama(openai::OpenAiConfig),
}

impl Provider {
    pub fn ollama(host: &str) -> Self {
        Provider::Ollama(openai::OpenAiConfig {
            api_key: String::new(),
            base_url: format!("{}/v1", host.trim_end_matches('/')),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAi(_) => "OpenAI",
            Provider::Azure(_) => "Azure OpenAI",
            Provider::Claude(_) => "Anthropic",
            Provider::Ollama(_) => "Ollama",
        }
    }

    /// Sampling used when settings leave it unset. Azure deployments get
    /// longer, more focused answers than the small local models.
    pub fn default_options(&self) -> GenerationOptions {
        match self {
            Provider::Azure(_) => GenerationOptions {
                temperature: 0.3,
                max_tokens: 1500,
                top_p: 0.95,
            },
            _ => GenerationOptions::default(),
        }
    }

    pub async fn chat(&self, client: &Client, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        tracing::debug!(
            provider = self.name(),
            model = %request.model,
            messages = request.messages.len(),
            "sending chat request"
        );
        match self {
            Provider::OpenAi(config) | Provider::Ollama(config) => {
                openai::chat(client, config, request).await
            }
            Provider::Azure(config) => openai::chat_azure(client, config, request).await,
            Provider::Claude(config) => claude::chat(client, config, request).await,
        }
    }
}

/// HTTP client shared by every provider call; `timeout` bounds a whole request.
pub fn http_client(timeout: Duration) -> Result<Client, LlmError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("{0} not configured")]
    NotConfigured(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_connect() {
            LlmError::Connect(err.to_string())
        } else if err.is_decode() {
            LlmError::Parse(err.to_string())
        } else {
            LlmError::Http(err)
        }
    }
}

impl LlmError {
    /// Text shown in the chat in place of an answer.
    pub fn user_message(&self) -> String {
        match self {
            LlmError::Timeout => "Timeout! The model is taking too long. Try:\n\
                1. Using a smaller model (e.g. gemma3:1b)\n\
                2. Asking a shorter question\n\
                3. Raising request_timeout_secs"
                .to_string(),
            LlmError::Connect(_) => {
                "Can't connect to the model service. For a local model run: ollama serve".to_string()
            }
            LlmError::Api { status, .. } => format!("Error: model service returned status {status}"),
            LlmError::NotConfigured(what) => format!("Error: {what} not configured"),
            LlmError::Http(_) | LlmError::Parse(_) => format!("Error: {self}"),
        }
    }
}

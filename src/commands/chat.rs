use super::{AppState, CommandError};
use crate::config::{AppSettings, ProviderKind};
use crate::history::Role;
use crate::llm::claude::ClaudeConfig;
use crate::llm::openai::{AzureConfig, OpenAiConfig};
use crate::llm::{ChatRequest, GenerationOptions, LlmError, Provider};
use crate::prompt;
use crate::session::Session;

const EMPTY_ANSWER: &str = "No response generated";

/// Resolve an LLM provider from a model string like "openai/gpt-4o", "claude/...", "ollama/...".
/// Models without a prefix go to the configured default provider.
pub fn resolve_provider(model: &str, settings: &AppSettings) -> Result<(Provider, String), LlmError> {
    let (kind, model_id) = match model.split_once('/') {
        Some((prefix, rest)) => match prefix.parse::<ProviderKind>() {
            Ok(kind) => (kind, rest),
            // Not a provider prefix, e.g. "library/model" on Ollama
            Err(_) => (settings.provider, model),
        },
        None => (settings.provider, model),
    };

    let provider = match kind {
        ProviderKind::Ollama => Provider::ollama(&settings.ollama_host),
        ProviderKind::OpenAi => {
            let api_key = settings
                .openai_api_key
                .clone()
                .ok_or_else(|| LlmError::NotConfigured("OpenAI API key".into()))?;
            Provider::OpenAi(OpenAiConfig {
                api_key,
                base_url: settings.openai_base_url.clone(),
            })
        }
        ProviderKind::Azure => {
            let api_key = settings
                .azure_api_key
                .clone()
                .ok_or_else(|| LlmError::NotConfigured("Azure API key".into()))?;
            let endpoint = settings
                .azure_endpoint
                .clone()
                .ok_or_else(|| LlmError::NotConfigured("Azure endpoint".into()))?;
            Provider::Azure(AzureConfig {
                api_key,
                endpoint,
                api_version: settings.azure_api_version.clone(),
            })
        }
        ProviderKind::Claude => {
            let api_key = settings
                .claude_api_key
                .clone()
                .ok_or_else(|| LlmError::NotConfigured("Claude API key".into()))?;
            Provider::Claude(ClaudeConfig {
                api_key,
                base_url: settings.claude_base_url.clone(),
            })
        }
    };

    Ok((provider, model_id.to_string()))
}

/// Answer `question` using the loaded documents and recent conversation.
///
/// The question and the answer enter the history together, only once the
/// model has answered; a failed call leaves the history untouched so the
/// question can simply be asked again.
pub async fn ask(state: &AppState, session: &mut Session, question: &str) -> Result<String, CommandError> {
    let context = state.assembler.assemble(&session.document_texts());
    let messages = prompt::build_messages(
        &context,
        &session.history,
        state.settings.history_window,
        question,
    );

    let (provider, model_id) = resolve_provider(&session.model, &state.settings)?;
    let request = ChatRequest {
        messages,
        model: model_id,
        options: state.settings.generation_options(provider.default_options()),
    };

    let started = std::time::Instant::now();
    let response = provider.chat(&state.client, &request).await?;
    tracing::info!(
        provider = provider.name(),
        model = %response.model,
        context_chars = context.chars().count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "answer received"
    );

    let answer = match response.content.trim() {
        "" => EMPTY_ANSWER.to_string(),
        text => text.to_string(),
    };
    session.history.add(Role::User, question);
    session.history.add(Role::Assistant, answer.clone());
    Ok(answer)
}

/// Summarize one document (the first one when `name` is `None`). Only the
/// first chunk is sent so the request stays bounded.
pub async fn summarize(
    state: &AppState,
    session: &Session,
    name: Option<&str>,
) -> Result<String, CommandError> {
    let document = match name {
        Some(name) => session
            .find_document(name)
            .ok_or_else(|| CommandError::UnknownDocument(name.to_string()))?,
        None => session.documents().first().ok_or(CommandError::NoDocuments)?,
    };

    let chunks = state.chunker.chunk(&document.text());
    if chunks.len() > 1 {
        tracing::debug!(
            document = %document.name,
            chunks = chunks.len(),
            "summarizing first chunk only"
        );
    }
    let first = chunks.into_iter().next().unwrap_or_default();

    let (provider, model_id) = resolve_provider(&session.model, &state.settings)?;
    let words = state.settings.summary_words;
    let options = summary_options(
        state.settings.generation_options(provider.default_options()),
        words,
    );
    let request = ChatRequest {
        messages: prompt::summary_messages(&first, words),
        model: model_id,
        options,
    };

    let response = provider.chat(&state.client, &request).await?;
    Ok(match response.content.trim() {
        "" => EMPTY_ANSWER.to_string(),
        text => text.to_string(),
    })
}

/// Summaries run cooler and get roughly two tokens per requested word.
fn summary_options(base: GenerationOptions, words: u32) -> GenerationOptions {
    GenerationOptions {
        temperature: 0.5,
        max_tokens: words.saturating_mul(2),
        ..base
    }
}

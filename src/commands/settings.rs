use super::chat::resolve_provider;
use super::AppState;
use crate::config::AppSettings;
use crate::llm::{ollama, ModelInfo, Provider};

#[derive(Debug, Clone)]
pub struct StatusReport {
    pub ollama_host: String,
    pub ollama_connected: bool,
    pub model: String,
    /// Installed Ollama model to switch to when `model` is an Ollama model
    /// that is not installed.
    pub suggested_model: Option<String>,
}

/// Mask an API key for display, keeping only its first and last four characters.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "****".to_string()
    }
}

/// Settings as key/value pairs for display, secrets masked.
pub fn get_settings(settings: &AppSettings) -> Vec<(&'static str, String)> {
    let secret = |v: &Option<String>| v.as_deref().map(mask_secret).unwrap_or_else(|| "-".into());
    vec![
        ("provider", settings.provider.to_string()),
        ("model", settings.model.clone()),
        ("ollama_host", settings.ollama_host.clone()),
        ("openai_api_key", secret(&settings.openai_api_key)),
        ("openai_base_url", settings.openai_base_url.clone()),
        ("azure_api_key", secret(&settings.azure_api_key)),
        (
            "azure_endpoint",
            settings.azure_endpoint.clone().unwrap_or_else(|| "-".into()),
        ),
        ("claude_api_key", secret(&settings.claude_api_key)),
        ("context_budget", settings.context_budget.to_string()),
        ("chunk_size", settings.chunk_size.to_string()),
        ("chunk_overlap", settings.chunk_overlap.to_string()),
        ("max_history", settings.max_history.to_string()),
        ("history_window", settings.history_window.to_string()),
        ("request_timeout_secs", settings.request_timeout_secs.to_string()),
    ]
}

/// Models the user can pick from: whatever Ollama has installed plus the
/// hosted models whose provider has credentials configured.
pub async fn get_available_models(state: &AppState) -> Vec<ModelInfo> {
    let settings = &state.settings;
    let mut models = match ollama::list_models(&state.client, &settings.ollama_host).await {
        Ok(models) => models,
        Err(e) => {
            tracing::warn!(error = %e, "could not list Ollama models");
            Vec::new()
        }
    };

    // OpenAI models
    if settings.openai_api_key.is_some() {
        models.extend([
            ModelInfo {
                id: "openai/gpt-4o".into(),
                name: "GPT-4o".into(),
                provider: "OpenAI".into(),
            },
            ModelInfo {
                id: "openai/gpt-4o-mini".into(),
                name: "GPT-4o Mini".into(),
                provider: "OpenAI".into(),
            },
        ]);
    }

    // Azure deployments are user-named; offer the configured one.
    if settings.azure_api_key.is_some() && settings.azure_endpoint.is_some() {
        models.push(ModelInfo {
            id: format!("azure/{}", settings.model),
            name: settings.model.clone(),
            provider: "Azure OpenAI".into(),
        });
    }

    // Claude models
    if settings.claude_api_key.is_some() {
        models.extend([
            ModelInfo {
                id: "claude/claude-sonnet-4-20250514".into(),
                name: "Claude Sonnet 4".into(),
                provider: "Anthropic".into(),
            },
            ModelInfo {
                id: "claude/claude-haiku-3-5-20241022".into(),
                name: "Claude Haiku 3.5".into(),
                provider: "Anthropic".into(),
            },
        ]);
    }

    models
}

pub async fn status(state: &AppState, model: &str) -> StatusReport {
    let host = &state.settings.ollama_host;
    let ollama_connected = ollama::check_connection(&state.client, host).await;

    let mut suggested_model = None;
    let (provider, model_id) = match resolve_provider(model, &state.settings) {
        Ok((provider, model_id)) => (Some(provider), model_id),
        Err(_) => (None, model.to_string()),
    };
    if ollama_connected && matches!(provider, Some(Provider::Ollama(_))) {
        match ollama::list_models(&state.client, host).await {
            Ok(models) if !models.iter().any(|m| m.name == model_id) => {
                suggested_model = ollama::default_model(&models, "gemma3:1b").map(|m| m.id.clone());
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "could not list Ollama models"),
        }
    }

    StatusReport {
        ollama_host: host.clone(),
        ollama_connected,
        model: model.to_string(),
        suggested_model,
    }
}

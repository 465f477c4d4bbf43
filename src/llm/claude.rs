use super::{ChatRequest, ChatResponse, LlmError};
use crate::history::{Message, Role};
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct ClaudeConfig {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<&'a Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Vec<ClaudeContent>,
}

#[derive(Deserialize)]
struct ClaudeContent {
    text: Option<String>,
}

/// Anthropic takes system text out of band; every system message is folded
/// into the `system` field and the rest are sent in order.
fn build_request(request: &ChatRequest) -> ClaudeRequest<'_> {
    let system: Vec<&str> = request
        .messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();

    let messages = request
        .messages
        .iter()
        .filter(|m| m.role != Role::System)
        .collect();

    ClaudeRequest {
        model: &request.model,
        max_tokens: request.options.max_tokens,
        temperature: request.options.temperature,
        messages,
        system: (!system.is_empty()).then(|| system.join("\n\n")),
    }
}

pub async fn chat(
    client: &Client,
    config: &ClaudeConfig,
    request: &ChatRequest,
) -> Result<ChatResponse, LlmError> {
    if config.api_key.is_empty() {
        return Err(LlmError::NotConfigured("Claude API key".into()));
    }
    let body = build_request(request);

    let resp = client
        .post(format!("{}/v1/messages", config.base_url))
        .header("Content-Type", "application/json")
        .header("x-api-key", &config.api_key)
        .header("anthropic-version", "2023-06-01")
        .json(&body)
        .send()
        .await?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let text = resp.text().await.unwrap_or_default();
        return Err(LlmError::Api {
            status,
            message: text,
        });
    }

    let data: ClaudeResponse = resp.json().await?;
    let content = data
        .content
        .into_iter()
        .filter_map(|c| c.text)
        .collect::<Vec<_>>()
        .join("");

    Ok(ChatResponse {
        content,
        model: request.model.clone(),
    })
}

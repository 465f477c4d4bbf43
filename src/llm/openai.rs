use super::{ChatRequest, ChatResponse, LlmError};
use crate::history::Message;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
}

/// Azure OpenAI deployment. The request's model names the deployment.
#[derive(Debug, Clone)]
pub struct AzureConfig {
    pub api_key: String,
    pub endpoint: String,
    pub api_version: String,
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

fn build_body<'a>(request: &'a ChatRequest, model: Option<&'a str>) -> OpenAiRequest<'a> {
    OpenAiRequest {
        model,
        messages: &request.messages,
        temperature: request.options.temperature,
        max_tokens: request.options.max_tokens,
        top_p: request.options.top_p,
        stream: false,
    }
}

pub async fn chat(
    client: &Client,
    config: &OpenAiConfig,
    request: &ChatRequest,
) -> Result<ChatResponse, LlmError> {
    let body = build_body(request, Some(request.model.as_str()));

    let mut req = client
        .post(format!("{}/chat/completions", config.base_url))
        .header("Content-Type", "application/json")
        .json(&body);

    if !config.api_key.is_empty() {
        req = req.header("Authorization", format!("Bearer {}", config.api_key));
    }

    send(req, request).await
}

pub async fn chat_azure(
    client: &Client,
    config: &AzureConfig,
    request: &ChatRequest,
) -> Result<ChatResponse, LlmError> {
    if config.api_key.is_empty() || config.endpoint.is_empty() {
        return Err(LlmError::NotConfigured("Azure OpenAI credentials".into()));
    }
    // The deployment is addressed by URL, so the body carries no model.
    let body = build_body(request, None);

    let req = client
        .post(format!(
            "{}/openai/deployments/{}/chat/completions",
            config.endpoint.trim_end_matches('/'),
            request.model
        ))
        .query(&[("api-version", config.api_version.as_str())])
        .header("Content-Type", "application/json")
        .header("api-key", &config.api_key)
        .json(&body);

    send(req, request).await
}

async fn send(req: RequestBuilder, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
    let resp = req.send().await?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let text = resp.text().await.unwrap_or_default();
        return Err(LlmError::Api {
            status,
            message: text,
        });
    }

    let data: OpenAiResponse = resp.json().await?;
    let content = data
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default();

    Ok(ChatResponse {
        content,
        model: request.model.clone(),
    })
}

//! Ollama's native API, used for model discovery and health checks. Chat
//! goes through the OpenAI-compatible endpoint in [`super::openai`].

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use super::{LlmError, ModelInfo};

pub const DEFAULT_HOST: &str = "http://localhost:11434";
const TAGS_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagsModel>,
}

#[derive(Deserialize)]
struct TagsModel {
    name: String,
}

/// Models installed on the Ollama host.
pub async fn list_models(client: &Client, host: &str) -> Result<Vec<ModelInfo>, LlmError> {
    let resp = client
        .get(format!("{}/api/tags", host.trim_end_matches('/')))
        .timeout(TAGS_TIMEOUT)
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

    let data: TagsResponse = resp.json().await?;
    Ok(into_model_infos(data))
}

fn into_model_infos(data: TagsResponse) -> Vec<ModelInfo> {
    data.models
        .into_iter()
        .map(|m| ModelInfo {
            id: format!("ollama/{}", m.name),
            name: m.name,
            provider: "Ollama".into(),
        })
        .collect()
}

pub async fn check_connection(client: &Client, host: &str) -> bool {
    match client
        .get(format!("{}/api/tags", host.trim_end_matches('/')))
        .timeout(TAGS_TIMEOUT)
        .send()
        .await
    {
        Ok(resp) => resp.status().is_success(),
        Err(e) => {
            tracing::debug!(host, error = %e, "ollama not reachable");
            false
        }
    }
}

/// Pick `preferred` when installed, otherwise the first available model.
pub fn default_model<'a>(models: &'a [ModelInfo], preferred: &str) -> Option<&'a ModelInfo> {
    models
        .iter()
        .find(|m| m.name == preferred)
        .or_else(|| models.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        let data: TagsResponse = serde_json::from_str(
            r#"{"models":[{"name":"llama3:latest","size":1},{"name":"gemma3:1b"}]}"#,
        )
        .unwrap();
        let models = into_model_infos(data);

        assert_eq!(models.len(), 2);
        assert_eq!(models[0].id, "ollama/llama3:latest");
        assert_eq!(models[1].name, "gemma3:1b");
    }

    #[test]
    fn test_parse_tags_without_models() {
        let data: TagsResponse = serde_json::from_str("{}").unwrap();
        assert!(into_model_infos(data).is_empty());
    }

    #[test]
    fn test_default_model_prefers_requested() {
        let models = vec![
            ModelInfo {
                id: "ollama/llama3:latest".into(),
                name: "llama3:latest".into(),
                provider: "Ollama".into(),
            },
            ModelInfo {
                id: "ollama/gemma3:1b".into(),
                name: "gemma3:1b".into(),
                provider: "Ollama".into(),
            },
        ];
        assert_eq!(default_model(&models, "gemma3:1b").unwrap().name, "gemma3:1b");
        assert_eq!(default_model(&models, "qwen").unwrap().name, "llama3:latest");
        assert!(default_model(&[], "gemma3:1b").is_none());
    }
}

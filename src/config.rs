//! Application settings.
//!
//! Layers, lowest priority first: built-in defaults, an optional TOML file,
//! environment variables (a `.env` file is loaded into the environment by the
//! binary), then command-line flags applied by the caller.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chunker::Chunker;
use crate::context::{ContextAssembler, DEFAULT_CONTEXT_BUDGET};
use crate::error::ConfigError;
use crate::history::{ConversationHistory, DEFAULT_MAX_HISTORY};
use crate::llm::{ollama, GenerationOptions};
use crate::prompt::DEFAULT_HISTORY_WINDOW;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Ollama,
    OpenAi,
    Azure,
    Claude,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Ollama => "ollama",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Azure => "azure",
            ProviderKind::Claude => "claude",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(ProviderKind::Ollama),
            "openai" => Ok(ProviderKind::OpenAi),
            "azure" => Ok(ProviderKind::Azure),
            "claude" | "anthropic" => Ok(ProviderKind::Claude),
            other => Err(ConfigError::InvalidSetting {
                key: "provider".into(),
                reason: format!("unknown provider `{other}`"),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Backend used for models given without a `provider/` prefix.
    pub provider: ProviderKind,
    pub model: String,
    pub ollama_host: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub azure_api_key: Option<String>,
    pub azure_endpoint: Option<String>,
    pub azure_api_version: String,
    pub claude_api_key: Option<String>,
    pub claude_base_url: String,
    pub context_budget: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub max_history: usize,
    pub history_window: usize,
    pub request_timeout_secs: u64,
    /// Sampling overrides; unset values use the provider's defaults.
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub summary_words: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Ollama,
            model: "gemma3:1b".to_string(),
            ollama_host: ollama::DEFAULT_HOST.to_string(),
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            azure_api_key: None,
            azure_endpoint: None,
            azure_api_version: "2024-02-15-preview".to_string(),
            claude_api_key: None,
            claude_base_url: "https://api.anthropic.com".to_string(),
            context_budget: DEFAULT_CONTEXT_BUDGET,
            chunk_size: Chunker::DEFAULT_CHUNK_SIZE,
            chunk_overlap: Chunker::DEFAULT_OVERLAP,
            max_history: DEFAULT_MAX_HISTORY,
            history_window: DEFAULT_HISTORY_WINDOW,
            request_timeout_secs: 180,
            temperature: None,
            max_tokens: None,
            top_p: None,
            summary_words: 500,
        }
    }
}

impl AppSettings {
    /// Defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file. Missing keys keep their defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        tracing::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Override fields from environment variables. `lookup` is the
    /// environment; tests pass a map instead of touching the process env.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(provider) = lookup("PDF_CHAT_PROVIDER") {
            self.provider = provider.parse()?;
        }
        if let Some(model) = lookup("PDF_CHAT_MODEL").or_else(|| lookup("MODEL_NAME")) {
            self.model = model;
        }
        if let Some(host) = lookup("PDF_CHAT_OLLAMA_HOST") {
            self.ollama_host = host;
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.openai_api_key = Some(key);
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.openai_base_url = url;
        }
        if let Some(key) = lookup("AZURE_API_KEY") {
            self.azure_api_key = Some(key);
        }
        if let Some(endpoint) = lookup("AZURE_ENDPOINT") {
            self.azure_endpoint = Some(endpoint);
        }
        if let Some(version) = lookup("AZURE_API_VERSION") {
            self.azure_api_version = version;
        }
        if let Some(key) = lookup("ANTHROPIC_API_KEY") {
            self.claude_api_key = Some(key);
        }
        if let Some(url) = lookup("ANTHROPIC_BASE_URL") {
            self.claude_base_url = url;
        }

        parse_env(&lookup, "PDF_CHAT_CONTEXT_BUDGET", &mut self.context_budget)?;
        parse_env(&lookup, "PDF_CHAT_CHUNK_SIZE", &mut self.chunk_size)?;
        parse_env(&lookup, "PDF_CHAT_CHUNK_OVERLAP", &mut self.chunk_overlap)?;
        parse_env(&lookup, "PDF_CHAT_MAX_HISTORY", &mut self.max_history)?;
        parse_env(&lookup, "PDF_CHAT_HISTORY_WINDOW", &mut self.history_window)?;
        parse_env(&lookup, "PDF_CHAT_TIMEOUT_SECS", &mut self.request_timeout_secs)?;
        if let Some(temperature) = env_value(&lookup, "PDF_CHAT_TEMPERATURE")? {
            self.temperature = Some(temperature);
        }
        if let Some(max_tokens) = env_value(&lookup, "PDF_CHAT_MAX_TOKENS")? {
            self.max_tokens = Some(max_tokens);
        }
        if let Some(top_p) = env_value(&lookup, "PDF_CHAT_TOP_P")? {
            self.top_p = Some(top_p);
        }
        parse_env(&lookup, "PDF_CHAT_SUMMARY_WORDS", &mut self.summary_words)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        Chunker::new(self.chunk_size, self.chunk_overlap)?;
        ContextAssembler::new(self.context_budget)?;
        ConversationHistory::new(self.max_history)?;
        if self.request_timeout_secs == 0 {
            return Err(invalid("request_timeout_secs", "must be greater than zero"));
        }
        if self.temperature.is_some_and(|t| !(0.0..=2.0).contains(&t)) {
            return Err(invalid("temperature", "must be between 0 and 2"));
        }
        if self.top_p.is_some_and(|p| !(0.0..=1.0).contains(&p)) {
            return Err(invalid("top_p", "must be between 0 and 1"));
        }
        if self.max_tokens == Some(0) {
            return Err(invalid("max_tokens", "must be greater than zero"));
        }
        if self.summary_words == 0 {
            return Err(invalid("summary_words", "must be greater than zero"));
        }
        if self.model.trim().is_empty() {
            return Err(invalid("model", "must not be empty"));
        }
        Ok(())
    }

    pub fn chunker(&self) -> Result<Chunker, ConfigError> {
        Chunker::new(self.chunk_size, self.chunk_overlap)
    }

    pub fn context_assembler(&self) -> Result<ContextAssembler, ConfigError> {
        ContextAssembler::new(self.context_budget)
    }

    pub fn new_history(&self) -> Result<ConversationHistory, ConfigError> {
        ConversationHistory::new(self.max_history)
    }

    /// `defaults` with any configured sampling values laid over it.
    pub fn generation_options(&self, defaults: GenerationOptions) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            top_p: self.top_p.unwrap_or(defaults.top_p),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidSetting {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn env_value<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidSetting {
                key: key.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

fn parse_env<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) -> Result<(), ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    if let Some(value) = env_value(lookup, key)? {
        *target = value;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let settings = AppSettings::default();
        settings.validate().unwrap();
        assert_eq!(settings.provider, ProviderKind::Ollama);
        assert_eq!(settings.context_budget, 3000);
        assert_eq!(settings.max_history, 20);
        assert_eq!(settings.request_timeout(), Duration::from_secs(180));
    }

    #[test]
    fn test_load_from_toml_keeps_missing_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "provider = \"claude\"\nmodel = \"claude-sonnet-4-20250514\"\nchunk_size = 4000\nchunk_overlap = 100"
        )
        .unwrap();

        let settings = AppSettings::load_from(file.path()).unwrap();
        assert_eq!(settings.provider, ProviderKind::Claude);
        assert_eq!(settings.model, "claude-sonnet-4-20250514");
        assert_eq!(settings.chunker().unwrap().chunk_size(), 4000);
        assert_eq!(settings.context_budget, 3000);
    }

    #[test]
    fn test_load_from_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chunk_size = \"big\"").unwrap();

        let err = AppSettings::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = AppSettings::load_from(Path::new("/nonexistent/pdf-chat.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = AppSettings::default();
        settings
            .apply_env(env(&[
                ("PDF_CHAT_PROVIDER", "azure"),
                ("MODEL_NAME", "gpt-4"),
                ("AZURE_API_KEY", "secret"),
                ("AZURE_ENDPOINT", "https://example.openai.azure.com"),
                ("PDF_CHAT_CONTEXT_BUDGET", "5000"),
            ]))
            .unwrap();

        assert_eq!(settings.provider, ProviderKind::Azure);
        assert_eq!(settings.model, "gpt-4");
        assert_eq!(settings.azure_api_key.as_deref(), Some("secret"));
        assert_eq!(settings.context_budget, 5000);
    }

    #[test]
    fn test_pdf_chat_model_wins_over_model_name() {
        let mut settings = AppSettings::default();
        settings
            .apply_env(env(&[("PDF_CHAT_MODEL", "llama3"), ("MODEL_NAME", "gpt-4")]))
            .unwrap();
        assert_eq!(settings.model, "llama3");
    }

    #[test]
    fn test_env_bad_number() {
        let mut settings = AppSettings::default();
        let err = settings
            .apply_env(env(&[("PDF_CHAT_CHUNK_SIZE", "lots")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSetting { key, .. } if key == "PDF_CHAT_CHUNK_SIZE"));
    }

    #[test]
    fn test_validate_rejects_overlap_not_below_chunk_size() {
        let settings = AppSettings {
            chunk_size: 200,
            chunk_overlap: 200,
            ..AppSettings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(ConfigError::InvalidChunking {
                chunk_size: 200,
                overlap: 200
            })
        );
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let zero_budget = AppSettings {
            context_budget: 0,
            ..AppSettings::default()
        };
        assert_eq!(zero_budget.validate(), Err(ConfigError::ZeroBudget));

        let zero_history = AppSettings {
            max_history: 0,
            ..AppSettings::default()
        };
        assert_eq!(zero_history.validate(), Err(ConfigError::ZeroHistory));

        let zero_timeout = AppSettings {
            request_timeout_secs: 0,
            ..AppSettings::default()
        };
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_summary_words() {
        let settings = AppSettings {
            summary_words: 0,
            ..AppSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidSetting { key, .. }) if key == "summary_words"
        ));
    }

    #[test]
    fn test_sampling_overrides() {
        let mut settings = AppSettings::default();
        let defaults = GenerationOptions::default();
        assert_eq!(settings.generation_options(defaults), defaults);

        settings
            .apply_env(env(&[("PDF_CHAT_TEMPERATURE", "0.2"), ("PDF_CHAT_MAX_TOKENS", "800")]))
            .unwrap();
        let options = settings.generation_options(defaults);
        assert_eq!(options.temperature, 0.2);
        assert_eq!(options.max_tokens, 800);
        assert_eq!(options.top_p, defaults.top_p);

        let out_of_range = AppSettings {
            top_p: Some(1.5),
            ..AppSettings::default()
        };
        assert!(out_of_range.validate().is_err());
    }

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!("anthropic".parse::<ProviderKind>().unwrap(), ProviderKind::Claude);
        assert!("bard".parse::<ProviderKind>().is_err());
    }
}

// Configuration layer for provider-agnostic client creation

use crate::fallback::{BoundModel, FallbackChatClient};
use crate::openai::{OpenAIClient, GEMINI_OPENAI_API_BASE, OPENAI_API_BASE};
use crate::traits::{ChatClient, ChatOptions, EmbeddingClient};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Type of LLM provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Gemini,
    OpenAI,
    Vllm,
}

/// One provider endpoint serving one model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    /// Gemini through its OpenAI-compatible endpoint
    Gemini {
        api_key: String,
        model: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
    OpenAI {
        api_key: String,
        model: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
    /// Self-hosted vLLM server (OpenAI-compatible, key usually unused)
    Vllm {
        base_url: String,
        model: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        api_key: Option<String>,
    },
}

impl ProviderConfig {
    pub fn gemini(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::Gemini {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
        }
    }

    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::OpenAI {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
        }
    }

    pub fn vllm(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self::Vllm {
            base_url: base_url.into(),
            model: model.into(),
            api_key: None,
        }
    }

    pub fn provider_type(&self) -> ProviderType {
        match self {
            Self::Gemini { .. } => ProviderType::Gemini,
            Self::OpenAI { .. } => ProviderType::OpenAI,
            Self::Vllm { .. } => ProviderType::Vllm,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Self::Gemini { model, .. } | Self::OpenAI { model, .. } | Self::Vllm { model, .. } => model,
        }
    }

    fn endpoint(&self) -> (String, String) {
        match self {
            Self::Gemini { api_key, base_url, .. } => (
                api_key.clone(),
                base_url.clone().unwrap_or_else(|| GEMINI_OPENAI_API_BASE.to_string()),
            ),
            Self::OpenAI { api_key, base_url, .. } => (
                api_key.clone(),
                base_url.clone().unwrap_or_else(|| OPENAI_API_BASE.to_string()),
            ),
            Self::Vllm { base_url, api_key, .. } => (
                api_key.clone().unwrap_or_else(|| "EMPTY".to_string()),
                base_url.clone(),
            ),
        }
    }
}

/// Sampling parameters for one capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelProfile {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl ModelProfile {
    /// Classification, grading and rewriting
    pub fn deterministic() -> Self {
        Self {
            temperature: 0.0,
            top_p: 0.95,
            max_tokens: 1000,
        }
    }

    /// Answer generation
    pub fn answer() -> Self {
        Self {
            temperature: 0.3,
            top_p: 0.9,
            max_tokens: 1500,
        }
    }

    /// History summarization
    pub fn summary() -> Self {
        Self {
            temperature: 0.3,
            top_p: 0.9,
            max_tokens: 1000,
        }
    }

    pub fn chat_options(&self) -> ChatOptions {
        ChatOptions::new()
            .temperature(self.temperature)
            .top_p(self.top_p)
            .max_tokens(self.max_tokens)
    }
}

impl Default for ModelProfile {
    fn default() -> Self {
        Self::deterministic()
    }
}

/// Factory for creating clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    /// Client for a single provider, pinned to its configured model
    pub fn create_chat_client(config: &ProviderConfig) -> Result<Arc<dyn ChatClient>> {
        let (api_key, base_url) = config.endpoint();
        let name = format!("{:?}:{}", config.provider_type(), config.model()).to_lowercase();
        let client = OpenAIClient::with_base_url(api_key, base_url)?.named(name);
        Ok(Arc::new(BoundModel::new(Arc::new(client), config.model())))
    }

    /// Providers tried in order; a single provider is returned unwrapped.
    pub fn create_chain(configs: &[ProviderConfig]) -> Result<Arc<dyn ChatClient>> {
        let mut providers = configs
            .iter()
            .map(Self::create_chat_client)
            .collect::<Result<Vec<_>>>()?;

        match providers.len() {
            0 => anyhow::bail!("At least one LLM provider must be configured"),
            1 => Ok(providers.remove(0)),
            _ => Ok(Arc::new(FallbackChatClient::from_providers(providers)?)),
        }
    }

    pub fn create_embedding_client(config: &ProviderConfig) -> Result<Arc<dyn EmbeddingClient>> {
        let (api_key, base_url) = config.endpoint();
        Ok(Arc::new(OpenAIClient::with_base_url(api_key, base_url)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_types() {
        assert_eq!(ProviderConfig::gemini("k", "gemini-2.0-flash").provider_type(), ProviderType::Gemini);
        assert_eq!(ProviderConfig::vllm("http://h/v1", "qwen").provider_type(), ProviderType::Vllm);
        assert_eq!(ProviderConfig::openai("k", "gpt-4o-mini").model(), "gpt-4o-mini");
    }

    #[test]
    fn test_vllm_defaults_to_placeholder_key() {
        let (key, url) = ProviderConfig::vllm("http://h:8000/v1", "m").endpoint();
        assert_eq!(key, "EMPTY");
        assert_eq!(url, "http://h:8000/v1");
    }

    #[test]
    fn test_gemini_default_endpoint() {
        let (_, url) = ProviderConfig::gemini("k", "m").endpoint();
        assert_eq!(url, GEMINI_OPENAI_API_BASE);
    }

    #[test]
    fn test_serde_tagged() {
        let config: ProviderConfig = serde_json::from_str(
            r#"{"type": "vllm", "base_url": "http://h/v1", "model": "qwen"}"#,
        )
        .unwrap();
        assert_eq!(config.provider_type(), ProviderType::Vllm);

        let json = serde_json::to_value(ProviderConfig::gemini("k", "m")).unwrap();
        assert_eq!(json["type"], "gemini");
        assert!(json.get("base_url").is_none());
    }

    #[test]
    fn test_chain_requires_provider() {
        assert!(ClientFactory::create_chain(&[]).is_err());
    }

    #[test]
    fn test_profiles() {
        let options = ModelProfile::answer().chat_options();
        assert_eq!(options.temperature, Some(0.3));
        assert_eq!(options.max_tokens, Some(1500));
        assert!(!options.json_mode);
    }
}

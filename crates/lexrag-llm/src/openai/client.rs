// OpenAI-compatible client: OpenAI itself, Gemini's OpenAI endpoint, vLLM servers

use crate::traits::{
    ChatClient, ChatOptions, ChatRequest, ChatResponse, EmbeddingClient, EmbeddingRequest,
    TokenUsage,
};
use crate::types::Message;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const GEMINI_OPENAI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// OpenAI-compatible client (HTTP direct, no SDK)
pub struct OpenAIClient {
    http_client: reqwest::Client,
    base_url: String,
    name: String,
}

impl OpenAIClient {
    /// Create new client against the public OpenAI API
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, OPENAI_API_BASE)
    }

    /// Create a client for any OpenAI-compatible endpoint
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .context("Invalid API key format")?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            http_client,
            name: base_url.clone(),
            base_url,
        })
    }

    /// Override the name shown in logs
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build chat completion request payload
    fn build_chat_request(&self, model: &str, messages: &[Message], options: &ChatOptions) -> Value {
        let openai_messages: Vec<Value> = messages
            .iter()
            .map(|msg| {
                serde_json::json!({
                    "role": msg.role(),
                    "content": msg.content(),
                })
            })
            .collect();

        let mut request = serde_json::Map::new();
        request.insert("model".to_string(), serde_json::json!(model));
        request.insert("messages".to_string(), Value::Array(openai_messages));
        request.insert("stream".to_string(), Value::Bool(false));

        if let Some(temp) = options.temperature {
            request.insert("temperature".to_string(), serde_json::json!(temp));
        }
        if let Some(top_p) = options.top_p {
            request.insert("top_p".to_string(), serde_json::json!(top_p));
        }
        if let Some(max_tokens) = options.max_tokens {
            request.insert("max_tokens".to_string(), serde_json::json!(max_tokens));
        }
        if options.json_mode {
            request.insert(
                "response_format".to_string(),
                serde_json::json!({ "type": "json_object" }),
            );
        }

        Value::Object(request)
    }

    async fn post<T: for<'de> Deserialize<'de>>(&self, path: &str, payload: &Value) -> Result<T> {
        let response = self
            .http_client
            .post(format!("{}/{}", self.base_url, path))
            .json(payload)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("{} API error ({}): {}", self.name, status, error_text);
        }

        response.json().await.context("Failed to parse response")
    }
}

// ============================================================================
// TRAIT IMPLEMENTATIONS
// ============================================================================

#[async_trait]
impl ChatClient for OpenAIClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let payload = self.build_chat_request(&request.model, &request.messages, &request.options);
        let raw: OpenAIChatResponse = self.post("chat/completions", &payload).await?;

        let choice = raw.choices.into_iter().next();
        Ok(ChatResponse {
            content: choice.as_ref().and_then(|c| c.message.content.clone()),
            usage: raw.usage.map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.and_then(|c| c.finish_reason),
        })
    }

    fn provider_name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl EmbeddingClient for OpenAIClient {
    async fn embed(&self, request: EmbeddingRequest) -> Result<Vec<f32>> {
        let mut payload = serde_json::json!({
            "model": request.model,
            "input": request.input,
        });
        if let (Some(dimensions), Some(obj)) = (request.dimensions, payload.as_object_mut()) {
            obj.insert("dimensions".to_string(), serde_json::json!(dimensions));
        }

        let raw: OpenAIEmbeddingResponse = self.post("embeddings", &payload).await?;
        let mut vector = raw
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .context("Embedding response contained no data")?;

        // Some servers ignore `dimensions`
        if let Some(dimensions) = request.dimensions {
            vector.truncate(dimensions);
        }
        Ok(vector)
    }
}

// ============================================================================
// OPENAI-SPECIFIC RESPONSE TYPES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAIChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Choice {
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIEmbeddingResponse {
    pub data: Vec<EmbeddingData>,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingData {
    pub embedding: Vec<f32>,
}

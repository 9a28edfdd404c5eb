use crate::traits::{ChatClient, ChatRequest, ChatResponse};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Pins a client to one model id, whatever model the request names.
///
/// Lets a chain mix providers that serve the same role under different model names.
pub struct BoundModel {
    client: Arc<dyn ChatClient>,
    model: String,
}

impl BoundModel {
    pub fn new(client: Arc<dyn ChatClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl ChatClient for BoundModel {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.client.chat(request.for_model(self.model.as_str())).await
    }

    fn provider_name(&self) -> &str {
        self.client.provider_name()
    }
}

/// Ordered list of providers; the first success wins.
pub struct FallbackChatClient {
    providers: Vec<Arc<dyn ChatClient>>,
}

impl FallbackChatClient {
    pub fn new(primary: Arc<dyn ChatClient>) -> Self {
        Self {
            providers: vec![primary],
        }
    }

    pub fn with_fallback(mut self, provider: Arc<dyn ChatClient>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn from_providers(providers: Vec<Arc<dyn ChatClient>>) -> Result<Self> {
        if providers.is_empty() {
            anyhow::bail!("A fallback chain needs at least one provider");
        }
        Ok(Self { providers })
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[async_trait]
impl ChatClient for FallbackChatClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let mut last_error = None;

        for (idx, provider) in self.providers.iter().enumerate() {
            match provider.chat(request.clone()).await {
                Ok(response) => {
                    if idx > 0 {
                        tracing::info!(
                            provider = provider.provider_name(),
                            attempt = idx + 1,
                            "Fallback provider succeeded"
                        );
                    }
                    return Ok(response);
                }
                Err(e) => {
                    tracing::warn!(
                        provider = provider.provider_name(),
                        attempt = idx + 1,
                        "Provider failed: {:#}",
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(e.context(format!(
                "All {} providers in the fallback chain failed",
                self.providers.len()
            ))),
            None => anyhow::bail!("Fallback chain is empty"),
        }
    }

    fn provider_name(&self) -> &str {
        "fallback"
    }
}

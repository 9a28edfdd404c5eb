use crate::capabilities::{GenerationInput, Generator};
use crate::node::{Node, NodeId};
use anyhow::Result;
use async_trait::async_trait;
use lexrag_types::messages::PROVIDER_ERROR_MESSAGE;
use lexrag_types::ConversationState;
use std::sync::Arc;

pub struct GenerateNode {
    generator: Arc<dyn Generator>,
}

impl GenerateNode {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

pub fn generation_input(state: &ConversationState) -> GenerationInput {
    GenerationInput {
        question: state.question.clone(),
        documents: state.documents.clone(),
        summary: state.recent_summary(),
        history: state.last_turn_transcript(),
    }
}

#[async_trait]
impl Node for GenerateNode {
    async fn execute(&self, state: &mut ConversationState) -> Result<()> {
        state.retry_generate_count += 1;

        let input = generation_input(state);
        state.generation = match self.generator.generate(&input).await {
            Ok(answer) if !answer.trim().is_empty() => answer,
            Ok(_) => {
                tracing::warn!("Generator returned an empty answer");
                PROVIDER_ERROR_MESSAGE.to_string()
            }
            Err(e) => {
                tracing::warn!("Generator failed: {:#}", e);
                PROVIDER_ERROR_MESSAGE.to_string()
            }
        };

        tracing::debug!(attempt = state.retry_generate_count, "Answer generated");
        Ok(())
    }

    fn id(&self) -> NodeId {
        NodeId::Generate
    }
}

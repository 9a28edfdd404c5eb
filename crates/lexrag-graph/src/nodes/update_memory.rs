use crate::capabilities::Summarizer;
use crate::node::{Node, NodeId};
use anyhow::Result;
use async_trait::async_trait;
use lexrag_types::{ChatTurn, ConversationState};
use std::sync::Arc;

/// Appends the finished exchange to `chat_history` and its summary to `summary`.
pub struct UpdateMemoryNode {
    summarizer: Arc<dyn Summarizer>,
}

impl UpdateMemoryNode {
    pub fn new(summarizer: Arc<dyn Summarizer>) -> Self {
        Self { summarizer }
    }
}

#[async_trait]
impl Node for UpdateMemoryNode {
    async fn execute(&self, state: &mut ConversationState) -> Result<()> {
        if state.question.is_empty() || state.generation.is_empty() {
            return Ok(());
        }

        let turn = ChatTurn::new(state.question.clone(), state.generation.clone());
        let transcript = turn.transcript();

        // history and summary stay the same length
        let summary = match self.summarizer.summarize(&transcript).await {
            Ok(summary) if !summary.trim().is_empty() => summary,
            Ok(_) => transcript,
            Err(e) => {
                tracing::warn!("Summarizer failed, storing raw transcript: {:#}", e);
                transcript
            }
        };

        state.chat_history.push(turn);
        state.summary.push(summary);
        Ok(())
    }

    fn id(&self) -> NodeId {
        NodeId::UpdateMemory
    }
}

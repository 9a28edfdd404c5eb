use crate::node::{Node, NodeId};
use anyhow::Result;
use async_trait::async_trait;
use lexrag_types::messages::NO_INFORMATION_MESSAGE;
use lexrag_types::ConversationState;

/// Terminal escape once a retry budget is spent.
pub struct MaxRetriesNode;

#[async_trait]
impl Node for MaxRetriesNode {
    async fn execute(&self, state: &mut ConversationState) -> Result<()> {
        tracing::info!(
            generate = state.retry_generate_count,
            transform = state.retry_transform_count,
            "Retry budget exhausted"
        );
        state.documents.clear();
        state.generation = NO_INFORMATION_MESSAGE.to_string();
        Ok(())
    }

    fn id(&self) -> NodeId {
        NodeId::MaxRetries
    }
}

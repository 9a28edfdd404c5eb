use crate::capabilities::Rewriter;
use crate::node::{Node, NodeId};
use anyhow::Result;
use async_trait::async_trait;
use lexrag_types::ConversationState;
use std::sync::Arc;

/// Rewrites the question for another retrieval round. Documents are untouched.
pub struct TransformQueryNode {
    rewriter: Arc<dyn Rewriter>,
}

impl TransformQueryNode {
    pub fn new(rewriter: Arc<dyn Rewriter>) -> Self {
        Self { rewriter }
    }
}

#[async_trait]
impl Node for TransformQueryNode {
    async fn execute(&self, state: &mut ConversationState) -> Result<()> {
        state.retry_transform_count += 1;

        let result = self.rewriter.rewrite(&state.question, state.latest_summary()).await;
        match result {
            Ok(rewritten) if !rewritten.trim().is_empty() => {
                tracing::info!(attempt = state.retry_transform_count, question = %rewritten, "Question rewritten");
                state.question = rewritten;
            }
            Ok(_) => tracing::warn!("Rewriter returned nothing, keeping question"),
            Err(e) => tracing::warn!("Rewriter failed, keeping question: {:#}", e),
        }
        Ok(())
    }

    fn id(&self) -> NodeId {
        NodeId::TransformQuery
    }
}

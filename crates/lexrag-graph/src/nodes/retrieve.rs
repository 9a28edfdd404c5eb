use crate::node::{Node, NodeId};
use crate::nodes::passage_texts;
use anyhow::Result;
use async_trait::async_trait;
use lexrag_retrieval::{Passage, Retriever};
use lexrag_types::ConversationState;
use std::sync::Arc;

/// Exact-match passages first, then fused vector results.
pub struct RetrieveNode {
    exact_retriever: Arc<dyn Retriever>,
    fusion_retriever: Arc<dyn Retriever>,
}

impl RetrieveNode {
    pub fn new(exact_retriever: Arc<dyn Retriever>, fusion_retriever: Arc<dyn Retriever>) -> Self {
        Self {
            exact_retriever,
            fusion_retriever,
        }
    }
}

async fn search_or_empty(retriever: &dyn Retriever, query: &str) -> Vec<Passage> {
    match retriever.search(query).await {
        Ok(passages) => passages,
        Err(e) => {
            tracing::warn!(retriever = retriever.name(), "Retrieval failed: {:#}", e);
            Vec::new()
        }
    }
}

#[async_trait]
impl Node for RetrieveNode {
    async fn execute(&self, state: &mut ConversationState) -> Result<()> {
        let mut passages = search_or_empty(self.exact_retriever.as_ref(), &state.question).await;
        passages.extend(search_or_empty(self.fusion_retriever.as_ref(), &state.question).await);

        state.documents = passage_texts(passages);
        for doc in &state.documents {
            tracing::debug!(passage = %doc, "Retrieved");
        }
        Ok(())
    }

    fn id(&self) -> NodeId {
        NodeId::Retrieve
    }
}

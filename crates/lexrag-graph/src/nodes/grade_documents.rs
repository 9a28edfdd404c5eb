use crate::capabilities::{GradeInput, Grader};
use crate::node::{Node, NodeId};
use anyhow::Result;
use async_trait::async_trait;
use lexrag_types::ConversationState;
use std::sync::Arc;

/// Keeps the passages the grader calls relevant, in their original order.
pub struct GradeDocumentsNode {
    grader: Arc<dyn Grader>,
}

impl GradeDocumentsNode {
    pub fn new(grader: Arc<dyn Grader>) -> Self {
        Self { grader }
    }
}

#[async_trait]
impl Node for GradeDocumentsNode {
    async fn execute(&self, state: &mut ConversationState) -> Result<()> {
        let summary = state.latest_summary();
        let mut kept = Vec::with_capacity(state.documents.len());

        for document in &state.documents {
            let input = GradeInput::Relevance {
                question: &state.question,
                summary,
                document,
            };
            let relevant = match self.grader.grade(input).await {
                Ok(score) => score.is_yes(),
                Err(e) => {
                    tracing::warn!("Relevance grader failed, dropping passage: {:#}", e);
                    false
                }
            };
            if relevant {
                kept.push(document.clone());
            }
        }

        tracing::info!(kept = kept.len(), total = state.documents.len(), "Documents graded");
        state.documents = kept;
        Ok(())
    }

    fn id(&self) -> NodeId {
        NodeId::GradeDocuments
    }
}

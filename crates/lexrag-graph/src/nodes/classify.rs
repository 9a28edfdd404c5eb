use crate::capabilities::Classifier;
use crate::node::{Node, NodeId};
use crate::nodes::passage_texts;
use anyhow::Result;
use async_trait::async_trait;
use lexrag_retrieval::Retriever;
use lexrag_types::messages::{unsupported_domain_message, NON_LEGAL_MESSAGE, PROVIDER_ERROR_MESSAGE};
use lexrag_types::ConversationState;
use std::sync::Arc;

/// Classifies the question and tries an exact article lookup for legal ones.
///
/// Rejections write `generation`, which sends the turn straight to the end.
pub struct ClassifyQuestionNode {
    classifier: Arc<dyn Classifier>,
    exact_retriever: Arc<dyn Retriever>,
}

impl ClassifyQuestionNode {
    pub fn new(classifier: Arc<dyn Classifier>, exact_retriever: Arc<dyn Retriever>) -> Self {
        Self {
            classifier,
            exact_retriever,
        }
    }
}

#[async_trait]
impl Node for ClassifyQuestionNode {
    async fn execute(&self, state: &mut ConversationState) -> Result<()> {
        let result = self.classifier.classify(&state.question).await;
        let classification = match result {
            Ok(classification) => classification,
            Err(e) => {
                tracing::warn!("Classifier failed, ending turn: {:#}", e);
                state.documents.clear();
                state.generation = PROVIDER_ERROR_MESSAGE.to_string();
                return Ok(());
            }
        };

        tracing::info!(category = classification.category, "Question classified");

        if classification.is_non_legal() {
            state.documents.clear();
            state.generation = NON_LEGAL_MESSAGE.to_string();
            return Ok(());
        }
        if classification.is_unsupported() {
            state.documents.clear();
            state.generation = unsupported_domain_message(&classification.reason);
            return Ok(());
        }

        state.generation.clear();
        let exact = self.exact_retriever.search(&state.question).await;
        match exact {
            Ok(passages) if !passages.is_empty() => {
                tracing::debug!(count = passages.len(), "Exact article match, skipping grading");
                state.documents = passage_texts(passages);
                state.need_grade_docs = false;
            }
            // keep the previous turn's documents
            Ok(_) => {}
            Err(e) => tracing::warn!("Exact lookup failed: {:#}", e),
        }
        Ok(())
    }

    fn id(&self) -> NodeId {
        NodeId::ClassifyQuestion
    }
}

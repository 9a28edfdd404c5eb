use crate::passage::{Passage, ScoredPassage};
use anyhow::Result;
use async_trait::async_trait;

/// Anything that turns a question into an ordered list of passages.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Passage>>;

    fn name(&self) -> &str {
        "retriever"
    }
}

/// One similarity ranking over the corpus, best first.
#[async_trait]
pub trait VectorSearch: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<ScoredPassage>>;
}

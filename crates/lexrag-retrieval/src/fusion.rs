use crate::passage::{Passage, ScoredPassage};
use crate::traits::{Retriever, VectorSearch};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

pub const RRF_K: f64 = 60.0;
const DEFAULT_PREFETCH: usize = 20;
const DEFAULT_LIMIT: usize = 3;

/// Merge rankings by summing `1 / (k + rank)` per id (ranks are 1-based).
///
/// Equal scores keep the order in which ids were first seen.
pub fn reciprocal_rank_fusion(rankings: &[Vec<ScoredPassage>], k: f64, limit: usize) -> Vec<ScoredPassage> {
    let mut fused: Vec<ScoredPassage> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for ranking in rankings {
        for (rank, hit) in ranking.iter().enumerate() {
            let contribution = 1.0 / (k + (rank + 1) as f64);
            match positions.get(&hit.id) {
                Some(&pos) => fused[pos].score += contribution,
                None => {
                    positions.insert(hit.id.clone(), fused.len());
                    fused.push(ScoredPassage {
                        id: hit.id.clone(),
                        score: contribution,
                        passage: hit.passage.clone(),
                    });
                }
            }
        }
    }

    // stable sort preserves first appearance on ties
    fused.sort_by(|a, b| b.score.total_cmp(&a.score));
    fused.truncate(limit);
    fused
}

/// Two independent embedding searches fused into one ranking.
pub struct FusionRetriever {
    first: Arc<dyn VectorSearch>,
    second: Arc<dyn VectorSearch>,
    prefetch: usize,
    limit: usize,
}

impl FusionRetriever {
    pub fn new(first: Arc<dyn VectorSearch>, second: Arc<dyn VectorSearch>) -> Self {
        Self {
            first,
            second,
            prefetch: DEFAULT_PREFETCH,
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_prefetch(mut self, prefetch: usize) -> Self {
        self.prefetch = prefetch;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

#[async_trait]
impl Retriever for FusionRetriever {
    async fn search(&self, query: &str) -> Result<Vec<Passage>> {
        let (first, second) = tokio::try_join!(
            self.first.search(query, self.prefetch),
            self.second.search(query, self.prefetch),
        )?;

        tracing::debug!(
            first = first.len(),
            second = second.len(),
            "Fusing vector rankings"
        );

        Ok(reciprocal_rank_fusion(&[first, second], RRF_K, self.limit)
            .into_iter()
            .map(|hit| hit.passage)
            .collect())
    }

    fn name(&self) -> &str {
        "fusion"
    }
}

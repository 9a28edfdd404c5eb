pub mod fusion;
pub mod law_index;
pub mod passage;
pub mod qdrant;
pub mod traits;

pub use fusion::{reciprocal_rank_fusion, FusionRetriever, RRF_K};
pub use law_index::{LawIndexRetriever, LawReference, LawReferenceParser};
pub use passage::{Passage, ScoredPassage};
pub use qdrant::{QdrantConfig, QdrantSearch};
pub use traits::{Retriever, VectorSearch};

use anyhow::Result;
use async_trait::async_trait;
use lexrag_types::ConversationState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifiers of the processing units a turn can visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeId {
    ClassifyQuestion,
    Retrieve,
    GradeDocuments,
    Generate,
    TransformQuery,
    UpdateMemory,
    MaxRetries,
}

impl NodeId {
    pub const ALL: [NodeId; 7] = [
        NodeId::ClassifyQuestion,
        NodeId::Retrieve,
        NodeId::GradeDocuments,
        NodeId::Generate,
        NodeId::TransformQuery,
        NodeId::UpdateMemory,
        NodeId::MaxRetries,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClassifyQuestion => "classify_question",
            Self::Retrieve => "retrieve",
            Self::GradeDocuments => "grade_documents",
            Self::Generate => "generate",
            Self::TransformQuery => "transform_query",
            Self::UpdateMemory => "update_memory",
            Self::MaxRetries => "max_retries",
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core abstraction for a unit of computation in the graph
#[async_trait]
pub trait Node: Send + Sync {
    /// Apply this node's partial update to the state.
    ///
    /// Capability failures are handled inside the node; an `Err` here is fatal for the turn.
    async fn execute(&self, state: &mut ConversationState) -> Result<()>;

    fn id(&self) -> NodeId;
}

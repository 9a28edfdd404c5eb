pub mod builder;
pub mod capabilities;
pub mod graph;
pub mod llm_capabilities;
pub mod node;
pub mod nodes;
pub mod router;
pub mod streaming;
pub mod templates;
pub mod workflow;

pub use builder::{GraphBuilder, PersistenceConfig};
pub use capabilities::{
    BinaryScore, Capabilities, Classification, Classifier, GenerationInput, GradeInput, Grader,
    Generator, Rewriter, Summarizer,
};
pub use graph::{Edge, Graph, GraphError, GraphStep, Target};
pub use llm_capabilities::LlmBackend;
pub use node::{Node, NodeId};
pub use router::{
    decide_to_generate, grade_generation_v_documents_and_question, route_question,
    DocumentsRoute, GenerationRoute, QuestionRoute, Router,
};
pub use streaming::{EventSender, TurnHandle};
pub use workflow::{build_legal_graph, legal_workflow};

// Re-export key types from lexrag-types
pub use lexrag_types::{
    ChatTurn, ConversationState, GraphConfig, SessionMemory, StreamEvent, TurnInput,
};

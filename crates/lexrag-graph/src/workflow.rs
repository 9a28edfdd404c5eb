//! The legal QA workflow: seven nodes, three routers.
//!
//! ```text
//! classify_question --route_question--> retrieve | grade_documents | generate | END
//! retrieve --> grade_documents
//! grade_documents --decide_to_generate--> transform_query | generate | max_retries
//! transform_query --> retrieve
//! generate --grade_generation--> generate | update_memory | transform_query | max_retries
//! update_memory --> END
//! max_retries --> END
//! ```

use crate::builder::GraphBuilder;
use crate::capabilities::Capabilities;
use crate::graph::{Graph, Target};
use crate::node::NodeId;
use crate::nodes::{
    ClassifyQuestionNode, GenerateNode, GradeDocumentsNode, MaxRetriesNode, RetrieveNode,
    TransformQueryNode, UpdateMemoryNode,
};
use crate::router::{
    DocumentsRoute, DocumentsRouter, GenerationRoute, GenerationRouter, QuestionRoute,
    QuestionRouter,
};
use anyhow::Result;
use lexrag_types::GraphConfig;
use std::sync::Arc;

/// Wired builder; attach persistence before `build()` if needed.
pub fn legal_workflow(caps: &Capabilities, config: GraphConfig) -> GraphBuilder {
    let ceiling = config.retry_ceiling;

    Graph::builder()
        .config(config)
        .add_node(Arc::new(ClassifyQuestionNode::new(
            caps.classifier.clone(),
            caps.exact_retriever.clone(),
        )))
        .add_node(Arc::new(RetrieveNode::new(
            caps.exact_retriever.clone(),
            caps.fusion_retriever.clone(),
        )))
        .add_node(Arc::new(GradeDocumentsNode::new(caps.relevance_grader.clone())))
        .add_node(Arc::new(GenerateNode::new(caps.generator.clone())))
        .add_node(Arc::new(TransformQueryNode::new(caps.rewriter.clone())))
        .add_node(Arc::new(UpdateMemoryNode::new(caps.summarizer.clone())))
        .add_node(Arc::new(MaxRetriesNode))
        .set_entry(NodeId::ClassifyQuestion)
        .on_iteration_limit(NodeId::MaxRetries)
        .add_conditional_edges(
            NodeId::ClassifyQuestion,
            Arc::new(QuestionRouter),
            [
                (QuestionRoute::NoDocs.label(), Target::Node(NodeId::Retrieve)),
                (QuestionRoute::HistoryDocs.label(), Target::Node(NodeId::GradeDocuments)),
                (QuestionRoute::Generate.label(), Target::Node(NodeId::Generate)),
                (QuestionRoute::End.label(), Target::End),
            ],
        )
        .add_edge(NodeId::Retrieve, Target::Node(NodeId::GradeDocuments))
        .add_conditional_edges(
            NodeId::GradeDocuments,
            Arc::new(DocumentsRouter::new(ceiling)),
            [
                (DocumentsRoute::NotRelevant.label(), Target::Node(NodeId::TransformQuery)),
                (DocumentsRoute::Relevant.label(), Target::Node(NodeId::Generate)),
                (DocumentsRoute::MaxRetries.label(), Target::Node(NodeId::MaxRetries)),
            ],
        )
        .add_edge(NodeId::TransformQuery, Target::Node(NodeId::Retrieve))
        .add_conditional_edges(
            NodeId::Generate,
            Arc::new(GenerationRouter::new(
                caps.hallucination_grader.clone(),
                caps.answer_grader.clone(),
                ceiling,
            )),
            [
                (GenerationRoute::NotSupported.label(), Target::Node(NodeId::Generate)),
                (GenerationRoute::Useful.label(), Target::Node(NodeId::UpdateMemory)),
                (GenerationRoute::NotUseful.label(), Target::Node(NodeId::TransformQuery)),
                (GenerationRoute::MaxRetries.label(), Target::Node(NodeId::MaxRetries)),
            ],
        )
        .add_edge(NodeId::MaxRetries, Target::End)
        .add_edge(NodeId::UpdateMemory, Target::End)
}

pub fn build_legal_graph(caps: &Capabilities, config: GraphConfig) -> Result<Graph> {
    legal_workflow(caps, config).build()
}

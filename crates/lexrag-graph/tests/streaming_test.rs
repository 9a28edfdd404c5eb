mod common;

use anyhow::Result;
use async_trait::async_trait;
use common::{Doubles, ScriptedClassifier};
use lexrag_graph::{
    build_legal_graph, legal_workflow, ConversationState, Graph, GraphConfig, GraphError, Node,
    NodeId, Router, StreamEvent, Target, TurnInput,
};
use lexrag_persist::{InMemorySessionStore, SessionStore};
use lexrag_types::messages::NON_LEGAL_MESSAGE;
use std::sync::Arc;
use tokio::sync::mpsc;

async fn drain(events: &mut mpsc::Receiver<StreamEvent>) -> Vec<StreamEvent> {
    let mut collected = Vec::new();
    while let Some(event) = events.recv().await {
        collected.push(event);
    }
    collected
}

#[tokio::test]
async fn test_events_follow_node_order_then_response() {
    let doubles = Doubles::cooperative();
    let graph = build_legal_graph(&doubles.capabilities(), GraphConfig::default()).unwrap();

    let mut handle = graph.spawn_run(TurnInput::new("s1", "Thời hạn báo trước khi nghỉ việc?"));
    let events = drain(&mut handle.events).await;
    let state = handle.outcome.await.unwrap().unwrap();

    let expected_steps = ["classify_question", "retrieve", "grade_documents", "generate", "update_memory"];
    assert_eq!(events.len(), expected_steps.len() + 2);
    for (event, node) in events.iter().zip(expected_steps) {
        assert_eq!(event, &StreamEvent::step(node));
    }
    assert_eq!(events[5], StreamEvent::response(state.response_text()));
    assert_eq!(events[6], StreamEvent::Done);
}

#[tokio::test]
async fn test_rejected_question_streams_fixed_message() {
    let mut doubles = Doubles::cooperative();
    doubles.classifier = ScriptedClassifier::category(1);
    let graph = build_legal_graph(&doubles.capabilities(), GraphConfig::default()).unwrap();

    let mut handle = graph.spawn_run(TurnInput::new("s1", "Xin chào"));
    let events = drain(&mut handle.events).await;

    assert_eq!(
        events,
        vec![
            StreamEvent::step("classify_question"),
            StreamEvent::response(NON_LEGAL_MESSAGE),
            StreamEvent::Done,
        ]
    );
}

#[tokio::test]
async fn test_memory_saved_before_response() {
    let doubles = Doubles::cooperative();
    let store = Arc::new(InMemorySessionStore::new());
    let graph = legal_workflow(&doubles.capabilities(), GraphConfig::default())
        .with_persistence(store.clone())
        .build()
        .unwrap();

    let mut handle = graph.spawn_run(TurnInput::new("s1", "Thời hạn báo trước khi nghỉ việc?"));
    while let Some(event) = handle.events.recv().await {
        if matches!(event, StreamEvent::Response { .. }) {
            let stored = store.load("s1").await.unwrap();
            assert_eq!(stored.chat_history.len(), 1);
        }
    }
    handle.outcome.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_turn_completes_when_consumer_leaves() {
    let doubles = Doubles::cooperative();
    let store = Arc::new(InMemorySessionStore::new());
    let graph = legal_workflow(&doubles.capabilities(), GraphConfig::default().with_event_buffer(1))
        .with_persistence(store.clone())
        .build()
        .unwrap();

    let handle = graph.spawn_run(TurnInput::new("s1", "Thời hạn báo trước khi nghỉ việc?"));
    drop(handle.events);

    let state = handle.outcome.await.unwrap().unwrap();
    assert!(state.has_generation());
    assert_eq!(store.load("s1").await.unwrap().chat_history.len(), 1);
}

struct Answering;

#[async_trait]
impl Node for Answering {
    async fn execute(&self, state: &mut ConversationState) -> Result<()> {
        state.generation = "ok".to_string();
        Ok(())
    }

    fn id(&self) -> NodeId {
        NodeId::ClassifyQuestion
    }
}

struct Lost;

#[async_trait]
impl Router for Lost {
    async fn route(&self, _state: &ConversationState) -> &'static str {
        "nowhere"
    }

    fn name(&self) -> &'static str {
        "lost"
    }
}

#[tokio::test]
async fn test_engine_error_ends_stream_with_error() {
    let graph = Graph::builder()
        .add_node(Arc::new(Answering))
        .set_entry(NodeId::ClassifyQuestion)
        .add_conditional_edges(NodeId::ClassifyQuestion, Arc::new(Lost), [("somewhere", Target::End)])
        .build()
        .unwrap();

    let mut handle = graph.spawn_run(TurnInput::new("s1", "q"));
    let events = drain(&mut handle.events).await;

    assert_eq!(events.len(), 2);
    assert_eq!(events[0], StreamEvent::step("classify_question"));
    match &events[1] {
        StreamEvent::Error { message, node } => {
            assert!(message.contains("nowhere"));
            assert_eq!(node.as_deref(), Some("classify_question"));
        }
        other => panic!("expected error, got {:?}", other),
    }

    let err = handle.outcome.await.unwrap().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<GraphError>(),
        Some(GraphError::MissingBranch { label: "nowhere", .. })
    ));
}

#[test]
fn test_builder_rejects_missing_entry() {
    let err = Graph::builder()
        .add_node(Arc::new(Answering))
        .add_edge(NodeId::ClassifyQuestion, Target::End)
        .build()
        .err()
        .unwrap();
    assert!(matches!(err.downcast_ref::<GraphError>(), Some(GraphError::MissingEntry)));
}

#[test]
fn test_builder_rejects_unknown_target() {
    let err = Graph::builder()
        .add_node(Arc::new(Answering))
        .set_entry(NodeId::ClassifyQuestion)
        .add_edge(NodeId::ClassifyQuestion, Target::Node(NodeId::Retrieve))
        .build()
        .err()
        .unwrap();
    assert!(matches!(
        err.downcast_ref::<GraphError>(),
        Some(GraphError::UnknownNode(NodeId::Retrieve))
    ));
}

#[test]
fn test_builder_rejects_dangling_node() {
    let err = Graph::builder()
        .add_node(Arc::new(Answering))
        .set_entry(NodeId::ClassifyQuestion)
        .build()
        .err()
        .unwrap();
    assert!(matches!(
        err.downcast_ref::<GraphError>(),
        Some(GraphError::MissingEdge(NodeId::ClassifyQuestion))
    ));
}

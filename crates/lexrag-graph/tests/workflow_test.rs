mod common;

use common::{Doubles, FnGrader, ScriptedClassifier, ScriptedRetriever, ScriptedRewriter, ScriptedSummarizer};
use futures::TryStreamExt;
use lexrag_graph::{
    build_legal_graph, legal_workflow, BinaryScore, ConversationState, Graph, GradeInput,
    GraphConfig, NodeId, SessionMemory, TurnInput,
};
use lexrag_persist::{InMemorySessionStore, SessionStore};
use lexrag_types::messages::{NON_LEGAL_MESSAGE, NO_INFORMATION_MESSAGE, PROVIDER_ERROR_MESSAGE, SOURCES_HEADER};
use std::sync::Arc;

use NodeId::{ClassifyQuestion, Generate, GradeDocuments, MaxRetries, Retrieve, TransformQuery, UpdateMemory};

const GENERAL_QUESTION: &str = "Người lao động nghỉ việc cần báo trước bao nhiêu ngày?";
const ARTICLE_QUESTION: &str = "Điều 35 Bộ luật Lao động quy định gì?";

fn graph(doubles: &Doubles) -> Graph {
    build_legal_graph(&doubles.capabilities(), GraphConfig::default()).unwrap()
}

async fn run(graph: &Graph, input: TurnInput) -> (Vec<NodeId>, ConversationState) {
    let state = graph.prepare(input).await;
    let visited: Vec<(NodeId, ConversationState)> = graph.stream(state).try_collect().await.unwrap();
    let path = visited.iter().map(|(node, _)| *node).collect();
    let last = visited.last().map(|(_, state)| state.clone()).unwrap();
    (path, last)
}

fn assert_budgets(state: &ConversationState) {
    assert!(state.retry_generate_count <= 3, "generate count {}", state.retry_generate_count);
    assert!(state.retry_transform_count <= 3, "transform count {}", state.retry_transform_count);
    assert!(state.has_generation());
}

#[tokio::test]
async fn test_answer_from_fused_passages() {
    let doubles = Doubles::cooperative();
    let (path, state) = run(&graph(&doubles), TurnInput::new("s1", GENERAL_QUESTION)).await;

    assert_eq!(path, vec![ClassifyQuestion, Retrieve, GradeDocuments, Generate, UpdateMemory]);
    assert_eq!(state.documents.len(), 2);
    assert_eq!(state.retry_generate_count, 1);
    assert_eq!(state.retry_transform_count, 0);
    assert_eq!(state.chat_history.len(), 1);
    assert_eq!(state.chat_history[0].question, GENERAL_QUESTION);
    assert_eq!(state.chat_history[0].answer, state.generation);
    assert_eq!(state.summary.len(), 1);

    let response = state.response_text();
    assert!(response.starts_with(&state.generation));
    assert!(response.contains(SOURCES_HEADER));
    assert!(response.contains("- Điều 36."));
}

#[tokio::test]
async fn test_exact_article_skips_grading() {
    let doubles = Doubles::cooperative();
    let (path, state) = run(&graph(&doubles), TurnInput::new("s1", ARTICLE_QUESTION)).await;

    assert_eq!(path, vec![ClassifyQuestion, Generate, UpdateMemory]);
    assert!(!state.need_grade_docs);
    assert_eq!(state.documents.len(), 1);
    assert!(state.documents[0].starts_with("Điều 35."));
    assert_eq!(doubles.relevance.calls.get(), 0);
    assert_eq!(doubles.fusion.calls.get(), 0);
}

#[tokio::test]
async fn test_non_legal_question_ends_without_retrieval() {
    let mut doubles = Doubles::cooperative();
    doubles.classifier = ScriptedClassifier::category(1);

    let memory = SessionMemory {
        documents: vec!["Điều 36. ...".to_string()],
        ..SessionMemory::default()
    };
    let input = TurnInput::new("s1", "Hôm nay trời có mưa không?").with_memory(memory);
    let (path, state) = run(&graph(&doubles), input).await;

    assert_eq!(path, vec![ClassifyQuestion]);
    assert_eq!(state.generation, NON_LEGAL_MESSAGE);
    assert!(state.documents.is_empty());
    assert_eq!(doubles.exact.calls.get(), 0);
    assert_eq!(doubles.fusion.calls.get(), 0);
    assert_eq!(doubles.generator.calls.get(), 0);
}

#[tokio::test]
async fn test_unsupported_domain_carries_reason() {
    let mut doubles = Doubles::cooperative();
    doubles.classifier = ScriptedClassifier::category(7);

    let (path, state) = run(&graph(&doubles), TurnInput::new("s1", "Thủ tục cấp sổ đỏ?")).await;

    assert_eq!(path, vec![ClassifyQuestion]);
    assert!(state.generation.contains("Thuộc lĩnh vực đất đai."));
    assert!(state.documents.is_empty());
}

#[tokio::test]
async fn test_classifier_failure_apologises() {
    let mut doubles = Doubles::cooperative();
    doubles.classifier = ScriptedClassifier::failing();

    let (path, state) = run(&graph(&doubles), TurnInput::new("s1", GENERAL_QUESTION)).await;

    assert_eq!(path, vec![ClassifyQuestion]);
    assert_eq!(state.generation, PROVIDER_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_previous_documents_are_regraded() {
    let doubles = Doubles::cooperative();
    let memory = SessionMemory {
        documents: vec!["Điều 36. Quyền đơn phương chấm dứt hợp đồng".to_string()],
        ..SessionMemory::default()
    };
    let input = TurnInput::new("s1", "Còn người sử dụng lao động thì sao?").with_memory(memory);
    let (path, state) = run(&graph(&doubles), input).await;

    assert_eq!(path, vec![ClassifyQuestion, GradeDocuments, Generate, UpdateMemory]);
    assert_eq!(doubles.fusion.calls.get(), 0);
    assert_eq!(doubles.relevance.calls.get(), 1);
    assert_eq!(state.documents.len(), 1);
}

#[tokio::test]
async fn test_nothing_relevant_exhausts_rewrites() {
    let mut doubles = Doubles::cooperative();
    doubles.relevance = FnGrader::always(BinaryScore::No);

    let (path, state) = run(&graph(&doubles), TurnInput::new("s1", GENERAL_QUESTION)).await;

    let mut expected = vec![ClassifyQuestion, Retrieve, GradeDocuments];
    for _ in 0..3 {
        expected.extend([TransformQuery, Retrieve, GradeDocuments]);
    }
    expected.push(MaxRetries);
    assert_eq!(path, expected);

    assert_eq!(state.retry_transform_count, 3);
    assert_eq!(state.retry_generate_count, 0);
    assert_eq!(state.generation, NO_INFORMATION_MESSAGE);
    assert!(state.documents.is_empty());
    assert!(state.chat_history.is_empty());
    assert_eq!(doubles.generator.calls.get(), 0);
    assert_eq!(doubles.rewriter.calls.get(), 3);
    assert_budgets(&state);
}

#[tokio::test]
async fn test_ungrounded_answers_exhaust_regenerations() {
    let mut doubles = Doubles::cooperative();
    doubles.hallucination = FnGrader::always(BinaryScore::No);

    let (path, state) = run(&graph(&doubles), TurnInput::new("s1", GENERAL_QUESTION)).await;

    assert_eq!(
        path,
        vec![ClassifyQuestion, Retrieve, GradeDocuments, Generate, Generate, Generate, MaxRetries]
    );
    assert_eq!(state.retry_generate_count, 3);
    assert_eq!(state.generation, NO_INFORMATION_MESSAGE);
    assert_eq!(doubles.hallucination.calls.get(), 3);
    assert_eq!(doubles.answer.calls.get(), 0);
    assert_budgets(&state);
}

#[tokio::test]
async fn test_failing_grounding_grader_is_fail_closed() {
    let mut doubles = Doubles::cooperative();
    doubles.hallucination = FnGrader::failing();

    let (path, state) = run(&graph(&doubles), TurnInput::new("s1", GENERAL_QUESTION)).await;

    assert_eq!(path.last(), Some(&MaxRetries));
    assert_eq!(path.iter().filter(|n| **n == Generate).count(), 3);
    assert_eq!(state.generation, NO_INFORMATION_MESSAGE);
}

#[tokio::test]
async fn test_unhelpful_answers_never_exceed_budgets() {
    let mut doubles = Doubles::cooperative();
    doubles.answer = FnGrader::always(BinaryScore::No);

    let (path, state) = run(&graph(&doubles), TurnInput::new("s1", GENERAL_QUESTION)).await;

    assert_eq!(
        path,
        vec![
            ClassifyQuestion,
            Retrieve,
            GradeDocuments,
            Generate,
            TransformQuery,
            Retrieve,
            GradeDocuments,
            Generate,
            TransformQuery,
            Retrieve,
            GradeDocuments,
            Generate,
            MaxRetries,
        ]
    );
    assert_eq!(state.retry_generate_count, 3);
    assert_eq!(state.retry_transform_count, 2);
    assert_budgets(&state);
}

#[tokio::test]
async fn test_grading_filter_keeps_order() {
    let mut doubles = Doubles::cooperative();
    doubles.fusion = ScriptedRetriever::returning(vec!["Điều 1. a", "Khoản ngoài lề", "Điều 2. b", "Điều 3. c"]);
    doubles.relevance = FnGrader::new(|input| match input {
        GradeInput::Relevance { document, .. } => {
            Some(if document.starts_with("Điều") { BinaryScore::Yes } else { BinaryScore::No })
        }
        _ => None,
    });

    let (_, state) = run(&graph(&doubles), TurnInput::new("s1", GENERAL_QUESTION)).await;

    assert_eq!(state.documents, vec!["Điều 1. a", "Điều 2. b", "Điều 3. c"]);
}

#[tokio::test]
async fn test_retrieval_failure_counts_as_no_passages() {
    let mut doubles = Doubles::cooperative();
    doubles.fusion = ScriptedRetriever::failing();
    doubles.rewriter = ScriptedRewriter::failing();

    let (path, state) = run(&graph(&doubles), TurnInput::new("s1", GENERAL_QUESTION)).await;

    assert_eq!(path.last(), Some(&MaxRetries));
    assert_eq!(state.question, GENERAL_QUESTION);
    assert_eq!(state.retry_transform_count, 3);
    assert_eq!(doubles.fusion.calls.get(), 4);
}

#[tokio::test]
async fn test_summarizer_failure_keeps_transcript() {
    let mut doubles = Doubles::cooperative();
    doubles.summarizer = ScriptedSummarizer::failing();

    let (_, state) = run(&graph(&doubles), TurnInput::new("s1", GENERAL_QUESTION)).await;

    assert_eq!(state.summary.len(), 1);
    assert_eq!(state.summary[0], state.chat_history[0].transcript());
}

#[tokio::test]
async fn test_iteration_limit_diverts_to_max_retries() {
    let doubles = Doubles::cooperative();
    let config = GraphConfig::default().with_max_iterations(2);
    let graph = build_legal_graph(&doubles.capabilities(), config).unwrap();

    let (path, state) = run(&graph, TurnInput::new("s1", GENERAL_QUESTION)).await;

    assert_eq!(path, vec![ClassifyQuestion, Retrieve, MaxRetries]);
    assert_eq!(state.generation, NO_INFORMATION_MESSAGE);
}

#[tokio::test]
async fn test_memory_persists_across_turns() {
    let doubles = Doubles::cooperative();
    let store = Arc::new(InMemorySessionStore::new());
    let graph = legal_workflow(&doubles.capabilities(), GraphConfig::default())
        .with_persistence(store.clone())
        .build()
        .unwrap();
    assert!(graph.has_persistence());

    let first = graph.run_turn(TurnInput::new("s1", GENERAL_QUESTION)).await.unwrap();
    let stored = store.load("s1").await.unwrap();
    assert_eq!(stored.chat_history, first.chat_history);
    assert_eq!(stored.summary, first.summary);
    assert_eq!(stored.documents, first.documents);

    // the follow-up starts from the stored passages
    let second = graph.run_turn(TurnInput::new("s1", "Còn thời hạn báo trước?")).await.unwrap();
    assert_eq!(second.chat_history.len(), 2);
    assert_eq!(second.chat_history[0], first.chat_history[0]);
    assert_eq!(second.summary.len(), 2);

    // a rejected question leaves the stored memory as it was
    let mut rejecting = Doubles::cooperative();
    rejecting.classifier = ScriptedClassifier::category(1);
    let rejecting_graph = legal_workflow(&rejecting.capabilities(), GraphConfig::default())
        .with_persistence(store.clone())
        .build()
        .unwrap();
    let third = rejecting_graph.run_turn(TurnInput::new("s1", "Chào bạn")).await.unwrap();
    assert_eq!(third.generation, NON_LEGAL_MESSAGE);

    let stored = store.load("s1").await.unwrap();
    assert_eq!(stored.chat_history.len(), 2);
    assert_eq!(stored.summary.len(), 2);
    assert_eq!(stored.documents, second.documents);

    assert!(store.load("other").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_caller_memory_wins_over_store() {
    let doubles = Doubles::cooperative();
    let store = Arc::new(InMemorySessionStore::new());
    store
        .save(
            "s1",
            &SessionMemory {
                summary: vec!["stored".to_string()],
                ..SessionMemory::default()
            },
        )
        .await
        .unwrap();
    let graph = legal_workflow(&doubles.capabilities(), GraphConfig::default())
        .with_persistence(store)
        .build()
        .unwrap();

    let supplied = SessionMemory {
        summary: vec!["supplied".to_string()],
        ..SessionMemory::default()
    };
    let state = graph.prepare(TurnInput::new("s1", "q").with_memory(supplied)).await;
    assert_eq!(state.summary, vec!["supplied"]);

    let state = graph.prepare(TurnInput::new("s1", "q")).await;
    assert_eq!(state.summary, vec!["stored"]);
}

use crate::capabilities::{GradeInput, Grader};
use async_trait::async_trait;
use lexrag_types::ConversationState;
use std::sync::Arc;

/// Decides which branch to take after a node, by label
#[async_trait]
pub trait Router: Send + Sync {
    async fn route(&self, state: &ConversationState) -> &'static str;

    fn name(&self) -> &'static str;
}

/// Branches out of `classify_question`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionRoute {
    End,
    HistoryDocs,
    Generate,
    NoDocs,
}

impl QuestionRoute {
    pub fn label(self) -> &'static str {
        match self {
            Self::End => "end",
            Self::HistoryDocs => "history docs",
            Self::Generate => "generate",
            Self::NoDocs => "no docs",
        }
    }
}

/// Branches out of `grade_documents`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentsRoute {
    NotRelevant,
    Relevant,
    MaxRetries,
}

impl DocumentsRoute {
    pub fn label(self) -> &'static str {
        match self {
            Self::NotRelevant => "not relevant",
            Self::Relevant => "relevant",
            Self::MaxRetries => "max retries",
        }
    }
}

/// Branches out of `generate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationRoute {
    NotSupported,
    Useful,
    NotUseful,
    MaxRetries,
}

impl GenerationRoute {
    pub fn label(self) -> &'static str {
        match self {
            Self::NotSupported => "not supported",
            Self::Useful => "useful",
            Self::NotUseful => "not useful",
            Self::MaxRetries => "max retries",
        }
    }
}

pub fn route_question(state: &ConversationState) -> QuestionRoute {
    if state.has_generation() {
        QuestionRoute::End
    } else if state.has_documents() && state.need_grade_docs {
        QuestionRoute::HistoryDocs
    } else if state.has_documents() {
        QuestionRoute::Generate
    } else {
        QuestionRoute::NoDocs
    }
}

pub fn decide_to_generate(state: &ConversationState, ceiling: u32) -> DocumentsRoute {
    if state.has_documents() {
        DocumentsRoute::Relevant
    } else if state.retry_transform_count >= ceiling {
        DocumentsRoute::MaxRetries
    } else {
        DocumentsRoute::NotRelevant
    }
}

/// Pure part of the post-generation decision, given both grades.
///
/// A rewrite always leads to one more generation, so "not useful" also
/// requires generation budget to be left.
pub fn generation_route(
    state: &ConversationState,
    grounded: bool,
    addresses_question: bool,
    ceiling: u32,
) -> GenerationRoute {
    let generate_left = state.retry_generate_count < ceiling;

    if !grounded {
        return if generate_left {
            GenerationRoute::NotSupported
        } else {
            GenerationRoute::MaxRetries
        };
    }
    if addresses_question {
        return GenerationRoute::Useful;
    }
    if state.retry_transform_count >= ceiling || !generate_left {
        return if generate_left {
            GenerationRoute::NotSupported
        } else {
            GenerationRoute::MaxRetries
        };
    }
    GenerationRoute::NotUseful
}

/// Hallucination gate then adequacy gate. Grader failures count as "no".
pub async fn grade_generation_v_documents_and_question(
    state: &ConversationState,
    hallucination_grader: &dyn Grader,
    answer_grader: &dyn Grader,
    ceiling: u32,
) -> GenerationRoute {
    let grounded = passes(
        hallucination_grader,
        GradeInput::Grounding {
            documents: &state.documents,
            generation: &state.generation,
        },
    )
    .await;

    // the adequacy grader only runs on grounded answers
    let addresses_question = grounded
        && passes(
            answer_grader,
            GradeInput::Adequacy {
                question: &state.question,
                summary: state.latest_summary(),
                generation: &state.generation,
            },
        )
        .await;

    generation_route(state, grounded, addresses_question, ceiling)
}

async fn passes(grader: &dyn Grader, input: GradeInput<'_>) -> bool {
    let kind = input.kind();
    match grader.grade(input).await {
        Ok(score) => score.is_yes(),
        Err(e) => {
            tracing::warn!(grade = kind, "Grader failed, treating as \"no\": {:#}", e);
            false
        }
    }
}

pub struct QuestionRouter;

#[async_trait]
impl Router for QuestionRouter {
    async fn route(&self, state: &ConversationState) -> &'static str {
        route_question(state).label()
    }

    fn name(&self) -> &'static str {
        "route_question"
    }
}

pub struct DocumentsRouter {
    ceiling: u32,
}

impl DocumentsRouter {
    pub fn new(ceiling: u32) -> Self {
        Self { ceiling }
    }
}

#[async_trait]
impl Router for DocumentsRouter {
    async fn route(&self, state: &ConversationState) -> &'static str {
        decide_to_generate(state, self.ceiling).label()
    }

    fn name(&self) -> &'static str {
        "decide_to_generate"
    }
}

pub struct GenerationRouter {
    hallucination_grader: Arc<dyn Grader>,
    answer_grader: Arc<dyn Grader>,
    ceiling: u32,
}

impl GenerationRouter {
    pub fn new(hallucination_grader: Arc<dyn Grader>, answer_grader: Arc<dyn Grader>, ceiling: u32) -> Self {
        Self {
            hallucination_grader,
            answer_grader,
            ceiling,
        }
    }
}

#[async_trait]
impl Router for GenerationRouter {
    async fn route(&self, state: &ConversationState) -> &'static str {
        grade_generation_v_documents_and_question(
            state,
            self.hallucination_grader.as_ref(),
            self.answer_grader.as_ref(),
            self.ceiling,
        )
        .await
        .label()
    }

    fn name(&self) -> &'static str {
        "grade_generation_v_documents_and_question"
    }
}

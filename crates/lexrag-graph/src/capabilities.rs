//! Contracts for the external capabilities the graph consumes.
//!
//! Nodes depend only on these traits; LLM-backed implementations live in
//! `llm_capabilities`, tests plug in scripted doubles.

use anyhow::Result;
use async_trait::async_trait;
use lexrag_retrieval::Retriever;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Category 1: not a legal question.
pub const CATEGORY_NON_LEGAL: u8 = 1;
/// Category 7: legal, but outside the supported bodies of law.
pub const CATEGORY_UNSUPPORTED: u8 = 7;

/// Outcome of question classification, category in `1..=7`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: u8,
    #[serde(default)]
    pub reason: String,
}

impl Classification {
    pub fn new(category: u8, reason: impl Into<String>) -> Self {
        Self {
            category,
            reason: reason.into(),
        }
    }

    pub fn is_non_legal(&self) -> bool {
        self.category == CATEGORY_NON_LEGAL
    }

    pub fn is_unsupported(&self) -> bool {
        self.category == CATEGORY_UNSUPPORTED
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryScore {
    Yes,
    No,
}

impl BinaryScore {
    pub fn is_yes(self) -> bool {
        self == Self::Yes
    }
}

/// What a grader is asked to judge. One contract, three call sites.
#[derive(Debug, Clone, Copy)]
pub enum GradeInput<'a> {
    /// Is this passage relevant to the question in its conversational context?
    Relevance {
        question: &'a str,
        summary: &'a str,
        document: &'a str,
    },
    /// Is the answer supported by the passages?
    Grounding {
        documents: &'a [String],
        generation: &'a str,
    },
    /// Does the answer address the question?
    Adequacy {
        question: &'a str,
        summary: &'a str,
        generation: &'a str,
    },
}

impl GradeInput<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Relevance { .. } => "relevance",
            Self::Grounding { .. } => "grounding",
            Self::Adequacy { .. } => "adequacy",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationInput {
    pub question: String,
    pub documents: Vec<String>,
    /// Last one or two summary entries, newline-joined
    pub summary: String,
    /// "User:/AI:" transcript of the previous exchange
    pub history: String,
}

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, question: &str) -> Result<Classification>;
}

#[async_trait]
pub trait Grader: Send + Sync {
    async fn grade(&self, input: GradeInput<'_>) -> Result<BinaryScore>;
}

#[async_trait]
pub trait Rewriter: Send + Sync {
    async fn rewrite(&self, question: &str, summary: &str) -> Result<String>;
}

#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, input: &GenerationInput) -> Result<String>;
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, transcript: &str) -> Result<String>;
}

/// Everything the nodes call out to, constructed once and shared by every turn.
#[derive(Clone)]
pub struct Capabilities {
    pub classifier: Arc<dyn Classifier>,
    pub exact_retriever: Arc<dyn Retriever>,
    pub fusion_retriever: Arc<dyn Retriever>,
    pub relevance_grader: Arc<dyn Grader>,
    pub hallucination_grader: Arc<dyn Grader>,
    pub answer_grader: Arc<dyn Grader>,
    pub rewriter: Arc<dyn Rewriter>,
    pub generator: Arc<dyn Generator>,
    pub summarizer: Arc<dyn Summarizer>,
}

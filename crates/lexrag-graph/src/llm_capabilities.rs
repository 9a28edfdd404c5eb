//! Capabilities backed by a chat model (usually a fallback chain).

use crate::capabilities::{
    BinaryScore, Capabilities, Classification, Classifier, GenerationInput, GradeInput, Grader,
    Generator, Rewriter, Summarizer,
};
use crate::templates::{self, render};
use anyhow::{Context, Result};
use async_trait::async_trait;
use lexrag_llm::{parse_structured, ChatClient, ChatRequest, Message, ModelProfile};
use lexrag_retrieval::Retriever;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// A chat client plus the model name sent with each request.
#[derive(Clone)]
pub struct LlmBackend {
    client: Arc<dyn ChatClient>,
    model: String,
}

impl LlmBackend {
    pub fn new(client: Arc<dyn ChatClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    async fn complete(
        &self,
        system: &str,
        user: String,
        profile: &ModelProfile,
        json_mode: bool,
    ) -> Result<String> {
        let request = ChatRequest::new(
            self.model.as_str(),
            vec![Message::system(system), Message::human(user)],
        )
        .with_options(profile.chat_options().json_mode(json_mode));

        let text = self.client.chat(request).await?.into_text()?;
        Ok(text.trim().to_string())
    }

    /// Every capability on one backend, with the original sampling profiles.
    pub fn capabilities(
        &self,
        exact_retriever: Arc<dyn Retriever>,
        fusion_retriever: Arc<dyn Retriever>,
    ) -> Capabilities {
        Capabilities {
            classifier: Arc::new(LlmClassifier::new(self.clone())),
            exact_retriever,
            fusion_retriever,
            relevance_grader: Arc::new(LlmGrader::new(self.clone())),
            hallucination_grader: Arc::new(LlmGrader::new(self.clone())),
            answer_grader: Arc::new(LlmGrader::new(self.clone())),
            rewriter: Arc::new(LlmRewriter::new(self.clone())),
            generator: Arc::new(LlmGenerator::new(self.clone())),
            summarizer: Arc::new(LlmSummarizer::new(self.clone())),
        }
    }
}

pub struct LlmClassifier {
    backend: LlmBackend,
    profile: ModelProfile,
}

impl LlmClassifier {
    pub fn new(backend: LlmBackend) -> Self {
        Self {
            backend,
            profile: ModelProfile::deterministic(),
        }
    }
}

#[derive(Deserialize)]
struct RawClassification {
    category: Value,
    #[serde(default)]
    reason: String,
}

/// Accepts `"3"` or `3`; anything outside `1..=7` is an error.
fn parse_classification(raw: &str) -> Result<Classification> {
    let parsed: RawClassification = parse_structured(raw)?;
    let category = match &parsed.category {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
    .filter(|c| (1..=7).contains(c))
    .with_context(|| format!("Invalid category: {}", parsed.category))?;

    Ok(Classification::new(category as u8, parsed.reason))
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn classify(&self, question: &str) -> Result<Classification> {
        let raw = self
            .backend
            .complete(templates::CLASSIFIER_PROMPT, question.to_string(), &self.profile, true)
            .await?;
        parse_classification(&raw)
    }
}

/// Structured yes/no grader; the prompt is chosen by the input kind.
pub struct LlmGrader {
    backend: LlmBackend,
    profile: ModelProfile,
}

impl LlmGrader {
    pub fn new(backend: LlmBackend) -> Self {
        Self {
            backend,
            profile: ModelProfile::deterministic(),
        }
    }
}

#[derive(Deserialize)]
struct RawScore {
    binary_score: String,
}

fn parse_score(raw: &str) -> Result<BinaryScore> {
    let parsed: RawScore = parse_structured(raw)?;
    match parsed.binary_score.trim().to_lowercase().as_str() {
        "yes" => Ok(BinaryScore::Yes),
        "no" => Ok(BinaryScore::No),
        other => anyhow::bail!("Invalid binary_score: {:?}", other),
    }
}

#[async_trait]
impl Grader for LlmGrader {
    async fn grade(&self, input: GradeInput<'_>) -> Result<BinaryScore> {
        let (system, user) = match input {
            GradeInput::Relevance { question, summary, document } => (
                templates::RELEVANCE_PROMPT,
                render(
                    templates::RELEVANCE_INPUT,
                    &[("document", document), ("summary", summary), ("question", question)],
                ),
            ),
            GradeInput::Grounding { documents, generation } => (
                templates::GROUNDING_PROMPT,
                render(
                    templates::GROUNDING_INPUT,
                    &[
                        ("documents", &templates::join_documents(documents)),
                        ("generation", generation),
                    ],
                ),
            ),
            GradeInput::Adequacy { question, summary, generation } => (
                templates::ADEQUACY_PROMPT,
                render(
                    templates::ADEQUACY_INPUT,
                    &[("summary", summary), ("question", question), ("generation", generation)],
                ),
            ),
        };

        let raw = self.backend.complete(system, user, &self.profile, true).await?;
        parse_score(&raw).with_context(|| format!("{} grading failed", input.kind()))
    }
}

pub struct LlmRewriter {
    backend: LlmBackend,
    profile: ModelProfile,
}

impl LlmRewriter {
    pub fn new(backend: LlmBackend) -> Self {
        Self {
            backend,
            profile: ModelProfile::deterministic(),
        }
    }
}

#[async_trait]
impl Rewriter for LlmRewriter {
    async fn rewrite(&self, question: &str, summary: &str) -> Result<String> {
        let user = render(templates::REWRITE_INPUT, &[("summary", summary), ("question", question)]);
        self.backend
            .complete(templates::REWRITE_PROMPT, user, &self.profile, false)
            .await
    }
}

pub struct LlmGenerator {
    backend: LlmBackend,
    profile: ModelProfile,
}

impl LlmGenerator {
    pub fn new(backend: LlmBackend) -> Self {
        Self {
            backend,
            profile: ModelProfile::answer(),
        }
    }
}

#[async_trait]
impl Generator for LlmGenerator {
    async fn generate(&self, input: &GenerationInput) -> Result<String> {
        let user = render(
            templates::ANSWER_INPUT,
            &[
                ("summary", &input.summary),
                ("history", &input.history),
                ("documents", &templates::join_documents(&input.documents)),
                ("question", &input.question),
            ],
        );
        self.backend
            .complete(templates::ANSWER_PROMPT, user, &self.profile, false)
            .await
    }
}

pub struct LlmSummarizer {
    backend: LlmBackend,
    profile: ModelProfile,
}

impl LlmSummarizer {
    pub fn new(backend: LlmBackend) -> Self {
        Self {
            backend,
            profile: ModelProfile::summary(),
        }
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, transcript: &str) -> Result<String> {
        let user = render(templates::SUMMARY_INPUT, &[("history", transcript)]);
        self.backend
            .complete(templates::SUMMARY_PROMPT, user, &self.profile, false)
            .await
    }
}

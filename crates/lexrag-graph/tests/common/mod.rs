#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use lexrag_graph::{
    BinaryScore, Capabilities, Classification, Classifier, GenerationInput, GradeInput, Grader,
    Generator, Rewriter, Summarizer,
};
use lexrag_retrieval::{Passage, Retriever};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
pub struct Calls(AtomicUsize);

impl Calls {
    pub fn hit(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct ScriptedClassifier {
    outcome: Option<Classification>,
    pub calls: Calls,
}

impl ScriptedClassifier {
    pub fn category(category: u8) -> Arc<Self> {
        Arc::new(Self {
            outcome: Some(Classification::new(category, "Thuộc lĩnh vực đất đai.")),
            calls: Calls::default(),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            outcome: None,
            calls: Calls::default(),
        })
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    async fn classify(&self, _question: &str) -> Result<Classification> {
        self.calls.hit();
        self.outcome.clone().ok_or_else(|| anyhow::anyhow!("classifier quota exceeded"))
    }
}

/// Returns its passages when the query contains `trigger` (always, if none).
pub struct ScriptedRetriever {
    trigger: Option<&'static str>,
    passages: Vec<&'static str>,
    failing: bool,
    pub calls: Calls,
}

impl ScriptedRetriever {
    pub fn returning(passages: Vec<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            trigger: None,
            passages,
            failing: false,
            calls: Calls::default(),
        })
    }

    pub fn when_contains(trigger: &'static str, passages: Vec<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            trigger: Some(trigger),
            passages,
            failing: false,
            calls: Calls::default(),
        })
    }

    pub fn empty() -> Arc<Self> {
        Self::returning(Vec::new())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            trigger: None,
            passages: Vec::new(),
            failing: true,
            calls: Calls::default(),
        })
    }
}

#[async_trait]
impl Retriever for ScriptedRetriever {
    async fn search(&self, query: &str) -> Result<Vec<Passage>> {
        self.calls.hit();
        if self.failing {
            anyhow::bail!("vector store unreachable");
        }
        if matches!(self.trigger, Some(t) if !query.contains(t)) {
            return Ok(Vec::new());
        }
        Ok(self.passages.iter().map(|p| Passage::new(*p)).collect())
    }
}

type GradeFn = dyn Fn(&GradeInput<'_>) -> Option<BinaryScore> + Send + Sync;

/// `None` from the closure means the grader call fails.
pub struct FnGrader {
    decide: Box<GradeFn>,
    pub calls: Calls,
}

impl FnGrader {
    pub fn new(decide: impl Fn(&GradeInput<'_>) -> Option<BinaryScore> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            decide: Box::new(decide),
            calls: Calls::default(),
        })
    }

    pub fn always(score: BinaryScore) -> Arc<Self> {
        Self::new(move |_| Some(score))
    }

    pub fn failing() -> Arc<Self> {
        Self::new(|_| None)
    }
}

#[async_trait]
impl Grader for FnGrader {
    async fn grade(&self, input: GradeInput<'_>) -> Result<BinaryScore> {
        self.calls.hit();
        (self.decide)(&input).ok_or_else(|| anyhow::anyhow!("grader timed out"))
    }
}

pub struct ScriptedGenerator {
    failing: bool,
    pub calls: Calls,
}

impl ScriptedGenerator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            failing: false,
            calls: Calls::default(),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            failing: true,
            calls: Calls::default(),
        })
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, input: &GenerationInput) -> Result<String> {
        let n = self.calls.hit();
        if self.failing {
            anyhow::bail!("generation provider down");
        }
        Ok(format!("Trả lời #{} cho: {}", n, input.question))
    }
}

pub struct ScriptedRewriter {
    failing: bool,
    pub calls: Calls,
}

impl ScriptedRewriter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            failing: false,
            calls: Calls::default(),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            failing: true,
            calls: Calls::default(),
        })
    }
}

#[async_trait]
impl Rewriter for ScriptedRewriter {
    async fn rewrite(&self, question: &str, _summary: &str) -> Result<String> {
        self.calls.hit();
        if self.failing {
            anyhow::bail!("rewrite failed");
        }
        Ok(format!("{} (viết lại)", question))
    }
}

pub struct ScriptedSummarizer {
    failing: bool,
    pub calls: Calls,
}

impl ScriptedSummarizer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            failing: false,
            calls: Calls::default(),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            failing: true,
            calls: Calls::default(),
        })
    }
}

#[async_trait]
impl Summarizer for ScriptedSummarizer {
    async fn summarize(&self, transcript: &str) -> Result<String> {
        self.calls.hit();
        if self.failing {
            anyhow::bail!("summary failed");
        }
        Ok(format!("Tóm tắt: {}", transcript.lines().next().unwrap_or_default()))
    }
}

/// One double per capability; defaults describe a cooperative provider.
pub struct Doubles {
    pub classifier: Arc<ScriptedClassifier>,
    pub exact: Arc<ScriptedRetriever>,
    pub fusion: Arc<ScriptedRetriever>,
    pub relevance: Arc<FnGrader>,
    pub hallucination: Arc<FnGrader>,
    pub answer: Arc<FnGrader>,
    pub rewriter: Arc<ScriptedRewriter>,
    pub generator: Arc<ScriptedGenerator>,
    pub summarizer: Arc<ScriptedSummarizer>,
}

impl Doubles {
    pub fn cooperative() -> Self {
        Self {
            classifier: ScriptedClassifier::category(3),
            exact: ScriptedRetriever::when_contains(
                "Điều 35",
                vec!["Điều 35. Quyền đơn phương chấm dứt hợp đồng lao động của người lao động"],
            ),
            fusion: ScriptedRetriever::returning(vec![
                "Điều 36. Quyền đơn phương chấm dứt hợp đồng của người sử dụng lao động",
                "Điều 37. Trường hợp người sử dụng lao động không được đơn phương chấm dứt",
            ]),
            relevance: FnGrader::always(BinaryScore::Yes),
            hallucination: FnGrader::always(BinaryScore::Yes),
            answer: FnGrader::always(BinaryScore::Yes),
            rewriter: ScriptedRewriter::new(),
            generator: ScriptedGenerator::new(),
            summarizer: ScriptedSummarizer::new(),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            classifier: self.classifier.clone(),
            exact_retriever: self.exact.clone(),
            fusion_retriever: self.fusion.clone(),
            relevance_grader: self.relevance.clone(),
            hallucination_grader: self.hallucination.clone(),
            answer_grader: self.answer.clone(),
            rewriter: self.rewriter.clone(),
            generator: self.generator.clone(),
            summarizer: self.summarizer.clone(),
        }
    }
}

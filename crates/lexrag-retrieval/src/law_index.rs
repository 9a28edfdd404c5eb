//! Exact lookup of a law article named in the question ("Điều 35 Bộ luật Lao động").

use crate::passage::Passage;
use crate::traits::Retriever;
use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

/// Keyword to canonical title, checked in this order; first hit wins.
const LAW_KEYWORDS: &[(&str, &str)] = &[
    ("hiến pháp", "HIẾN PHÁP NƯỚC CỘNG HÒA XÃ HỘI CHỦ NGHĨA VIỆT NAM"),
    ("luật dân sự", "BỘ LUẬT DÂN SỰ"),
    ("luật lao động", "BỘ LUẬT LAO ĐỘNG"),
    ("luật hình sự", "BỘ LUẬT HÌNH SỰ"),
    ("luật an toàn vệ sinh lao động", "LUẬT AN TOÀN, VỆ SINH LAO ĐỘNG"),
    ("luật bảo hiểm xã hội", "LUẬT BẢO HIỂM XÃ HỘI"),
    (
        "luật bảo vệ quyền lợi người tiêu dùng",
        "LUẬT BẢO VỆ QUYỀN LỢI NGƯỜI TIÊU DÙNG",
    ),
    ("luật công đoàn", "LUẬT CÔNG ĐOÀN"),
    ("luật hôn nhân và gia đình", "LUẬT HÔN NHÂN VÀ GIA ĐÌNH"),
    ("luật việc làm", "LUẬT VIỆC LÀM"),
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LawReference {
    pub law_name: &'static str,
    pub article: String,
}

/// Normalizes free text and pulls out a (law, article) pair.
#[derive(Debug, Clone)]
pub struct LawReferenceParser {
    non_word: Regex,
    whitespace: Regex,
    article: Regex,
}

impl LawReferenceParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            non_word: Regex::new(r"[^\w\s]").context("Invalid non-word pattern")?,
            whitespace: Regex::new(r"\s+").context("Invalid whitespace pattern")?,
            article: Regex::new(r"điều\s+([0-9]+)").context("Invalid article pattern")?,
        })
    }

    /// Lowercase, punctuation to spaces, whitespace collapsed.
    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let cleaned = self.non_word.replace_all(&lowered, " ");
        self.whitespace.replace_all(&cleaned, " ").trim().to_string()
    }

    /// Both parts are required; a question naming only one yields `None`.
    pub fn parse(&self, text: &str) -> Option<LawReference> {
        let normalized = self.normalize(text);
        let article = self.article.captures(&normalized)?.get(1)?.as_str().to_string();
        let law_name = LAW_KEYWORDS
            .iter()
            .find(|(keyword, _)| normalized.contains(keyword))
            .map(|(_, title)| *title)?;

        Some(LawReference { law_name, article })
    }
}

/// In-memory corpus keyed by (law title, article number).
pub struct LawIndexRetriever {
    parser: LawReferenceParser,
    docs: Vec<String>,
    metas: Vec<Map<String, Value>>,
    index: HashMap<(String, String), usize>,
}

impl LawIndexRetriever {
    /// Build from two parallel arrays: passage texts and their metadata objects.
    pub fn from_corpus(docs: Vec<String>, metas: Vec<Map<String, Value>>) -> Result<Self> {
        if docs.len() != metas.len() {
            anyhow::bail!(
                "Corpus mismatch: {} passages but {} metadata entries",
                docs.len(),
                metas.len()
            );
        }

        let mut index = HashMap::new();
        for (i, meta) in metas.iter().enumerate() {
            let law = meta.get("law_name").and_then(Value::as_str);
            let article = meta.get("article").and_then(article_key);
            if let (Some(law), Some(article)) = (law, article) {
                index.entry((law.to_string(), article)).or_insert(i);
            }
        }

        tracing::info!(passages = docs.len(), articles = index.len(), "Law index loaded");

        Ok(Self {
            parser: LawReferenceParser::new()?,
            docs,
            metas,
            index,
        })
    }

    pub fn from_files(doc_path: impl AsRef<Path>, meta_path: impl AsRef<Path>) -> Result<Self> {
        let docs: Vec<String> = read_json(doc_path.as_ref())?;
        let metas: Vec<Map<String, Value>> = read_json(meta_path.as_ref())?;
        Self::from_corpus(docs, metas)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn parser(&self) -> &LawReferenceParser {
        &self.parser
    }

    pub fn lookup(&self, reference: &LawReference) -> Option<Passage> {
        let i = *self
            .index
            .get(&(reference.law_name.to_string(), reference.article.clone()))?;

        let mut metadata = Map::new();
        metadata.insert("corpus_id".to_string(), Value::String(format!("corpus_{}", i)));
        metadata.extend(self.metas[i].clone());

        Some(Passage::new(self.docs[i].clone()).with_metadata(metadata))
    }
}

#[async_trait]
impl Retriever for LawIndexRetriever {
    async fn search(&self, query: &str) -> Result<Vec<Passage>> {
        let Some(reference) = self.parser.parse(query) else {
            return Ok(Vec::new());
        };

        let found = self.lookup(&reference);
        tracing::debug!(
            law = reference.law_name,
            article = %reference.article,
            hit = found.is_some(),
            "Exact article lookup"
        );
        Ok(found.into_iter().collect())
    }

    fn name(&self) -> &str {
        "law_index"
    }
}

/// Articles are stored as strings in most corpora, as numbers in some.
fn article_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> LawReferenceParser {
        LawReferenceParser::new().unwrap()
    }

    #[test]
    fn test_normalize_strips_punctuation() {
        assert_eq!(parser().normalize("  Điều 35, Bộ-luật   Lao động?? "), "điều 35 bộ luật lao động");
    }

    #[test]
    fn test_parse_labour_code() {
        let reference = parser().parse("Điều 35 Bộ luật Lao động quy định gì?").unwrap();
        assert_eq!(reference.law_name, "BỘ LUẬT LAO ĐỘNG");
        assert_eq!(reference.article, "35");
    }

    #[test]
    fn test_keyword_order_wins() {
        // "hiến pháp" is checked before "luật dân sự"
        let reference = parser().parse("điều 2 hiến pháp và luật dân sự").unwrap();
        assert_eq!(reference.law_name, "HIẾN PHÁP NƯỚC CỘNG HÒA XÃ HỘI CHỦ NGHĨA VIỆT NAM");
    }

    #[test]
    fn test_safety_law_not_confused_with_labour_code() {
        let reference = parser().parse("Điều 7 Luật An toàn, vệ sinh lao động").unwrap();
        assert_eq!(reference.law_name, "LUẬT AN TOÀN, VỆ SINH LAO ĐỘNG");
    }

    #[test]
    fn test_both_parts_required() {
        assert!(parser().parse("Bộ luật Lao động nói gì về tiền lương?").is_none());
        assert!(parser().parse("Điều 35 nói gì?").is_none());
    }

    #[test]
    fn test_numeric_article_metadata() {
        assert_eq!(article_key(&serde_json::json!(35)), Some("35".to_string()));
        assert_eq!(article_key(&serde_json::json!(" 35 ")), Some("35".to_string()));
        assert_eq!(article_key(&Value::Null), None);
    }
}

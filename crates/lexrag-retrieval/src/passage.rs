use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A retrieved piece of legal text plus whatever the corpus knows about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Passage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}

/// Passage with the backend identifier used to merge rankings.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPassage {
    pub id: String,
    pub score: f64,
    pub passage: Passage,
}

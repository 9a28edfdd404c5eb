use crate::messages::SOURCES_HEADER;
use serde::{Deserialize, Serialize};

/// One completed exchange in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub question: String,
    pub answer: String,
}

impl ChatTurn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// "User:/AI:" transcript used by the generator and the summarizer
    pub fn transcript(&self) -> String {
        format!("User: {}\nAI: {}", self.question, self.answer)
    }
}

/// Conversation memory carried from one turn to the next.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionMemory {
    #[serde(default)]
    pub chat_history: Vec<ChatTurn>,
    #[serde(default)]
    pub summary: Vec<String>,
    #[serde(default)]
    pub documents: Vec<String>,
}

impl SessionMemory {
    pub fn is_empty(&self) -> bool {
        self.chat_history.is_empty() && self.summary.is_empty() && self.documents.is_empty()
    }

    /// Take the finished turn's memory. Empty fields never overwrite stored ones.
    pub fn absorb(&mut self, state: &ConversationState) {
        if !state.chat_history.is_empty() {
            self.chat_history = state.chat_history.clone();
        }
        if !state.summary.is_empty() {
            self.summary = state.summary.clone();
        }
        if !state.documents.is_empty() {
            self.documents = state.documents.clone();
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnInput {
    pub session_id: String,
    pub question: String,
    #[serde(default)]
    pub memory: SessionMemory,
}

impl TurnInput {
    pub fn new(session_id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            question: question.into(),
            memory: SessionMemory::default(),
        }
    }

    pub fn with_memory(mut self, memory: SessionMemory) -> Self {
        self.memory = memory;
        self
    }
}

/// The record threaded through every node of a turn.
///
/// Retry counters start at zero for each turn; `chat_history` and `summary`
/// come from the previous turn and only grow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub session_id: String,
    pub run_id: String,
    pub question: String,
    pub generation: String,
    pub documents: Vec<String>,
    pub chat_history: Vec<ChatTurn>,
    pub summary: Vec<String>,
    pub retry_generate_count: u32,
    pub retry_transform_count: u32,
    pub need_grade_docs: bool,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self {
            session_id: String::new(),
            run_id: uuid::Uuid::new_v4().to_string(),
            question: String::new(),
            generation: String::new(),
            documents: Vec::new(),
            chat_history: Vec::new(),
            summary: Vec::new(),
            retry_generate_count: 0,
            retry_transform_count: 0,
            need_grade_docs: true,
        }
    }
}

impl ConversationState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Self::default()
        }
    }

    pub fn from_input(input: TurnInput) -> Self {
        Self {
            session_id: input.session_id,
            question: input.question,
            documents: input.memory.documents,
            chat_history: input.memory.chat_history,
            summary: input.memory.summary,
            ..Self::default()
        }
    }

    pub fn has_generation(&self) -> bool {
        !self.generation.is_empty()
    }

    pub fn has_documents(&self) -> bool {
        !self.documents.is_empty()
    }

    /// Most recent summary entry, or "" when there is none.
    pub fn latest_summary(&self) -> &str {
        self.summary.last().map(String::as_str).unwrap_or("")
    }

    /// Last one or two summary entries joined by newlines.
    pub fn recent_summary(&self) -> String {
        let start = self.summary.len().saturating_sub(2);
        self.summary[start..].join("\n")
    }

    /// Transcript of the previous exchange, or "" on the first turn.
    pub fn last_turn_transcript(&self) -> String {
        self.chat_history
            .last()
            .map(ChatTurn::transcript)
            .unwrap_or_default()
    }

    /// Answer as shown to the user: the generation followed by its sources.
    pub fn response_text(&self) -> String {
        if self.documents.is_empty() {
            return self.generation.clone();
        }
        let sources = self
            .documents
            .iter()
            .map(|doc| format!("- {}", doc))
            .collect::<Vec<_>>()
            .join("\n\n");
        format!("{}{}{}", self.generation, SOURCES_HEADER, sources)
    }

    pub fn memory(&self) -> SessionMemory {
        SessionMemory {
            chat_history: self.chat_history.clone(),
            summary: self.summary.clone(),
            documents: self.documents.clone(),
        }
    }
}

use serde::{Deserialize, Serialize};

/// Progress events published to a streaming caller during one turn.
///
/// Ordering: one `Step` per node in the order nodes started, then a single
/// `Response`, then `Done`. A fatal engine error replaces the tail with `Error`.
/// The sender is dropped right after the last event, which ends the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A node began executing
    Step { node: String },

    /// Final formatted answer for the turn
    Response { content: String },

    /// Turn completed
    Done,

    /// Fatal error, no response will follow
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        node: Option<String>,
    },
}

impl StreamEvent {
    pub fn step(node: impl Into<String>) -> Self {
        Self::Step { node: node.into() }
    }

    pub fn response(content: impl Into<String>) -> Self {
        Self::Response {
            content: content.into(),
        }
    }

    pub fn error(message: impl Into<String>, node: Option<String>) -> Self {
        Self::Error {
            message: message.into(),
            node,
        }
    }
}

use axum::{
    extract::{Path, State},
    Json,
};
use lexrag_types::{SessionMemory, TurnInput};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::{error::{ApiError, ApiResult}, state::AppState};

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub question: String,
    /// Memory held by the caller; when omitted the stored memory is used
    #[serde(default)]
    pub memory: Option<SessionMemory>,
}

impl SendMessageRequest {
    pub(crate) fn into_turn(self, session_id: String) -> ApiResult<TurnInput> {
        let question = self.question.trim();
        if question.is_empty() {
            return Err(ApiError::BadRequest("question must not be empty".to_string()));
        }
        if session_id.trim().is_empty() {
            return Err(ApiError::BadRequest("session id must not be empty".to_string()));
        }
        let input = TurnInput::new(session_id, question);
        Ok(match self.memory {
            Some(memory) => input.with_memory(memory),
            None => input,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Answer followed by its sources
    pub response: String,
    pub generation: String,
    pub documents: Vec<String>,
    pub processing_time_ms: u64,
}

/// Answer one question and return once memory has been saved.
/// The turn runs on its own task and finishes even if the request is dropped.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let input = req.into_turn(session_id)?;

    let start = Instant::now();
    let turn = tokio::spawn(async move {
        let _turn = state.sessions.acquire(&input.session_id).await;
        state.graph.run_turn(input).await
    });
    let final_state = turn.await.map_err(|e| ApiError::Graph(e.into()))??;
    let elapsed = start.elapsed();

    tracing::info!(
        session_id = %final_state.session_id,
        documents = final_state.documents.len(),
        duration_ms = %elapsed.as_millis(),
        "Turn answered"
    );

    Ok(Json(ChatResponse {
        response: final_state.response_text(),
        processing_time_ms: elapsed.as_millis() as u64,
        generation: final_state.generation,
        documents: final_state.documents,
    }))
}

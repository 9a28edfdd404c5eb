use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{Stream, StreamExt};
use lexrag_graph::TurnHandle;
use lexrag_types::StreamEvent;
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;

use crate::{error::ApiResult, handlers::chat::SendMessageRequest, state::AppState};

/// Send a message and stream progress using Server-Sent Events
///
/// Each frame's `data` is one JSON event: `step` per node, then `response`, then `done`.
pub async fn send_message_stream(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let input = req.into_turn(session_id)?;
    let turn_guard = state.sessions.acquire(&input.session_id).await;

    let TurnHandle { events, outcome } = state.graph.spawn_run(input);

    // the session stays locked until the turn, memory write included, is over
    tokio::spawn(async move {
        let _turn_guard = turn_guard;
        match outcome.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => tracing::debug!("Streamed turn ended with error: {:#}", e),
            Err(e) => tracing::error!("Streamed turn panicked: {}", e),
        }
    });

    let sse_stream = ReceiverStream::new(events).map(|event| Ok::<Event, Infallible>(to_sse(&event)));

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::default()))
}

fn to_sse(event: &StreamEvent) -> Event {
    match Event::default().json_data(event) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::error!("Failed to encode stream event: {}", e);
            Event::default().data(r#"{"type":"error","message":"encoding failed"}"#)
        }
    }
}


use crate::graph::{Graph, GraphStep};
use crate::node::NodeId;
use anyhow::Result;
use futures::TryStreamExt;
use lexrag_types::{ConversationState, StreamEvent, TurnInput};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Instrument;

pub type EventSender = mpsc::Sender<StreamEvent>;

/// A turn running in the background.
pub struct TurnHandle {
    /// `Step`s in start order, then `Response` and `Done` (or `Error`). Closes after the last event.
    pub events: mpsc::Receiver<StreamEvent>,
    /// Final state, available once the turn (and its memory write) completed
    pub outcome: JoinHandle<Result<ConversationState>>,
}

impl Graph {
    /// Spawn execution in background, return event receiver and outcome
    pub fn spawn_run(&self, input: TurnInput) -> TurnHandle {
        let (tx, rx) = mpsc::channel(self.config().event_buffer.max(1));
        let graph = self.clone();

        let outcome = tokio::spawn(async move {
            let state = graph.prepare(input).await;
            let span = tracing::info_span!("turn", session_id = %state.session_id, run_id = %state.run_id);
            graph.drive(state, tx).instrument(span).await
        });

        TurnHandle { events: rx, outcome }
    }

    /// Run the turn, publishing progress. A closed receiver does not stop the turn.
    async fn drive(&self, state: ConversationState, tx: EventSender) -> Result<ConversationState> {
        let mut steps = Box::pin(self.steps(state));
        let mut current: Option<NodeId> = None;
        let mut last = None;

        loop {
            match steps.try_next().await {
                Ok(Some(GraphStep::Entered(node))) => {
                    current = Some(node);
                    publish(&tx, StreamEvent::step(node.as_str())).await;
                }
                Ok(Some(GraphStep::Completed(_, state))) => last = Some(state),
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Turn failed: {:#}", e);
                    let node = current.map(|n| n.as_str().to_string());
                    publish(&tx, StreamEvent::error(format!("{:#}", e), node)).await;
                    return Err(e);
                }
            }
        }

        let Some(state) = last else {
            let message = "Graph finished without running a node";
            publish(&tx, StreamEvent::error(message, None)).await;
            anyhow::bail!(message);
        };

        // memory is committed before the answer is published
        self.save_memory(&state).await;
        publish(&tx, StreamEvent::response(state.response_text())).await;
        publish(&tx, StreamEvent::Done).await;
        Ok(state)
    }
}

async fn publish(tx: &EventSender, event: StreamEvent) {
    if tx.send(event).await.is_err() {
        tracing::debug!("Stream consumer went away");
    }
}

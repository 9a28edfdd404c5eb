use crate::builder::{GraphBuilder, PersistenceConfig};
use crate::node::{Node, NodeId};
use crate::router::Router;
use anyhow::Result;
use futures::{Stream, TryStreamExt};
use lexrag_types::{ConversationState, GraphConfig, TurnInput};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::Instrument;

/// Where an edge leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Node(NodeId),
    End,
}

/// Outgoing edge of a node.
#[derive(Clone)]
pub enum Edge {
    Direct(Target),
    Conditional {
        router: Arc<dyn Router>,
        branches: HashMap<&'static str, Target>,
    },
}

/// Structural problems. These end the turn instead of producing an answer.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Graph has no entry node")]
    MissingEntry,

    #[error("Node '{0}' is not registered")]
    UnknownNode(NodeId),

    #[error("Node '{0}' has no outgoing edge")]
    MissingEdge(NodeId),

    #[error("Router '{router}' chose '{label}' but '{node}' has no such branch")]
    MissingBranch {
        node: NodeId,
        router: &'static str,
        label: &'static str,
    },

    #[error("Iteration limit ({0}) reached")]
    IterationLimit(usize),
}

/// One observation of a running turn.
#[derive(Debug, Clone)]
pub enum GraphStep {
    /// A node is about to run
    Entered(NodeId),
    /// A node finished; the state after its update
    Completed(NodeId, ConversationState),
}

/// Node table, edge table and an entry point. Cheap to clone.
#[derive(Clone)]
pub struct Graph {
    nodes: Arc<HashMap<NodeId, Arc<dyn Node>>>,
    edges: Arc<HashMap<NodeId, Edge>>,
    entry: NodeId,
    on_iteration_limit: Option<NodeId>,
    config: GraphConfig,
    persistence: Option<Arc<PersistenceConfig>>,
}

impl Graph {
    pub(crate) fn from_parts(
        nodes: HashMap<NodeId, Arc<dyn Node>>,
        edges: HashMap<NodeId, Edge>,
        entry: NodeId,
        on_iteration_limit: Option<NodeId>,
        config: GraphConfig,
        persistence: Option<PersistenceConfig>,
    ) -> Self {
        Self {
            nodes: Arc::new(nodes),
            edges: Arc::new(edges),
            entry,
            on_iteration_limit,
            config,
            persistence: persistence.map(Arc::new),
        }
    }

    /// Create a builder for fluent construction
    pub fn builder() -> GraphBuilder {
        GraphBuilder::new()
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn entry(&self) -> NodeId {
        self.entry
    }

    pub fn has_persistence(&self) -> bool {
        self.persistence.is_some()
    }

    fn node(&self, id: NodeId) -> Result<Arc<dyn Node>, GraphError> {
        self.nodes.get(&id).cloned().ok_or(GraphError::UnknownNode(id))
    }

    async fn next_target(&self, current: NodeId, state: &ConversationState) -> Result<Target, GraphError> {
        match self.edges.get(&current) {
            None => Err(GraphError::MissingEdge(current)),
            Some(Edge::Direct(target)) => Ok(*target),
            Some(Edge::Conditional { router, branches }) => {
                let label = router.route(state).await;
                tracing::info!(node = %current, router = router.name(), decision = label, "Routing");
                branches.get(label).copied().ok_or(GraphError::MissingBranch {
                    node: current,
                    router: router.name(),
                    label,
                })
            }
        }
    }

    /// Lazily run one turn, yielding node entries and post-node states.
    ///
    /// Single pass; polling drives execution.
    pub fn steps(&self, state: ConversationState) -> impl Stream<Item = Result<GraphStep>> + Send + 'static {
        let graph = self.clone();

        async_stream::try_stream! {
            let mut state = state;
            let mut current = graph.entry;
            let mut executed = 0usize;

            loop {
                let node = graph.node(current)?;
                yield GraphStep::Entered(current);

                tracing::info!(node = %current, "Node started");
                node.execute(&mut state).await?;
                executed += 1;
                tracing::info!(node = %current, "Node finished");

                yield GraphStep::Completed(current, state.clone());

                let next = match graph.next_target(current, &state).await? {
                    Target::End => break,
                    Target::Node(next) => next,
                };

                let within_budget = executed < graph.config.max_iterations;
                current = match graph.on_iteration_limit {
                    _ if within_budget => next,
                    Some(escape) if next == escape => next,
                    Some(escape) if current != escape => {
                        tracing::warn!(limit = graph.config.max_iterations, "Iteration limit reached, diverting to {}", escape);
                        escape
                    }
                    _ => Err::<NodeId, GraphError>(GraphError::IterationLimit(graph.config.max_iterations))?,
                };
            }
        }
    }

    /// `(node, state)` after every node, in execution order.
    pub fn stream(
        &self,
        state: ConversationState,
    ) -> impl Stream<Item = Result<(NodeId, ConversationState)>> + Send + 'static {
        self.steps(state).try_filter_map(|step| async move {
            Ok(match step {
                GraphStep::Completed(node, state) => Some((node, state)),
                GraphStep::Entered(_) => None,
            })
        })
    }

    /// Run to the end and return the final state.
    pub async fn invoke(&self, state: ConversationState) -> Result<ConversationState> {
        let mut stream = Box::pin(self.stream(state));
        let mut last = None;
        while let Some((_, state)) = stream.try_next().await? {
            last = Some(state);
        }
        last.ok_or_else(|| GraphError::MissingEntry.into())
    }

    /// Build the initial state, loading stored memory when the caller sent none.
    pub async fn prepare(&self, input: TurnInput) -> ConversationState {
        let needs_memory = input.memory.is_empty();
        let mut state = ConversationState::from_input(input);

        if let (Some(persist), true) = (&self.persistence, needs_memory) {
            let loaded = persist.store.load(&state.session_id).await;
            match loaded {
                Ok(memory) => {
                    state.chat_history = memory.chat_history;
                    state.summary = memory.summary;
                    state.documents = memory.documents;
                }
                Err(e) => tracing::error!("Failed to load session memory: {}", e),
            }
        }
        state
    }

    /// Persist the memory triple of a finished turn, if a store is attached.
    pub(crate) async fn save_memory(&self, state: &ConversationState) {
        if let Some(persist) = &self.persistence {
            if let Err(e) = persist.store.record_turn(state).await {
                tracing::error!("Failed to save session memory: {}", e);
            }
        }
    }

    /// One complete, non-streaming turn: load memory, run, save memory.
    pub async fn run_turn(&self, input: TurnInput) -> Result<ConversationState> {
        let state = self.prepare(input).await;
        let span = tracing::info_span!("turn", session_id = %state.session_id, run_id = %state.run_id);

        async move {
            let final_state = self.invoke(state).await?;
            self.save_memory(&final_state).await;
            Ok(final_state)
        }
        .instrument(span)
        .await
    }
}

use std::collections::HashMap;
use std::sync::Arc;
use anyhow::Result;

use lexrag_persist::SessionStore;
use lexrag_types::GraphConfig;

use crate::graph::{Edge, Graph, GraphError, Target};
use crate::node::{Node, NodeId};
use crate::router::Router;

/// Configuration for optional persistence
pub struct PersistenceConfig {
    pub store: Arc<dyn SessionStore>,
}

/// Builder for constructing a Graph from nodes and edges
pub struct GraphBuilder {
    nodes: HashMap<NodeId, Arc<dyn Node>>,
    edges: HashMap<NodeId, Edge>,
    entry: Option<NodeId>,
    on_iteration_limit: Option<NodeId>,
    config: GraphConfig,
    persistence_config: Option<PersistenceConfig>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            entry: None,
            on_iteration_limit: None,
            config: GraphConfig::default(),
            persistence_config: None,
        }
    }

    /// Register a node under its own id; a later node with the same id replaces it.
    pub fn add_node(mut self, node: Arc<dyn Node>) -> Self {
        self.nodes.insert(node.id(), node);
        self
    }

    /// Unconditional edge
    pub fn add_edge(mut self, from: NodeId, to: Target) -> Self {
        self.edges.insert(from, Edge::Direct(to));
        self
    }

    /// Edge chosen at run time by `router`, one target per label
    pub fn add_conditional_edges(
        mut self,
        from: NodeId,
        router: Arc<dyn Router>,
        branches: impl IntoIterator<Item = (&'static str, Target)>,
    ) -> Self {
        self.edges.insert(
            from,
            Edge::Conditional {
                router,
                branches: branches.into_iter().collect(),
            },
        );
        self
    }

    pub fn set_entry(mut self, node: NodeId) -> Self {
        self.entry = Some(node);
        self
    }

    /// Node to divert to once `max_iterations` nodes have run
    pub fn on_iteration_limit(mut self, node: NodeId) -> Self {
        self.on_iteration_limit = Some(node);
        self
    }

    /// Set the graph configuration
    pub fn config(mut self, config: GraphConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable persistence with a SessionStore
    pub fn with_persistence(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.persistence_config = Some(PersistenceConfig { store });
        self
    }

    /// Build the Graph, checking that every edge points at a registered node
    pub fn build(self) -> Result<Graph> {
        let entry = self.entry.ok_or(GraphError::MissingEntry)?;
        self.require(entry)?;
        if let Some(escape) = self.on_iteration_limit {
            self.require(escape)?;
        }

        for (from, edge) in &self.edges {
            self.require(*from)?;
            let targets: Vec<Target> = match edge {
                Edge::Direct(target) => vec![*target],
                Edge::Conditional { branches, .. } => branches.values().copied().collect(),
            };
            for target in targets {
                if let Target::Node(id) = target {
                    self.require(id)?;
                }
            }
        }
        for id in self.nodes.keys() {
            if !self.edges.contains_key(id) {
                return Err(GraphError::MissingEdge(*id).into());
            }
        }

        Ok(Graph::from_parts(
            self.nodes,
            self.edges,
            entry,
            self.on_iteration_limit,
            self.config,
            self.persistence_config,
        ))
    }

    fn require(&self, id: NodeId) -> Result<(), GraphError> {
        if self.nodes.contains_key(&id) {
            Ok(())
        } else {
            Err(GraphError::UnknownNode(id))
        }
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

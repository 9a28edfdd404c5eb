use crate::config::Config;
use lexrag_graph::Graph;
use lexrag_persist::SessionStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Shared application state passed to all handlers
///
/// The Graph is stateless and created once at startup; per-turn state lives in the
/// turn itself and session memory lives in the store.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub graph: Graph,
    pub store: Arc<dyn SessionStore>,
    pub sessions: Arc<SessionLocks>,
}

impl AppState {
    pub fn new(config: Config, graph: Graph, store: Arc<dyn SessionStore>) -> Self {
        Self {
            config: Arc::new(config),
            graph,
            store,
            sessions: Arc::new(SessionLocks::default()),
        }
    }
}

/// One async mutex per session, so two turns of a conversation never interleave.
#[derive(Default)]
pub struct SessionLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    /// Wait for exclusive use of `session_id`; released when the guard drops.
    pub async fn acquire(&self, session_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // entries nobody holds or waits on
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry(session_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.locks.lock().await.is_empty()
    }
}

use crate::error::Result;
use crate::store::{validate_session_id, SessionStore};
use async_trait::async_trait;
use lexrag_types::SessionMemory;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local store; contents are lost on restart.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SessionMemory>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_id: &str) -> Result<SessionMemory> {
        validate_session_id(session_id)?;
        Ok(self
            .sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(&self, session_id: &str, memory: &SessionMemory) -> Result<()> {
        validate_session_id(session_id)?;
        self.sessions
            .write()
            .await
            .insert(session_id.to_string(), memory.clone());
        Ok(())
    }
}

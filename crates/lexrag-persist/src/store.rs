use crate::error::{PersistError, Result};
use async_trait::async_trait;
use lexrag_types::{ConversationState, SessionMemory};

/// Storage for the memory a session carries between turns.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Memory for `session_id`; an unknown session yields empty memory.
    async fn load(&self, session_id: &str) -> Result<SessionMemory>;

    async fn save(&self, session_id: &str, memory: &SessionMemory) -> Result<()>;

    /// Fold a finished turn into the stored memory.
    ///
    /// Fields the turn left empty keep their stored value.
    async fn record_turn(&self, state: &ConversationState) -> Result<SessionMemory> {
        validate_session_id(&state.session_id)?;
        let mut memory = self.load(&state.session_id).await?;
        memory.absorb(state);
        self.save(&state.session_id, &memory).await?;

        tracing::debug!(
            session_id = %state.session_id,
            turns = memory.chat_history.len(),
            summaries = memory.summary.len(),
            "Session memory saved"
        );
        Ok(memory)
    }
}

pub(crate) fn validate_session_id(session_id: &str) -> Result<()> {
    if session_id.trim().is_empty() {
        return Err(PersistError::InvalidSessionId(session_id.to_string()));
    }
    Ok(())
}

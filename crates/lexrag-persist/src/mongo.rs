#[cfg(feature = "mongodb")]
use mongodb::{bson::doc, Client, Collection};
#[cfg(feature = "mongodb")]
use async_trait::async_trait;
#[cfg(feature = "mongodb")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "mongodb")]
use lexrag_types::{ChatTurn, SessionMemory};
#[cfg(feature = "mongodb")]
use crate::error::{PersistError, Result};
#[cfg(feature = "mongodb")]
use crate::store::{validate_session_id, SessionStore};

/// Session memory document, keyed by the session id
#[cfg(feature = "mongodb")]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MongoSession {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    chat_history: Vec<ChatTurn>,
    #[serde(default)]
    summary: Vec<String>,
    #[serde(default)]
    documents: Vec<String>,
    updated_at: bson::DateTime,
}

#[cfg(feature = "mongodb")]
impl From<MongoSession> for SessionMemory {
    fn from(doc: MongoSession) -> Self {
        Self {
            chat_history: doc.chat_history,
            summary: doc.summary,
            documents: doc.documents,
        }
    }
}

#[cfg(feature = "mongodb")]
#[derive(Clone)]
pub struct MongoSessionStore {
    collection: Collection<MongoSession>,
}

#[cfg(feature = "mongodb")]
impl MongoSessionStore {
    /// Connect to MongoDB and bind the `sessions` collection
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        let collection = client.database(database).collection("sessions");
        tracing::info!(database, "Connected to MongoDB session store");
        Ok(Self { collection })
    }
}

#[cfg(feature = "mongodb")]
#[async_trait]
impl SessionStore for MongoSessionStore {
    async fn load(&self, session_id: &str) -> Result<SessionMemory> {
        validate_session_id(session_id)?;
        let found = self.collection.find_one(doc! { "_id": session_id }).await?;
        Ok(found.map(SessionMemory::from).unwrap_or_default())
    }

    async fn save(&self, session_id: &str, memory: &SessionMemory) -> Result<()> {
        validate_session_id(session_id)?;
        let document = MongoSession {
            id: session_id.to_string(),
            chat_history: memory.chat_history.clone(),
            summary: memory.summary.clone(),
            documents: memory.documents.clone(),
            updated_at: bson::DateTime::now(),
        };

        self.collection
            .replace_one(doc! { "_id": session_id }, &document)
            .upsert(true)
            .await?;
        Ok(())
    }
}

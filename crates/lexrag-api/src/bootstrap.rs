//! Builds providers, retrievers, the session store and the graph from configuration.

use anyhow::{Context, Result};
use lexrag_graph::{legal_workflow, Capabilities, LlmBackend};
use lexrag_llm::ClientFactory;
use lexrag_persist::{InMemorySessionStore, SessionStore};
use lexrag_retrieval::{FusionRetriever, LawIndexRetriever, QdrantConfig, QdrantSearch, VectorSearch};
use std::sync::Arc;

use crate::config::{Config, StorageBackend, VectorConfig};
use crate::state::AppState;

pub async fn build_state(config: Config) -> Result<AppState> {
    let capabilities = build_capabilities(&config)?;
    let store = build_store(&config).await?;

    let graph = legal_workflow(&capabilities, config.graph.clone())
        .with_persistence(store.clone())
        .build()?;

    Ok(AppState::new(config, graph, store))
}

pub fn build_capabilities(config: &Config) -> Result<Capabilities> {
    let providers = config.providers();
    tracing::info!(providers = providers.len(), "Initializing LLM chain");
    let chat = ClientFactory::create_chain(&providers)?;
    let backend = LlmBackend::new(chat, config.llm.gemini_model.as_str());

    let retrieval = &config.retrieval;
    let exact = LawIndexRetriever::from_files(&retrieval.corpus_docs, &retrieval.corpus_meta)
        .with_context(|| format!("Failed to load corpus from {}", retrieval.corpus_docs.display()))?;
    tracing::info!(passages = exact.len(), "Law index loaded");

    let qdrant = config.qdrant();
    let fusion = FusionRetriever::new(
        vector_search(&qdrant, &retrieval.vector_1)?,
        vector_search(&qdrant, &retrieval.vector_2)?,
    )
    .with_prefetch(retrieval.prefetch)
    .with_limit(retrieval.limit);

    Ok(backend.capabilities(Arc::new(exact), Arc::new(fusion)))
}

fn vector_search(qdrant: &QdrantConfig, vector: &VectorConfig) -> Result<Arc<dyn VectorSearch>> {
    let embedder = ClientFactory::create_embedding_client(&vector.embedding_provider())?;
    let mut search = QdrantSearch::new(qdrant, vector.name.as_str(), embedder, vector.model.as_str())?;
    if let Some(dimensions) = vector.dimensions {
        search = search.with_dimensions(dimensions);
    }
    Ok(Arc::new(search))
}

pub async fn build_store(config: &Config) -> Result<Arc<dyn SessionStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory session store; memory is lost on restart");
            Ok(Arc::new(InMemorySessionStore::new()))
        }
        #[cfg(feature = "mongodb")]
        StorageBackend::Mongodb => {
            let uri = config
                .secrets
                .mongodb_uri
                .as_deref()
                .context("MONGODB_URI environment variable is required")?;
            tracing::info!("Connecting to MongoDB");
            let store = lexrag_persist::MongoSessionStore::connect(uri, &config.storage.database).await?;
            tracing::info!("MongoDB connected");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "mongodb"))]
        StorageBackend::Mongodb => anyhow::bail!("Built without the mongodb feature"),
    }
}

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use lexrag_llm::ProviderConfig;
use lexrag_retrieval::QdrantConfig;
use lexrag_types::GraphConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(skip)]
    pub secrets: Secrets,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub gemini_model: String,
    /// Self-hosted fallback, tried after every Gemini key
    #[serde(default)]
    pub vllm_base_url: Option<String>,
    #[serde(default)]
    pub vllm_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    pub corpus_docs: PathBuf,
    pub corpus_meta: PathBuf,
    pub prefetch: usize,
    pub limit: usize,
    pub qdrant: QdrantConfig,
    pub vector_1: VectorConfig,
    pub vector_2: VectorConfig,
}

/// A named vector of the collection and the embedding endpoint that fills it.
#[derive(Debug, Clone, Deserialize)]
pub struct VectorConfig {
    pub name: String,
    pub base_url: String,
    pub model: String,
    #[serde(default)]
    pub dimensions: Option<usize>,
}

impl VectorConfig {
    /// Embedding endpoint; OpenAI-compatible, as served by vLLM or TEI
    pub fn embedding_provider(&self) -> ProviderConfig {
        ProviderConfig::vllm(self.base_url.as_str(), self.model.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Mongodb,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Default)]
pub struct Secrets {
    pub gemini_api_keys: Vec<String>,
    pub vllm_api_key: Option<String>,
    pub qdrant_api_key: Option<String>,
    pub mongodb_uri: Option<String>,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self {
            gemini_api_keys: std::env::var("GEMINI_API_KEYS")
                .map(|keys| split_keys(&keys))
                .unwrap_or_default(),
            vllm_api_key: non_empty_env("VLLM_API_KEY"),
            qdrant_api_key: non_empty_env("QDRANT_API_KEY"),
            mongodb_uri: non_empty_env("MONGODB_URI"),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn split_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. LEXRAG_<SECTION>__<KEY> environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let config = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("LEXRAG")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut cfg: Config = config.try_deserialize()?;
        cfg.secrets = Secrets::from_env();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .add_source(File::from(path.as_ref()))
            .build()?;
        config.try_deserialize()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend == StorageBackend::Mongodb && self.secrets.mongodb_uri.is_none() {
            return Err(ConfigError::Message(
                "MONGODB_URI environment variable is required for the mongodb backend".to_string(),
            ));
        }
        if self.providers().is_empty() {
            return Err(ConfigError::Message(
                "Set GEMINI_API_KEYS or llm.vllm_base_url to configure at least one LLM provider".to_string(),
            ));
        }
        Ok(())
    }

    /// One Gemini provider per key, then the optional vLLM server.
    pub fn providers(&self) -> Vec<ProviderConfig> {
        let mut providers: Vec<ProviderConfig> = self
            .secrets
            .gemini_api_keys
            .iter()
            .map(|key| ProviderConfig::gemini(key.as_str(), self.llm.gemini_model.as_str()))
            .collect();

        if let Some(base_url) = self.llm.vllm_base_url.as_deref().filter(|u| !u.is_empty()) {
            providers.push(ProviderConfig::Vllm {
                base_url: base_url.to_string(),
                model: self.llm.vllm_model.clone(),
                api_key: self.secrets.vllm_api_key.clone(),
            });
        }
        providers
    }

    /// Qdrant settings with the API key filled in from the environment.
    pub fn qdrant(&self) -> QdrantConfig {
        let mut qdrant = self.retrieval.qdrant.clone();
        if qdrant.api_key.is_none() {
            qdrant.api_key = self.secrets.qdrant_api_key.clone();
        }
        qdrant
    }
}

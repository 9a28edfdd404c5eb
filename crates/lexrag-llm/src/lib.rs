pub mod config;
pub mod fallback;
pub mod openai;
pub mod structured;
pub mod traits;
pub mod types;

pub use config::{ClientFactory, ModelProfile, ProviderConfig, ProviderType};
pub use fallback::{BoundModel, FallbackChatClient};
pub use openai::OpenAIClient;
pub use structured::parse_structured;
pub use traits::{
    ChatClient, ChatOptions, ChatRequest, ChatResponse, EmbeddingClient, EmbeddingRequest,
    TokenUsage,
};
pub use types::Message;

pub mod config;
pub mod events;
pub mod messages;
pub mod state;

pub use config::GraphConfig;
pub use events::StreamEvent;
pub use state::{ChatTurn, ConversationState, SessionMemory, TurnInput};

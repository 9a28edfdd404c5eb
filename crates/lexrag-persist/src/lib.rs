pub mod error;
pub mod memory;
pub mod mongo;
pub mod store;

pub use error::{PersistError, Result};
pub use memory::InMemorySessionStore;
#[cfg(feature = "mongodb")]
pub use mongo::MongoSessionStore;
pub use store::SessionStore;

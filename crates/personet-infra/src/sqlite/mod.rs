//! SQLite storage backends.

pub mod pool;
pub mod topic;
pub mod transcript;

pub use pool::{DatabasePool, default_database_url};
pub use topic::SqliteTopicStore;
pub use transcript::SqliteTranscriptStore;

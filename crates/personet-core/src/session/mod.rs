//! Per-session state: history buffer, cached session record, and the
//! concurrency-safe registry that maps session ids to records.

pub mod history;
pub mod registry;
pub mod slot;

pub use history::HistoryBuffer;
pub use registry::{SessionRegistry, SlotKey};
pub use slot::{SessionContext, SessionSlot};

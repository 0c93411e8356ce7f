//! REST API request handlers.

pub mod chat;
pub mod topics;
pub mod transcripts;

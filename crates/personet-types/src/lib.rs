//! Shared domain types for Personet.
//!
//! This crate contains the core domain types used across the Personet
//! platform: conversation turns, session keys, persona documents, topic
//! documents, generation request/response shapes, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod generation;
pub mod persona;
pub mod session;
pub mod topic;

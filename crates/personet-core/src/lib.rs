//! Orchestration logic and repository trait definitions for Personet.
//!
//! This crate defines the "ports" (source/store traits) that the
//! infrastructure layer implements. It depends only on `personet-types` --
//! never on `personet-infra` or any database/IO crate.

pub mod chat;
pub mod generation;
pub mod prompt;
pub mod repository;
pub mod session;

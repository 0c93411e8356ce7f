//! Chat orchestration: the bound generation engine, the per-variant topic
//! refresh policy, and the service exposing the blocking and streaming
//! turn entry points.

pub mod engine;
pub mod policy;
pub mod service;

pub use service::{ChatService, ChatStream};

//! Filesystem-backed document sources.

pub mod persona;

pub use persona::FsPersonaSource;

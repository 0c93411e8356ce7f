//! Append-only conversation history buffer.
//!
//! Insertion order is chronological and is the only order ever replayed to
//! the generation pipeline. Entries are never reordered or removed.

use personet_types::chat::Turn;

/// Ordered, append-only sequence of turns for one session.
#[derive(Debug, Default)]
pub struct HistoryBuffer {
    turns: Vec<Turn>,
}

impl HistoryBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Append a turn at the tail.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Defensive copy of the current ordered sequence, for use as
    /// generation context while further appends may happen concurrently.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    /// Number of turns recorded so far.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether no turns have been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

//! A single cached session record and its build-once initialization guard.
//!
//! The expensive per-session setup (persona load, topic resolution, prompt
//! build, engine bind) runs at most once per slot, guarded by a
//! `tokio::sync::OnceCell`. Mutable per-turn state (history, current topic)
//! lives behind a per-slot async mutex so concurrent calls on the same
//! session serialize their append pairs.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use tokio::sync::{Mutex, MutexGuard, OnceCell};

use personet_types::chat::SessionState;
use personet_types::error::ChatError;
use personet_types::persona::RenderedPersona;
use personet_types::topic::TopicSelection;

use crate::chat::engine::ChatEngine;

use super::registry::SlotKey;

const STATE_UNINITIALIZED: u8 = 0;
const STATE_INITIALIZING: u8 = 1;
const STATE_READY: u8 = 2;

/// The immutable product of session initialization.
///
/// Once built, these fields are safe for concurrent read without locking.
/// The prompt template inside the engine stays bound to the topic captured
/// at build time even if the current topic is later refreshed.
pub struct SessionContext {
    pub persona: RenderedPersona,
    /// Topic values the prompt template was built from.
    pub topic_at_build: TopicSelection,
    pub engine: Arc<ChatEngine>,
}

/// Mutable per-turn state, serialized by the slot's mutex.
pub struct SessionTurnState {
    pub history: super::HistoryBuffer,
    /// Most recently resolved topic. Seeded from the build-time topic and
    /// updated by the per-variant refresh policy; feeds persisted
    /// transcripts, never the prompt template.
    pub topic: Option<TopicSelection>,
}

/// One session's cache entry in the registry.
pub struct SessionSlot {
    key: SlotKey,
    init: OnceCell<SessionContext>,
    state: AtomicU8,
    mutable: Mutex<SessionTurnState>,
    /// LRU tick of the most recent access, maintained by the registry.
    last_used: AtomicU64,
}

impl SessionSlot {
    pub(super) fn new(key: SlotKey) -> Self {
        Self {
            key,
            init: OnceCell::new(),
            state: AtomicU8::new(STATE_UNINITIALIZED),
            mutable: Mutex::new(SessionTurnState {
                history: super::HistoryBuffer::new(),
                topic: None,
            }),
            last_used: AtomicU64::new(0),
        }
    }

    /// The registry key this slot is stored under.
    pub fn key(&self) -> &SlotKey {
        &self.key
    }

    /// Observable lifecycle phase.
    pub fn state(&self) -> SessionState {
        match self.state.load(Ordering::Acquire) {
            STATE_READY => SessionState::Ready,
            STATE_INITIALIZING => SessionState::Initializing,
            _ => SessionState::Uninitialized,
        }
    }

    /// Drive the slot to Ready, running `init` at most once even under
    /// concurrent first access. All callers converge on the same context.
    ///
    /// A failed initialization returns the slot to Uninitialized and
    /// surfaces the error to the caller that ran it; a concurrent waiter
    /// then gets its own attempt.
    pub async fn ready<F, Fut>(&self, init: F) -> Result<&SessionContext, ChatError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<SessionContext, ChatError>>,
    {
        let context = self
            .init
            .get_or_try_init(|| async {
                self.state.store(STATE_INITIALIZING, Ordering::Release);
                match init().await {
                    Ok(context) => Ok(context),
                    Err(err) => {
                        self.state.store(STATE_UNINITIALIZED, Ordering::Release);
                        Err(err)
                    }
                }
            })
            .await?;

        self.state.store(STATE_READY, Ordering::Release);

        // Seed the mutable topic from the build-time topic on first access.
        {
            let mut turn_state = self.mutable.lock().await;
            if turn_state.topic.is_none() {
                turn_state.topic = Some(context.topic_at_build.clone());
            }
        }

        Ok(context)
    }

    /// Lock the per-session mutable state. Held around append+persist so
    /// concurrent calls on the same session cannot interleave their turn
    /// pairs.
    pub async fn turn_state(&self) -> MutexGuard<'_, SessionTurnState> {
        self.mutable.lock().await
    }

    /// Defensive copy of the history for use as generation context.
    pub async fn history_snapshot(&self) -> Vec<personet_types::chat::Turn> {
        self.mutable.lock().await.history.snapshot()
    }

    /// Replace the current topic (refresh policy). The prompt template is
    /// intentionally left bound to the build-time topic.
    pub async fn refresh_topic(&self, selection: TopicSelection) {
        self.mutable.lock().await.topic = Some(selection);
    }

    pub(super) fn touch(&self, tick: u64) {
        self.last_used.store(tick, Ordering::Relaxed);
    }

    pub(super) fn last_used(&self) -> u64 {
        self.last_used.load(Ordering::Relaxed)
    }
}

//! Concurrency-safe session registry.
//!
//! Maps `(variant, session key)` to a cached [`SessionSlot`]. Lookups for
//! different keys never block each other; concurrent first lookups for the
//! same key converge on one slot instance, whose `OnceCell` guard enforces
//! the build-once guarantee.
//!
//! The registry is capacity-bounded: when it grows past its limit, idle
//! slots (not referenced by any in-flight call) are evicted least recently
//! used first. Evicting a slot only drops cached state -- transcripts are
//! persisted after every turn, so a re-accessed session rebuilds from
//! durable sources.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use personet_types::persona::PersonaVariant;
use personet_types::session::SessionKey;

use super::slot::SessionSlot;

/// Registry key: the two persona variants keep separate session namespaces,
/// so the same session id under "tag" and "episodic" are distinct records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub variant: PersonaVariant,
    pub session: SessionKey,
}

/// Concurrency-safe store of session slots with LRU eviction of idle
/// entries.
pub struct SessionRegistry {
    slots: DashMap<SlotKey, Arc<SessionSlot>>,
    capacity: usize,
    clock: AtomicU64,
}

impl SessionRegistry {
    /// Create a registry bounded to `capacity` cached slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: DashMap::new(),
            capacity: capacity.max(1),
            clock: AtomicU64::new(0),
        }
    }

    /// Get the slot for a key, creating an Uninitialized one if absent.
    ///
    /// Concurrent callers for the same key all receive the same slot
    /// instance; driving it to Ready is [`SessionSlot::ready`]'s job.
    pub fn slot(&self, key: SlotKey) -> Arc<SessionSlot> {
        let tick = self.clock.fetch_add(1, Ordering::Relaxed) + 1;

        if let Some(existing) = self.slots.get(&key) {
            existing.touch(tick);
            return Arc::clone(existing.value());
        }

        let slot_key = key.clone();
        let slot = self
            .slots
            .entry(key)
            .or_insert_with(|| Arc::new(SessionSlot::new(slot_key)))
            .value()
            .clone();
        slot.touch(tick);

        if self.slots.len() > self.capacity {
            self.evict_idle();
        }

        slot
    }

    /// Number of cached slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slots are cached.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether a slot exists for the key.
    pub fn contains(&self, key: &SlotKey) -> bool {
        self.slots.contains_key(key)
    }

    /// Evict idle slots, least recently used first, until within capacity.
    ///
    /// A slot is idle when the map holds the only strong reference to it --
    /// a slot checked out by an in-flight call is never evicted.
    fn evict_idle(&self) {
        let excess = self.slots.len().saturating_sub(self.capacity);
        if excess == 0 {
            return;
        }

        let mut idle: Vec<(SlotKey, u64)> = self
            .slots
            .iter()
            .filter(|entry| Arc::strong_count(entry.value()) == 1)
            .map(|entry| (entry.key().clone(), entry.value().last_used()))
            .collect();
        idle.sort_by_key(|(_, tick)| *tick);

        for (key, _) in idle.into_iter().take(excess) {
            // Re-check idleness under the removal lock.
            let removed = self
                .slots
                .remove_if(&key, |_, slot| Arc::strong_count(slot) == 1);
            if let Some((key, _)) = removed {
                tracing::debug!(variant = %key.variant, session = %key.session, "Evicted idle session slot");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use personet_types::chat::SessionState;

    fn key(prefix: &str, ordinal: u32) -> SlotKey {
        SlotKey {
            variant: PersonaVariant::Tag,
            session: SessionKey::new(prefix, ordinal).unwrap(),
        }
    }

    #[test]
    fn test_slot_created_uninitialized() {
        let registry = SessionRegistry::new(8);
        let slot = registry.slot(key("chat1", 1));
        assert_eq!(slot.state(), SessionState::Uninitialized);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_same_key_converges_on_one_slot() {
        let registry = SessionRegistry::new(8);
        let a = registry.slot(key("chat1", 1));
        let b = registry.slot(key("chat1", 1));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_variants_are_separate_namespaces() {
        let registry = SessionRegistry::new(8);
        let tag = registry.slot(key("chat1", 1));
        let epi = registry.slot(SlotKey {
            variant: PersonaVariant::Episodic,
            session: SessionKey::new("chat1", 1).unwrap(),
        });
        assert!(!Arc::ptr_eq(&tag, &epi));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_lru_eviction_of_idle_slots() {
        let registry = SessionRegistry::new(2);
        // Drop each Arc so the slots are idle and evictable.
        drop(registry.slot(key("a", 1)));
        drop(registry.slot(key("b", 1)));
        drop(registry.slot(key("c", 1)));

        assert_eq!(registry.len(), 2);
        // "a" was least recently used
        assert!(!registry.contains(&key("a", 1)));
        assert!(registry.contains(&key("b", 1)));
        assert!(registry.contains(&key("c", 1)));
    }

    #[test]
    fn test_in_flight_slot_never_evicted() {
        let registry = SessionRegistry::new(1);
        let held = registry.slot(key("held", 1));
        drop(registry.slot(key("b", 1)));
        drop(registry.slot(key("c", 1)));

        // The held slot survives; idle ones are evicted around it.
        assert!(registry.contains(&key("held", 1)));
        assert_eq!(held.state(), SessionState::Uninitialized);
    }

    #[test]
    fn test_touch_updates_lru_order() {
        let registry = SessionRegistry::new(2);
        drop(registry.slot(key("a", 1)));
        drop(registry.slot(key("b", 1)));
        // Re-access "a" so "b" becomes the eviction candidate.
        drop(registry.slot(key("a", 1)));
        drop(registry.slot(key("c", 1)));

        assert!(registry.contains(&key("a", 1)));
        assert!(!registry.contains(&key("b", 1)));
    }
}

//! Short-term memory: recent-session recall.
//!
//! Entries expire `ttl` after creation. Expiry is lazy: `store`, `retrieve`
//! and [`ShortTermMemory::purge_expired`] drop expired entries, nothing else
//! does. When over capacity, the least recently used entry is evicted.

use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

use super::{MemoryStore, MemoryTier, SharedEntry};
use crate::error::{MemoryError, MemoryResult};
use crate::utils::{SharedClock, system_clock};

/// Bounded buffer with TTL expiry and LRU eviction
#[derive(Debug)]
pub struct ShortTermMemory {
    max_messages: usize,
    ttl: Duration,
    clock: SharedClock,
    entries: RwLock<Vec<SharedEntry>>,
}

impl ShortTermMemory {
    /// Create a short-term memory using the wall clock
    pub fn new(max_messages: usize, ttl_seconds: u64) -> MemoryResult<Self> {
        Self::with_clock(max_messages, ttl_seconds, system_clock())
    }

    /// Create a short-term memory reading time from `clock`
    pub fn with_clock(
        max_messages: usize,
        ttl_seconds: u64,
        clock: SharedClock,
    ) -> MemoryResult<Self> {
        if max_messages < 1 {
            return Err(MemoryError::invalid_argument(
                "short_term.max_messages",
                "must be at least 1",
            ));
        }
        if ttl_seconds < 1 {
            return Err(MemoryError::invalid_argument(
                "short_term.ttl_seconds",
                "must be at least 1",
            ));
        }
        let ttl = i64::try_from(ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                MemoryError::invalid_argument("short_term.ttl_seconds", "out of range")
            })?;

        Ok(Self {
            max_messages,
            ttl,
            clock,
            entries: RwLock::new(Vec::with_capacity(max_messages + 1)),
        })
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Drop expired entries now. Returns how many were removed.
    pub fn purge_expired(&self) -> MemoryResult<usize> {
        let now = self.clock.now();
        let mut entries = self
            .entries
            .write()
            .map_err(|_| MemoryError::lock_poisoned(MemoryTier::ShortTerm))?;
        Ok(self.purge_locked(&mut entries, now))
    }

    fn purge_locked(&self, entries: &mut Vec<SharedEntry>, now: DateTime<Utc>) -> usize {
        let before = entries.len();
        entries.retain(|e| now - e.timestamp < self.ttl);
        let purged = before - entries.len();
        if purged > 0 {
            tracing::debug!(purged, "Purged expired short-term entries");
        }
        purged
    }
}

impl MemoryStore for ShortTermMemory {
    fn tier(&self) -> MemoryTier {
        MemoryTier::ShortTerm
    }

    fn store(&self, entry: SharedEntry) -> MemoryResult<()> {
        let now = self.clock.now();
        let mut entries = self
            .entries
            .write()
            .map_err(|_| MemoryError::lock_poisoned(MemoryTier::ShortTerm))?;

        self.purge_locked(&mut entries, now);
        entries.push(entry);

        // One eviction per store; min_by_key keeps the earliest-inserted on ties.
        if entries.len() > self.max_messages {
            let lru = entries
                .iter()
                .enumerate()
                .min_by_key(|(_, e)| e.recency())
                .map(|(index, _)| index);
            if let Some(index) = lru {
                let evicted = entries.remove(index);
                tracing::debug!(id = %evicted.id, "Evicted least recently used short-term entry");
            }
        }

        Ok(())
    }

    /// The query is ignored: results are the newest unexpired entries.
    /// Every returned entry has its access recorded, so this takes the write lock.
    fn retrieve(&self, _query: &str, limit: usize) -> MemoryResult<Vec<SharedEntry>> {
        let now = self.clock.now();
        let mut entries = self
            .entries
            .write()
            .map_err(|_| MemoryError::lock_poisoned(MemoryTier::ShortTerm))?;

        self.purge_locked(&mut entries, now);

        let mut results: Vec<SharedEntry> = entries.clone();
        results.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        results.truncate(limit);

        for entry in &results {
            entry.record_access(now);
        }

        Ok(results)
    }

    fn delete(&self, id: &str) -> MemoryResult<bool> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| MemoryError::lock_poisoned(MemoryTier::ShortTerm))?;

        let before = entries.len();
        entries.retain(|e| e.id != id);
        Ok(entries.len() < before)
    }

    fn clear(&self) -> MemoryResult<()> {
        self.entries
            .write()
            .map_err(|_| MemoryError::lock_poisoned(MemoryTier::ShortTerm))?
            .clear();
        Ok(())
    }

    fn len(&self) -> usize {
        match self.entries.read() {
            Ok(entries) => entries.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

#[cfg(test)]
impl ShortTermMemory {
    pub(crate) fn poison(&self) {
        super::poison_lock(&self.entries);
    }
}

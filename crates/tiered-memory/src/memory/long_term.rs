//! Long-term memory: durable facts and preferences.
//!
//! Only entries whose importance clears the admission threshold are kept.
//! Retrieval ranks every stored entry by a composite of lexical match,
//! importance and recency.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use super::{MemoryEntry, MemoryStore, MemoryTier, SharedEntry, validate_importance};
use crate::error::{MemoryError, MemoryResult};
use crate::utils::{SharedClock, system_clock};

/// Weight of a case-insensitive substring match
pub const MATCH_WEIGHT: f64 = 0.5;
/// Weight of the entry's importance
pub const IMPORTANCE_WEIGHT: f64 = 0.3;
/// Weight of the recency term
pub const RECENCY_WEIGHT: f64 = 0.2;
/// Age at which the recency term reaches zero
pub const RECENCY_HORIZON_DAYS: f64 = 365.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Composite retrieval score of `entry` for `query` at `now`.
///
/// An empty query matches every entry.
pub fn composite_score(entry: &MemoryEntry, query: &str, now: DateTime<Utc>) -> f64 {
    let lexical = if entry
        .content
        .to_lowercase()
        .contains(&query.to_lowercase())
    {
        MATCH_WEIGHT
    } else {
        0.0
    };

    let age_days = entry.age_at(now).num_seconds() as f64 / SECONDS_PER_DAY;
    let recency = (1.0 - age_days / RECENCY_HORIZON_DAYS).max(0.0);

    lexical + IMPORTANCE_WEIGHT * entry.importance + RECENCY_WEIGHT * recency
}

#[derive(Debug)]
struct Slot {
    /// Insertion sequence, the tie-break for equal scores
    seq: u64,
    entry: SharedEntry,
}

#[derive(Debug, Default)]
struct Inner {
    next_seq: u64,
    entries: HashMap<String, Slot>,
}

/// Importance-gated store with scored retrieval
#[derive(Debug)]
pub struct LongTermMemory {
    min_importance: f64,
    clock: SharedClock,
    inner: RwLock<Inner>,
}

impl LongTermMemory {
    /// Create a long-term memory using the wall clock
    pub fn new(min_importance: f64) -> MemoryResult<Self> {
        Self::with_clock(min_importance, system_clock())
    }

    /// Create a long-term memory reading time from `clock`
    pub fn with_clock(min_importance: f64, clock: SharedClock) -> MemoryResult<Self> {
        validate_importance("long_term.min_importance", min_importance)?;

        Ok(Self {
            min_importance,
            clock,
            inner: RwLock::new(Inner::default()),
        })
    }

    /// Admission threshold
    pub fn min_importance(&self) -> f64 {
        self.min_importance
    }

    /// Whether an entry with this importance would be persisted
    pub fn admits(&self, importance: f64) -> bool {
        importance >= self.min_importance
    }
}

impl MemoryStore for LongTermMemory {
    fn tier(&self) -> MemoryTier {
        MemoryTier::LongTerm
    }

    fn store(&self, entry: SharedEntry) -> MemoryResult<()> {
        if !self.admits(entry.importance) {
            tracing::debug!(
                id = %entry.id,
                importance = entry.importance,
                min_importance = self.min_importance,
                "Entry below long-term admission threshold, not stored"
            );
            return Ok(());
        }

        let mut inner = self
            .inner
            .write()
            .map_err(|_| MemoryError::lock_poisoned(MemoryTier::LongTerm))?;

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.insert(entry.id.clone(), Slot { seq, entry });

        Ok(())
    }

    /// Ranks by composite score, ties broken by insertion order.
    /// Every returned entry has its access recorded, so this takes the write lock.
    fn retrieve(&self, query: &str, limit: usize) -> MemoryResult<Vec<SharedEntry>> {
        let now = self.clock.now();
        let inner = self
            .inner
            .write()
            .map_err(|_| MemoryError::lock_poisoned(MemoryTier::LongTerm))?;

        let mut scored: Vec<(f64, u64, &SharedEntry)> = inner
            .entries
            .values()
            .map(|slot| (composite_score(&slot.entry, query, now), slot.seq, &slot.entry))
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

        let results: Vec<SharedEntry> = scored
            .into_iter()
            .take(limit)
            .map(|(_, _, entry)| entry.clone())
            .collect();

        for entry in &results {
            entry.record_access(now);
        }

        Ok(results)
    }

    fn delete(&self, id: &str) -> MemoryResult<bool> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| MemoryError::lock_poisoned(MemoryTier::LongTerm))?;
        Ok(inner.entries.remove(id).is_some())
    }

    fn clear(&self) -> MemoryResult<()> {
        self.inner
            .write()
            .map_err(|_| MemoryError::lock_poisoned(MemoryTier::LongTerm))?
            .entries
            .clear();
        Ok(())
    }

    fn len(&self) -> usize {
        match self.inner.read() {
            Ok(inner) => inner.entries.len(),
            Err(poisoned) => poisoned.into_inner().entries.len(),
        }
    }
}

#[cfg(test)]
impl LongTermMemory {
    pub(crate) fn poison(&self) {
        super::poison_lock(&self.inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ManualClock;
    use chrono::Duration;

    fn setup(min_importance: f64) -> (LongTermMemory, ManualClock) {
        let clock = ManualClock::starting_now();
        let memory = LongTermMemory::with_clock(min_importance, clock.shared()).unwrap();
        (memory, clock)
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        assert!(LongTermMemory::new(-0.1).unwrap_err().is_invalid_argument());
        assert!(LongTermMemory::new(1.1).unwrap_err().is_invalid_argument());
        assert!(LongTermMemory::new(f64::NAN).is_err());
        assert!(LongTermMemory::new(0.0).is_ok());
        assert!(LongTermMemory::new(1.0).is_ok());
    }

    #[test]
    fn test_importance_gate() {
        let (memory, clock) = setup(0.7);

        memory
            .store(MemoryEntry::new("minor detail", 0.5, clock.now()).shared())
            .unwrap();
        assert_eq!(memory.len(), 0);

        memory
            .store(MemoryEntry::new("user is allergic to nuts", 0.8, clock.now()).shared())
            .unwrap();
        assert_eq!(memory.len(), 1);

        // Exactly at the threshold is admitted.
        memory
            .store(MemoryEntry::new("boundary", 0.7, clock.now()).shared())
            .unwrap();
        assert_eq!(memory.len(), 2);
    }

    #[test]
    fn test_store_overwrites_same_id() {
        let (memory, clock) = setup(0.0);
        let entry = MemoryEntry::new("fact", 0.5, clock.now()).shared();
        memory.store(entry.clone()).unwrap();
        memory.store(entry).unwrap();
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn test_matching_content_ranks_first() {
        let (memory, clock) = setup(0.0);
        let other = MemoryEntry::new("likes hiking", 0.8, clock.now()).shared();
        let matching = MemoryEntry::new("Prefers DARK mode", 0.8, clock.now()).shared();
        memory.store(other.clone()).unwrap();
        memory.store(matching.clone()).unwrap();

        let results = memory.retrieve("dark mode", 10).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, matching.id);
        assert_eq!(results[1].id, other.id);
    }

    #[test]
    fn test_composite_score_terms() {
        let clock = ManualClock::starting_now();
        let now = clock.now();

        let fresh = MemoryEntry::new("Rust programming", 1.0, now);
        let score = composite_score(&fresh, "rust", now);
        assert!((score - 1.0).abs() < 1e-9);

        let no_match = composite_score(&fresh, "python", now);
        assert!((no_match - 0.5).abs() < 1e-9);

        let half_year = MemoryEntry::new("x", 0.0, now - Duration::days(182) - Duration::hours(12));
        let score = composite_score(&half_year, "nope", now);
        assert!((score - 0.1).abs() < 1e-3);

        let ancient = MemoryEntry::new("x", 0.5, now - Duration::days(800));
        let score = composite_score(&ancient, "nope", now);
        assert!((score - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let clock = ManualClock::starting_now();
        let entry = MemoryEntry::new("anything", 0.0, clock.now());
        let score = composite_score(&entry, "", clock.now());
        assert!((score - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_recency_breaks_equal_importance() {
        let (memory, clock) = setup(0.0);
        let old = MemoryEntry::new("note", 0.5, clock.now()).shared();
        memory.store(old.clone()).unwrap();
        clock.advance(Duration::days(30));
        let new = MemoryEntry::new("note", 0.5, clock.now()).shared();
        memory.store(new.clone()).unwrap();

        let results = memory.retrieve("note", 10).unwrap();
        assert_eq!(results[0].id, new.id);
    }

    #[test]
    fn test_ties_follow_insertion_order() {
        let (memory, clock) = setup(0.0);
        let ids: Vec<String> = (0..8)
            .map(|i| {
                let entry = MemoryEntry::new(format!("same {i}"), 0.5, clock.now()).shared();
                memory.store(entry.clone()).unwrap();
                entry.id.clone()
            })
            .collect();

        let results = memory.retrieve("same", 8).unwrap();
        let got: Vec<String> = results.iter().map(|e| e.id.clone()).collect();
        assert_eq!(got, ids);
    }

    #[test]
    fn test_retrieve_limits_and_records_access() {
        let (memory, clock) = setup(0.0);
        let high = MemoryEntry::new("a", 0.9, clock.now()).shared();
        let low = MemoryEntry::new("b", 0.1, clock.now()).shared();
        memory.store(high.clone()).unwrap();
        memory.store(low.clone()).unwrap();

        clock.advance_secs(10);
        let results = memory.retrieve("zzz", 1).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, high.id);
        assert_eq!(high.access_count(), 1);
        assert_eq!(high.last_accessed(), Some(clock.now()));
        assert_eq!(low.access_count(), 0);
    }

    #[test]
    fn test_delete_and_clear() {
        let (memory, clock) = setup(0.0);
        let entry = MemoryEntry::new("a", 0.5, clock.now()).shared();
        memory.store(entry.clone()).unwrap();
        memory
            .store(MemoryEntry::new("b", 0.5, clock.now()).shared())
            .unwrap();

        assert!(memory.delete(&entry.id).unwrap());
        assert!(!memory.delete(&entry.id).unwrap());
        assert_eq!(memory.len(), 1);

        memory.clear().unwrap();
        assert!(memory.is_empty());
    }

    #[test]
    fn test_below_threshold_store_succeeds_even_when_poisoned() {
        let (memory, clock) = setup(0.7);
        memory.poison();

        let skipped = MemoryEntry::new("minor", 0.1, clock.now()).shared();
        assert!(memory.store(skipped).is_ok());

        let admitted = MemoryEntry::new("major", 0.9, clock.now()).shared();
        let err = memory.store(admitted).unwrap_err();
        assert_eq!(err.failed_tier(), Some(MemoryTier::LongTerm));
    }

}

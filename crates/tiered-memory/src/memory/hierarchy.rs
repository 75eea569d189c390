//! Memory Hierarchy
//!
//! Coordinator over the three tiers:
//! - Writes fan out: working always, short-term when configured, long-term
//!   when configured and the entry clears its admission threshold
//! - Reads fan in: per-tier results are merged, deduplicated by id and ranked
//! - Deletes propagate to every configured tier
//!
//! There is no cross-tier lock. Each tier operation is atomic on its own, but
//! a multi-tier store or delete that fails partway is not rolled back.

use std::collections::HashSet;
use std::sync::Arc;

use super::{
    LongTermMemory, MemoryEntry, MemoryStats, MemoryStore, MemoryTier, Metadata, SharedEntry,
    ShortTermMemory, WorkingMemory, validate_importance,
};
use crate::config::HierarchyConfig;
use crate::error::MemoryResult;
use crate::utils::{SharedClock, system_clock};

/// Coordinator composing working, short-term and long-term memory
#[derive(Debug)]
pub struct MemoryHierarchy {
    working: Arc<WorkingMemory>,
    short_term: Option<Arc<ShortTermMemory>>,
    long_term: Option<Arc<LongTermMemory>>,
    clock: SharedClock,
}

impl MemoryHierarchy {
    /// Compose a hierarchy from already-built tiers
    pub fn new(
        working: Arc<WorkingMemory>,
        short_term: Option<Arc<ShortTermMemory>>,
        long_term: Option<Arc<LongTermMemory>>,
    ) -> Self {
        Self {
            working,
            short_term,
            long_term,
            clock: system_clock(),
        }
    }

    /// Stamp new entries using `clock` instead of the wall clock
    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    /// Build every configured tier from `config`
    pub fn from_config(config: &HierarchyConfig) -> MemoryResult<Self> {
        Self::from_config_with_clock(config, system_clock())
    }

    /// Build every configured tier from `config`, all sharing `clock`
    pub fn from_config_with_clock(
        config: &HierarchyConfig,
        clock: SharedClock,
    ) -> MemoryResult<Self> {
        config.validate()?;

        let working = Arc::new(WorkingMemory::new(config.working.max_messages)?);
        let short_term = config
            .short_term
            .as_ref()
            .map(|st| ShortTermMemory::with_clock(st.max_messages, st.ttl_seconds, clock.clone()))
            .transpose()?
            .map(Arc::new);
        let long_term = config
            .long_term
            .as_ref()
            .map(|lt| LongTermMemory::with_clock(lt.min_importance, clock.clone()))
            .transpose()?
            .map(Arc::new);

        Ok(Self::new(working, short_term, long_term).with_clock(clock))
    }

    pub fn working(&self) -> &Arc<WorkingMemory> {
        &self.working
    }

    pub fn short_term(&self) -> Option<&Arc<ShortTermMemory>> {
        self.short_term.as_ref()
    }

    pub fn long_term(&self) -> Option<&Arc<LongTermMemory>> {
        self.long_term.as_ref()
    }

    /// The configured store for `tier`, if any
    pub fn tier(&self, tier: MemoryTier) -> Option<&dyn MemoryStore> {
        match tier {
            MemoryTier::Working => Some(self.working.as_ref() as &dyn MemoryStore),
            MemoryTier::ShortTerm => self.short_term.as_deref().map(|t| t as &dyn MemoryStore),
            MemoryTier::LongTerm => self.long_term.as_deref().map(|t| t as &dyn MemoryStore),
        }
    }

    /// Configured tiers in fan-out order
    fn configured(&self) -> impl Iterator<Item = &dyn MemoryStore> {
        MemoryTier::ALL.into_iter().filter_map(|tier| self.tier(tier))
    }

    /// Store a new entry in every applicable tier. Returns the entry id.
    ///
    /// On a tier failure the remaining tiers are skipped and the error names
    /// the failing tier; tiers already written keep the entry, so callers
    /// should `delete` the id to clean up.
    pub fn store(
        &self,
        content: impl Into<String>,
        metadata: Metadata,
        importance: f64,
        session_id: Option<&str>,
    ) -> MemoryResult<String> {
        validate_importance("importance", importance)?;

        let mut entry =
            MemoryEntry::new(content, importance, self.clock.now()).with_metadata(metadata);
        if let Some(session_id) = session_id {
            entry = entry.with_session(session_id);
        }
        let entry = entry.shared();
        let id = entry.id.clone();

        let mut applied: Vec<MemoryTier> = Vec::with_capacity(3);
        for store in self.configured() {
            if store.tier() == MemoryTier::LongTerm
                && !self.long_term.as_ref().is_some_and(|lt| lt.admits(importance))
            {
                continue;
            }

            if let Err(e) = store.store(Arc::clone(&entry)) {
                tracing::warn!(
                    id = %id,
                    failed_tier = %store.tier(),
                    applied = ?applied,
                    "Memory store aborted partway: {}",
                    e
                );
                return Err(e);
            }
            applied.push(store.tier());
        }

        tracing::debug!(id = %id, importance, tiers = ?applied, "Stored memory entry");
        Ok(id)
    }

    /// Retrieve from the selected tiers (`None` or empty selects all).
    ///
    /// Each tier applies `limit` on its own before merging, so the result can
    /// hold fewer than `limit` entries even when more exist overall.
    pub fn retrieve(
        &self,
        query: &str,
        limit: usize,
        tiers: Option<&[MemoryTier]>,
    ) -> MemoryResult<Vec<SharedEntry>> {
        let selected = tiers.filter(|t| !t.is_empty());

        let mut merged: Vec<SharedEntry> = Vec::new();
        for store in self.configured() {
            if selected.is_some_and(|s| !s.contains(&store.tier())) {
                continue;
            }
            merged.extend(store.retrieve(query, limit)?);
        }

        // First occurrence wins, so a working copy shadows later tiers.
        let mut seen = HashSet::with_capacity(merged.len());
        merged.retain(|e| seen.insert(e.id.clone()));

        merged.sort_by(|a, b| {
            b.importance
                .total_cmp(&a.importance)
                .then_with(|| b.timestamp.cmp(&a.timestamp))
        });
        merged.truncate(limit);

        tracing::debug!(query, limit, results = merged.len(), "Retrieved memory entries");
        Ok(merged)
    }

    /// Remove `id` from every configured tier. Returns whether any tier held it.
    ///
    /// The first tier failure aborts; earlier tiers have already dropped the id.
    pub fn delete(&self, id: &str) -> MemoryResult<bool> {
        let mut removed = false;
        let mut applied: Vec<MemoryTier> = Vec::with_capacity(3);

        for store in self.configured() {
            match store.delete(id) {
                Ok(hit) => {
                    removed |= hit;
                    applied.push(store.tier());
                }
                Err(e) => {
                    tracing::warn!(
                        id,
                        failed_tier = %store.tier(),
                        applied = ?applied,
                        "Memory delete aborted partway: {}",
                        e
                    );
                    return Err(e);
                }
            }
        }

        Ok(removed)
    }

    /// Empty the working tier only
    pub fn clear_working(&self) -> MemoryResult<()> {
        self.working.clear()
    }

    /// Every working memory entry, oldest first
    pub fn get_working(&self) -> MemoryResult<Vec<SharedEntry>> {
        self.working.entries()
    }

    /// Entry counts per tier
    pub fn stats(&self) -> MemoryStats {
        MemoryStats {
            working: self.working.len(),
            short_term: self.short_term.as_ref().map(|t| t.len()),
            long_term: self.long_term.as_ref().map(|t| t.len()),
        }
    }
}

/// Parse caller-supplied tier names such as `["working", "long_term"]`
pub fn parse_tiers<S: AsRef<str>>(names: &[S]) -> MemoryResult<Vec<MemoryTier>> {
    names.iter().map(|name| name.as_ref().parse()).collect()
}

//! Working memory: the conversation window.
//!
//! A bounded FIFO of the most recent entries. Retrieval never mutates entries,
//! so reads only take the shared lock.

use std::collections::VecDeque;
use std::sync::RwLock;

use super::{MemoryStore, MemoryTier, SharedEntry};
use crate::error::{MemoryError, MemoryResult};

/// Bounded FIFO buffer of recent entries
#[derive(Debug)]
pub struct WorkingMemory {
    max_messages: usize,
    entries: RwLock<VecDeque<SharedEntry>>,
}

impl WorkingMemory {
    /// Create a working memory holding at most `max_messages` entries
    pub fn new(max_messages: usize) -> MemoryResult<Self> {
        if max_messages < 1 {
            return Err(MemoryError::invalid_argument(
                "working.max_messages",
                "must be at least 1",
            ));
        }

        Ok(Self {
            max_messages,
            entries: RwLock::new(VecDeque::with_capacity(max_messages + 1)),
        })
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    /// All entries, oldest first
    pub fn entries(&self) -> MemoryResult<Vec<SharedEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| MemoryError::lock_poisoned(MemoryTier::Working))?;
        Ok(entries.iter().cloned().collect())
    }
}

impl MemoryStore for WorkingMemory {
    fn tier(&self) -> MemoryTier {
        MemoryTier::Working
    }

    fn store(&self, entry: SharedEntry) -> MemoryResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| MemoryError::lock_poisoned(MemoryTier::Working))?;

        entries.push_back(entry);
        if entries.len() > self.max_messages {
            if let Some(evicted) = entries.pop_front() {
                tracing::debug!(id = %evicted.id, "Evicted oldest working memory entry");
            }
        }

        Ok(())
    }

    /// The query is ignored: this tier returns the most recent window.
    fn retrieve(&self, _query: &str, limit: usize) -> MemoryResult<Vec<SharedEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| MemoryError::lock_poisoned(MemoryTier::Working))?;

        let start = entries.len().saturating_sub(limit);
        Ok(entries.iter().skip(start).cloned().collect())
    }

    fn delete(&self, id: &str) -> MemoryResult<bool> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| MemoryError::lock_poisoned(MemoryTier::Working))?;

        match entries.iter().position(|e| e.id == id) {
            Some(index) => {
                entries.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn clear(&self) -> MemoryResult<()> {
        self.entries
            .write()
            .map_err(|_| MemoryError::lock_poisoned(MemoryTier::Working))?
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
impl WorkingMemory {
    pub(crate) fn poison(&self) {
        super::poison_lock(&self.entries);
    }
}

//! Memory tier trait defining the capability set every tier offers.

use super::{MemoryTier, SharedEntry};
use crate::error::MemoryResult;

/// Core trait for a memory tier.
///
/// Each implementation owns its eviction policy; the coordinator only sees
/// this interface.
pub trait MemoryStore: Send + Sync {
    /// Which tier this store implements.
    fn tier(&self) -> MemoryTier;

    /// Store an entry. Admission rules that skip storage are not errors.
    fn store(&self, entry: SharedEntry) -> MemoryResult<()>;

    /// Retrieve up to `limit` entries for `query`.
    fn retrieve(&self, query: &str, limit: usize) -> MemoryResult<Vec<SharedEntry>>;

    /// Remove this tier's reference to `id`. Returns whether one was held.
    fn delete(&self, id: &str) -> MemoryResult<bool>;

    /// Remove every entry.
    fn clear(&self) -> MemoryResult<()>;

    /// Current number of entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

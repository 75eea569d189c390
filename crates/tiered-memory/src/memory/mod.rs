//! Tiered memory system for AI agents.
//!
//! Provides a three-tier memory architecture:
//!
//! - **Working memory**: the most recent conversation window (FIFO)
//! - **Short-term memory**: recent-session recall (TTL expiry + LRU eviction)
//! - **Long-term memory**: durable facts (importance-gated, scored retrieval)
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      MemoryHierarchy                         │
//! │   store ──▶ working ──▶ short_term ──▶ long_term (if ≥ min)  │
//! │                                                              │
//! │  ┌─────────────┐  ┌──────────────────┐  ┌─────────────────┐  │
//! │  │   Working   │  │   Short-Term     │  │    Long-Term    │  │
//! │  │ FIFO, cap N │  │ TTL + LRU, cap N │  │ importance gate │  │
//! │  └─────────────┘  └──────────────────┘  └─────────────────┘  │
//! │                                                              │
//! │   retrieve ◀── merge, dedupe by id, rank by importance       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every tier holding an entry holds the same [`SharedEntry`].
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use tiered_memory::memory::{
//!     LongTermMemory, MemoryHierarchy, Metadata, ShortTermMemory, WorkingMemory,
//! };
//!
//! # fn main() -> tiered_memory::MemoryResult<()> {
//! let memory = MemoryHierarchy::new(
//!     Arc::new(WorkingMemory::new(5)?),
//!     Some(Arc::new(ShortTermMemory::new(20, 3600)?)),
//!     Some(Arc::new(LongTermMemory::new(0.7)?)),
//! );
//!
//! memory.store("User prefers dark mode", Metadata::new(), 0.9, Some("session-1"))?;
//! let recalled = memory.retrieve("dark mode", 5, None)?;
//! assert_eq!(recalled.len(), 1);
//! # Ok(())
//! # }
//! ```

mod types;
mod traits;
mod working;
mod short_term;
mod long_term;
mod hierarchy;

#[cfg(feature = "sweeper")]
mod sweeper;

pub use types::*;
pub use traits::MemoryStore;
pub use working::WorkingMemory;
pub use short_term::ShortTermMemory;
pub use long_term::{
    IMPORTANCE_WEIGHT, LongTermMemory, MATCH_WEIGHT, RECENCY_HORIZON_DAYS, RECENCY_WEIGHT,
    composite_score,
};
pub use hierarchy::{MemoryHierarchy, parse_tiers};

#[cfg(feature = "sweeper")]
pub use sweeper::ExpirySweeper;

/// Poison `lock` by panicking while holding its write guard.
#[cfg(test)]
pub(crate) fn poison_lock<T: Send + Sync>(lock: &std::sync::RwLock<T>) {
    std::thread::scope(|s| {
        let _ = s
            .spawn(|| {
                let _guard = lock.write().unwrap();
                panic!("poisoning lock for test");
            })
            .join();
    });
    assert!(lock.is_poisoned());
}

//! Tiered Memory - Multi-Tier Agent Memory
//!
//! Three cooperating in-process stores behind one coordinator:
//!
//! - **working** - bounded FIFO window of the latest entries
//! - **short_term** - bounded buffer with TTL expiry and LRU eviction
//! - **long_term** - importance-gated store ranked by match, importance and recency
//!
//! [`MemoryHierarchy`] writes each new entry through every applicable tier
//! and merges, deduplicates and ranks results across them.
//!
//! # Features
//!
//! - `sweeper` - opt-in tokio task that purges expired short-term entries in
//!   the background ([`memory::ExpirySweeper`])
//!
//! # Example
//!
//! ```rust
//! use tiered_memory::{HierarchyConfig, MemoryHierarchy, MemoryTier, Metadata};
//!
//! fn example() -> tiered_memory::MemoryResult<()> {
//!     let config = HierarchyConfig::working_only(5)
//!         .with_short_term(20, 3600)
//!         .with_long_term(0.7);
//!     let memory = MemoryHierarchy::from_config(&config)?;
//!
//!     memory.store("User ran `git status`", Metadata::new(), 0.4, Some("session-1"))?;
//!     memory.store("User prefers rebase over merge", Metadata::new(), 0.9, Some("session-1"))?;
//!
//!     // Only the durable fact reaches long-term memory
//!     let facts = memory.retrieve("rebase", 10, Some(&[MemoryTier::LongTerm]))?;
//!     assert_eq!(facts.len(), 1);
//!
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod memory;
pub mod utils;

mod config;
mod error;

pub use config::{HierarchyConfig, LongTermConfig, ShortTermConfig, WorkingConfig};
pub use error::{MemoryError, MemoryResult};

pub use memory::{
    EntrySnapshot, LongTermMemory, MemoryEntry, MemoryHierarchy, MemoryStats, MemoryStore,
    MemoryTier, Metadata, SharedEntry, ShortTermMemory, WorkingMemory,
};

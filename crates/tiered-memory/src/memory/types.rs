//! Memory Type Definitions
//!
//! Defines the core types shared by every memory tier.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MemoryError, MemoryResult};

/// Memory tier (working, short-term, long-term)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryTier {
    Working,
    ShortTerm,
    LongTerm,
}

impl MemoryTier {
    /// All tiers in fan-out / fan-in order
    pub const ALL: [MemoryTier; 3] = [Self::Working, Self::ShortTerm, Self::LongTerm];

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Working => "working",
            Self::ShortTerm => "short_term",
            Self::LongTerm => "long_term",
        }
    }
}

impl FromStr for MemoryTier {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "working" => Ok(Self::Working),
            "short_term" => Ok(Self::ShortTerm),
            "long_term" => Ok(Self::LongTerm),
            other => Err(MemoryError::invalid_argument(
                "tier",
                format!("unknown memory tier: {other}"),
            )),
        }
    }
}

impl std::fmt::Display for MemoryTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Free-form metadata attached to an entry at creation
pub type Metadata = HashMap<String, serde_json::Value>;

/// Entry handle held by tiers. Every tier storing the same entry holds the
/// same record.
pub type SharedEntry = Arc<MemoryEntry>;

/// Access statistics, updated on retrieval
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessStats {
    pub count: u64,
    pub last_accessed: Option<DateTime<Utc>>,
}

/// A single stored fact or message.
///
/// Everything except the access statistics is fixed at creation. The
/// statistics sit behind their own lock, so two tiers sharing this record can
/// record accesses concurrently while each holds only its own tier lock.
#[derive(Debug)]
pub struct MemoryEntry {
    pub id: String,
    pub content: String,
    pub metadata: Metadata,
    pub timestamp: DateTime<Utc>,
    pub importance: f64,
    pub session_id: Option<String>,
    access: Mutex<AccessStats>,
}

impl MemoryEntry {
    /// Create an entry with a fresh id
    pub fn new(content: impl Into<String>, importance: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            metadata: Metadata::new(),
            timestamp,
            importance,
            session_id: None,
            access: Mutex::new(AccessStats::default()),
        }
    }

    /// Attach metadata
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Attach a session label
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Wrap in a shared handle
    pub fn shared(self) -> SharedEntry {
        Arc::new(self)
    }

    /// Current access statistics
    pub fn access_stats(&self) -> AccessStats {
        *self.access.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn access_count(&self) -> u64 {
        self.access_stats().count
    }

    pub fn last_accessed(&self) -> Option<DateTime<Utc>> {
        self.access_stats().last_accessed
    }

    /// Record one retrieval at `now`
    pub fn record_access(&self, now: DateTime<Utc>) {
        let mut stats = self.access.lock().unwrap_or_else(PoisonError::into_inner);
        stats.count += 1;
        stats.last_accessed = Some(now);
    }

    /// Last access time, falling back to creation time
    pub fn recency(&self) -> DateTime<Utc> {
        self.last_accessed().unwrap_or(self.timestamp)
    }

    /// Age of the entry at `now`; zero for entries stamped in the future
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        (now - self.timestamp).max(Duration::zero())
    }

    /// Point-in-time copy suitable for serialization
    pub fn snapshot(&self) -> EntrySnapshot {
        let stats = self.access_stats();
        EntrySnapshot {
            id: self.id.clone(),
            content: self.content.clone(),
            metadata: self.metadata.clone(),
            timestamp: self.timestamp,
            importance: self.importance,
            session_id: self.session_id.clone(),
            access_count: stats.count,
            last_accessed: stats.last_accessed,
        }
    }
}

/// Serializable view of a [`MemoryEntry`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySnapshot {
    pub id: String,
    pub content: String,
    pub metadata: Metadata,
    pub timestamp: DateTime<Utc>,
    pub importance: f64,
    pub session_id: Option<String>,
    pub access_count: u64,
    pub last_accessed: Option<DateTime<Utc>>,
}

/// Check that an importance score lies in `[0.0, 1.0]`
pub fn validate_importance(field: &str, importance: f64) -> MemoryResult<()> {
    if !(0.0..=1.0).contains(&importance) {
        return Err(MemoryError::invalid_argument(
            field,
            format!("must be between 0.0 and 1.0, got {importance}"),
        ));
    }
    Ok(())
}

/// Per-tier entry counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub working: usize,
    /// `None` when the tier is not configured
    pub short_term: Option<usize>,
    pub long_term: Option<usize>,
}

impl MemoryStats {
    /// Sum of references held across tiers (a shared entry counts once per tier)
    pub fn total_references(&self) -> usize {
        self.working + self.short_term.unwrap_or(0) + self.long_term.unwrap_or(0)
    }
}

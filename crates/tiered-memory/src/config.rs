//! Memory Configuration
//!
//! Defines configuration options for building a [`MemoryHierarchy`](crate::MemoryHierarchy).
//! Configuration can be built in code or read from TOML:
//!
//! ```toml
//! [working]
//! max_messages = 10
//!
//! [short_term]
//! max_messages = 100
//! ttl_seconds = 3600
//!
//! [long_term]
//! min_importance = 0.7
//! ```
//!
//! Omitting the `short_term` or `long_term` table leaves that tier unconfigured.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MemoryError, MemoryResult};

/// Hierarchy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyConfig {
    /// Working memory (always present)
    pub working: WorkingConfig,

    /// Short-term memory, if enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_term: Option<ShortTermConfig>,

    /// Long-term memory, if enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_term: Option<LongTermConfig>,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            working: WorkingConfig::default(),
            short_term: Some(ShortTermConfig::default()),
            long_term: Some(LongTermConfig::default()),
        }
    }
}

/// Working memory configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingConfig {
    /// Window size (default: 10)
    pub max_messages: usize,
}

impl Default for WorkingConfig {
    fn default() -> Self {
        Self { max_messages: 10 }
    }
}

/// Short-term memory configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortTermConfig {
    /// Capacity (default: 100)
    pub max_messages: usize,

    /// Entry lifetime in seconds (default: 3600 = 1 hour)
    pub ttl_seconds: u64,
}

impl Default for ShortTermConfig {
    fn default() -> Self {
        Self {
            max_messages: 100,
            ttl_seconds: 3600, // 1 hour
        }
    }
}

/// Long-term memory configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongTermConfig {
    /// Admission threshold (default: 0.7)
    pub min_importance: f64,
}

impl Default for LongTermConfig {
    fn default() -> Self {
        Self {
            min_importance: 0.7,
        }
    }
}

impl HierarchyConfig {
    /// Working memory only
    pub fn working_only(max_messages: usize) -> Self {
        Self {
            working: WorkingConfig { max_messages },
            short_term: None,
            long_term: None,
        }
    }

    /// Parse a TOML document and validate it
    pub fn from_toml_str(s: &str) -> MemoryResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> MemoryResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Set working memory size
    pub fn with_working(mut self, max_messages: usize) -> Self {
        self.working = WorkingConfig { max_messages };
        self
    }

    /// Enable short-term memory
    pub fn with_short_term(mut self, max_messages: usize, ttl_seconds: u64) -> Self {
        self.short_term = Some(ShortTermConfig {
            max_messages,
            ttl_seconds,
        });
        self
    }

    /// Disable short-term memory
    pub fn without_short_term(mut self) -> Self {
        self.short_term = None;
        self
    }

    /// Enable long-term memory
    pub fn with_long_term(mut self, min_importance: f64) -> Self {
        self.long_term = Some(LongTermConfig { min_importance });
        self
    }

    /// Disable long-term memory
    pub fn without_long_term(mut self) -> Self {
        self.long_term = None;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> MemoryResult<()> {
        if self.working.max_messages < 1 {
            return Err(MemoryError::invalid_argument(
                "working.max_messages",
                "must be at least 1",
            ));
        }

        if let Some(ref st) = self.short_term {
            if st.max_messages < 1 {
                return Err(MemoryError::invalid_argument(
                    "short_term.max_messages",
                    "must be at least 1",
                ));
            }
            if st.ttl_seconds < 1 {
                return Err(MemoryError::invalid_argument(
                    "short_term.ttl_seconds",
                    "must be at least 1",
                ));
            }
        }

        if let Some(ref lt) = self.long_term {
            if !(0.0..=1.0).contains(&lt.min_importance) {
                return Err(MemoryError::invalid_argument(
                    "long_term.min_importance",
                    "must be between 0 and 1",
                ));
            }
        }

        Ok(())
    }
}

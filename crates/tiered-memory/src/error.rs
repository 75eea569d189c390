//! Memory Error Types
//!
//! Defines error types for the tiered memory system.

use thiserror::Error;

use crate::memory::MemoryTier;

/// Memory result type alias
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Memory errors
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Bad constructor parameter, importance or config value
    #[error("invalid argument for {field}: {message}")]
    InvalidArgument { field: String, message: String },

    /// A tier could not complete an operation on its collection
    #[error("{tier} memory storage failure: {message}")]
    StorageFailure { tier: MemoryTier, message: String },

    /// Malformed configuration text
    #[error("configuration parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MemoryError {
    /// Create an invalid argument error
    pub fn invalid_argument(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a storage failure for the given tier
    pub fn storage_failure(tier: MemoryTier, message: impl Into<String>) -> Self {
        Self::StorageFailure {
            tier,
            message: message.into(),
        }
    }

    /// Storage failure caused by a poisoned tier lock
    pub(crate) fn lock_poisoned(tier: MemoryTier) -> Self {
        Self::storage_failure(tier, "lock poisoned")
    }

    /// Check if this error is an invalid argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Check if this error is a storage failure
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, Self::StorageFailure { .. })
    }

    /// The tier that failed, for storage failures
    pub fn failed_tier(&self) -> Option<MemoryTier> {
        match self {
            Self::StorageFailure { tier, .. } => Some(*tier),
            _ => None,
        }
    }
}

//! Error types for the cache containers
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache containers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key not present (map accessors `at` / `at_mut`)
    #[error("Key not found")]
    NotFound,

    /// `pop` called on a cache holding no entries
    #[error("Cache is empty")]
    EmptyCache,

    /// Node storage could not be obtained
    #[error("Allocation failure: {0}")]
    AllocationFailure(String),

    /// Rejected configuration parameter
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Bucket index and recency list disagree
    #[error("Invariant violated: {0}")]
    Invariant(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache containers.
pub type Result<T> = std::result::Result<T, CacheError>;

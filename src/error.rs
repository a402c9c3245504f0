//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Both variants are raised before any state is touched, so a failed call
/// leaves the cache exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Capacity was zero or negative
    #[error("Invalid capacity: {0} (must be greater than zero)")]
    InvalidCapacity(i64),

    /// TTL was negative
    #[error("Invalid TTL: {0}ms (must not be negative)")]
    InvalidTtl(i64),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

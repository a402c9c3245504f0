//! Prio TTL Cache - A bounded in-memory cache
//!
//! Evicts expired entries in bulk first, then the least recently used entry
//! of the lowest priority class.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{Cache, CacheStats, Clock, Entry, ManualClock, SystemClock};
pub use config::Config;
pub use error::{CacheError, Result};

//! Cache Module
//!
//! Provides a bounded in-memory cache evicting by expiration first, then by
//! lowest priority class, then by least recent use within that class.

mod clock;
mod entry;
mod expiration;
mod priority;
mod recency;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::Entry;
pub use expiration::ExpirationIndex;
pub use priority::PriorityIndex;
pub use recency::RecencyList;
pub use stats::CacheStats;
pub use store::Cache;

//! Local caching module for offline data access.
//!
//! Results of the last successful fetch are kept in a flat key-value store
//! (`data` and `time` keys) so the table can be shown immediately on the
//! next start. Data is considered stale after 12 hours.
//!
//! User preferences (`zipInput`, `distanceInput`) live in the same store;
//! see [`crate::prefs`].

pub mod manager;
pub mod store;

pub use manager::{elapsed_since, CacheEntry, CacheManager, DEFAULT_STALE_AFTER_HOURS};
pub use store::{FileStore, KeyValueStore, MemoryStore};

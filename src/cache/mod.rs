//! Cache Module
//!
//! Fixed-bucket LRU and time-bounded LRU containers. One node arena backs
//! both a hash index (for lookup) and a recency list (for eviction order).

mod buckets;
mod clock;
mod engine;
mod facade;
mod iter;
mod lru;
mod node;
mod policy;
mod shape;
mod stats;


// Re-export public types
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use engine::Cache;
pub use facade::{LruMap, LruSet, TimedLruMap, TimedLruSet};
pub use iter::Iter;
pub use node::Position;
pub use policy::{EvictionPolicy, SizeAndExpiryBound, SizeBound};
pub use shape::{MapShape, NodeShape, SetShape};
pub use stats::CacheStats;

// == Public Constants ==
/// Hash chains allocated when no bucket count is given
pub const DEFAULT_BUCKET_COUNT: usize = 32;

/// Entry bound of a default-constructed size-bound cache
pub const DEFAULT_MAX_SIZE: usize = 1024;

/// Freshness window used by [`CacheConfig`](crate::CacheConfig) when none is configured
pub const DEFAULT_EXPIRE_MS: u64 = 60_000;

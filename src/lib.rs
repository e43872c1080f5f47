//! Timed LRU - fixed-bucket LRU and time-bounded LRU containers
//!
//! Provides sets and maps with least-recently-used eviction, optionally
//! gated on per-entry expiry.
//!
//! ```
//! use std::time::Duration;
//! use timed_lru::{ManualClock, TimedLruSet};
//!
//! let clock = ManualClock::new();
//! let mut set = TimedLruSet::with_clock(2, Duration::from_millis(100), clock.clone());
//!
//! set.push("a").unwrap();
//! set.push("b").unwrap();
//! set.push("c").unwrap();
//! // "a" is still fresh, so nothing was evicted
//! assert_eq!(set.len(), 3);
//!
//! clock.advance(Duration::from_millis(150));
//! set.push("d").unwrap();
//! assert!(!set.contains("a"));
//! assert_eq!(set.len(), 3);
//! ```

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{
    Cache, CacheStats, Clock, EvictionPolicy, LruMap, LruSet, ManualClock, MonotonicClock,
    Position, SizeAndExpiryBound, SizeBound, TimedLruMap, TimedLruSet,
};
pub use config::CacheConfig;
pub use error::{CacheError, Result};

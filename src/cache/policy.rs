//! Eviction Policy Module
//!
//! Decides whether a cache is over its limit, given the entry count and the
//! stamp of its least recently used node. The engine itself never looks at
//! time or capacity; it asks the policy.
//!
//! # Policies
//! - [`SizeBound`]: over limit once the entry count exceeds `max_size`.
//! - [`SizeAndExpiryBound`]: over limit once the entry count exceeds
//!   `max_size` *and* the least recently used entry has aged past `expire`.
//!   Fresh entries are never evicted for capacity, so the cache may hold
//!   more than `max_size` entries while they are all fresh.

use std::fmt;
use std::time::{Duration, Instant};

use crate::cache::clock::{Clock, MonotonicClock};

/// Capacity/expiry predicate plugged into [`Cache`](crate::Cache).
pub trait EvictionPolicy {
    /// Per-node data the policy needs, refreshed on every push.
    type Stamp: Copy + fmt::Debug;

    /// Stamp for a node pushed now.
    fn stamp(&self) -> Self::Stamp;

    /// Whether a cache holding `len` entries is over limit, `lru` being the
    /// stamp of its least recently used entry.
    fn is_over_limit(&self, len: usize, max_size: usize, lru: Option<&Self::Stamp>) -> bool;
}

// == Size Bound ==
/// Plain LRU limit: entry count only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeBound;

impl EvictionPolicy for SizeBound {
    type Stamp = ();

    fn stamp(&self) -> Self::Stamp {}

    fn is_over_limit(&self, len: usize, max_size: usize, _lru: Option<&()>) -> bool {
        len > max_size
    }
}

// == Size And Expiry Bound ==
/// Time-bounded LRU limit.
///
/// Stamps record when a node was last pushed; a node's expiry is that
/// instant plus the current `expire`, so changing `expire` applies to every
/// live entry.
#[derive(Debug, Clone)]
pub struct SizeAndExpiryBound<C = MonotonicClock> {
    expire: Duration,
    clock: C,
}

impl SizeAndExpiryBound<MonotonicClock> {
    pub fn new(expire: Duration) -> Self {
        Self::with_clock(expire, MonotonicClock)
    }
}

impl<C: Clock> SizeAndExpiryBound<C> {
    pub fn with_clock(expire: Duration, clock: C) -> Self {
        Self { expire, clock }
    }

    pub fn expire(&self) -> Duration {
        self.expire
    }

    pub fn set_expire(&mut self, expire: Duration) {
        self.expire = expire;
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Instant after which an entry pushed at `touched_at` counts as expired.
    ///
    /// `None` when the deadline is not representable (effectively never).
    pub fn expires_at(&self, touched_at: Instant) -> Option<Instant> {
        touched_at.checked_add(self.expire)
    }

    // == Is Expired ==
    /// Strict comparison: an entry whose deadline equals `now` is still fresh.
    pub fn is_expired(&self, touched_at: Instant, now: Instant) -> bool {
        self.expires_at(touched_at)
            .map_or(false, |deadline| deadline < now)
    }
}

impl<C: Clock> EvictionPolicy for SizeAndExpiryBound<C> {
    type Stamp = Instant;

    fn stamp(&self) -> Instant {
        self.clock.now()
    }

    fn is_over_limit(&self, len: usize, max_size: usize, lru: Option<&Instant>) -> bool {
        if len <= max_size {
            return false;
        }
        lru.map_or(false, |touched_at| {
            self.is_expired(*touched_at, self.clock.now())
        })
    }
}

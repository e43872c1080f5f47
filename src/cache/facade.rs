//! Facade Module
//!
//! The four public containers. Each one is the generic [`Cache`] with a
//! node shape and an eviction policy fixed:
//!
//! | Type            | Stored value | Policy                 |
//! |-----------------|--------------|------------------------|
//! | [`LruSet`]      | `T`          | [`SizeBound`]          |
//! | [`LruMap`]      | `(K, V)`     | [`SizeBound`]          |
//! | [`TimedLruSet`] | `T`          | [`SizeAndExpiryBound`] |
//! | [`TimedLruMap`] | `(K, V)`     | [`SizeAndExpiryBound`] |

use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};
use std::time::{Duration, Instant};

use crate::cache::clock::{Clock, MonotonicClock};
use crate::cache::engine::Cache;
use crate::cache::policy::{EvictionPolicy, SizeAndExpiryBound, SizeBound};
use crate::cache::shape::{MapShape, NodeShape, SetShape};
use crate::cache::{DEFAULT_BUCKET_COUNT, DEFAULT_MAX_SIZE};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

/// LRU set of `T`.
///
/// ```
/// use timed_lru::LruSet;
///
/// let mut set = LruSet::new(2);
/// set.push("a").unwrap();
/// set.push("b").unwrap();
/// set.push("c").unwrap();
///
/// assert!(!set.contains("a"));
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec!["c", "b"]);
/// ```
pub type LruSet<T, S = RandomState> = Cache<SetShape<T>, SizeBound, S>;

/// LRU map from `K` to `V`.
///
/// ```
/// use timed_lru::LruMap;
///
/// let mut map = LruMap::new(2);
/// map.insert("a", 1).unwrap();
/// map.insert("b", 2).unwrap();
/// map.insert("a", 10).unwrap();
/// map.insert("c", 3).unwrap();
///
/// assert_eq!(map.get("a"), Some(&10));
/// assert_eq!(map.get("b"), None);
/// ```
pub type LruMap<K, V, S = RandomState> = Cache<MapShape<K, V>, SizeBound, S>;

/// LRU set whose entries are evicted for capacity only once expired.
pub type TimedLruSet<T, C = MonotonicClock, S = RandomState> =
    Cache<SetShape<T>, SizeAndExpiryBound<C>, S>;

/// LRU map whose entries are evicted for capacity only once expired.
pub type TimedLruMap<K, V, C = MonotonicClock, S = RandomState> =
    Cache<MapShape<K, V>, SizeAndExpiryBound<C>, S>;

// == Size-Bound Constructors ==
impl<Sh: NodeShape> Cache<Sh, SizeBound, RandomState> {
    /// Creates a size-bound cache with the default bucket count (32).
    pub fn new(max_size: usize) -> Self {
        Self::with_buckets(max_size, DEFAULT_BUCKET_COUNT)
    }

    /// Creates a size-bound cache with `bucket_count` fixed hash chains.
    pub fn with_buckets(max_size: usize, bucket_count: usize) -> Self {
        Self::with_policy(max_size, bucket_count, SizeBound, RandomState::new())
    }

    /// Builds a size-bound cache from validated configuration.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        let cache = Self::with_buckets(config.max_size, config.bucket_count);
        Ok(match config.node_limit {
            Some(limit) => cache.with_node_limit(limit),
            None => cache,
        })
    }
}

impl<Sh: NodeShape, S: BuildHasher> Cache<Sh, SizeBound, S> {
    pub fn with_hasher(max_size: usize, bucket_count: usize, hasher: S) -> Self {
        Self::with_policy(max_size, bucket_count, SizeBound, hasher)
    }
}

impl<Sh: NodeShape, S: BuildHasher + Default> Default for Cache<Sh, SizeBound, S> {
    /// Bounded at 1024 entries over 32 buckets.
    fn default() -> Self {
        Self::with_policy(DEFAULT_MAX_SIZE, DEFAULT_BUCKET_COUNT, SizeBound, S::default())
    }
}

// == Timed Constructors ==
impl<Sh: NodeShape> Cache<Sh, SizeAndExpiryBound<MonotonicClock>, RandomState> {
    /// Creates a time-bounded cache with the default bucket count (32).
    ///
    /// # Arguments
    /// * `max_size` - Entry count above which expired entries are evicted
    /// * `expire` - Time after its last push at which an entry becomes evictable
    pub fn new(max_size: usize, expire: Duration) -> Self {
        Self::with_buckets(max_size, DEFAULT_BUCKET_COUNT, expire)
    }

    pub fn with_buckets(max_size: usize, bucket_count: usize, expire: Duration) -> Self {
        Self::with_policy(
            max_size,
            bucket_count,
            SizeAndExpiryBound::new(expire),
            RandomState::new(),
        )
    }

    /// Builds a time-bounded cache from validated configuration.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        let cache = Self::with_buckets(config.max_size, config.bucket_count, config.expire());
        Ok(match config.node_limit {
            Some(limit) => cache.with_node_limit(limit),
            None => cache,
        })
    }
}

impl<Sh: NodeShape, C: Clock> Cache<Sh, SizeAndExpiryBound<C>, RandomState> {
    /// Creates a time-bounded cache reading time from `clock`.
    pub fn with_clock(max_size: usize, expire: Duration, clock: C) -> Self {
        Self::with_policy(
            max_size,
            DEFAULT_BUCKET_COUNT,
            SizeAndExpiryBound::with_clock(expire, clock),
            RandomState::new(),
        )
    }
}

// == Timed Accessors ==
impl<Sh: NodeShape, C: Clock, S> Cache<Sh, SizeAndExpiryBound<C>, S> {
    pub fn expire(&self) -> Duration {
        self.policy().expire()
    }

    /// Changes the freshness window and evicts from the LRU end while over limit.
    ///
    /// Returns the number of entries evicted. Lengthening the window never evicts.
    pub fn set_expire(&mut self, expire: Duration) -> usize {
        self.policy_mut().set_expire(expire);
        self.enforce_limit()
    }

    pub fn clock(&self) -> &C {
        self.policy().clock()
    }
}

impl<Sh: NodeShape, C: Clock, S: BuildHasher> Cache<Sh, SizeAndExpiryBound<C>, S> {
    /// Instant after which the entry for `key` becomes evictable.
    pub fn expires_at<Q>(&self, key: &Q) -> Option<Instant>
    where
        Sh::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.locate(key)?;
        self.policy().expires_at(self.stamp_of(id))
    }

    /// Whether the entry for `key` has aged past the freshness window.
    /// `false` for absent keys.
    pub fn is_expired<Q>(&self, key: &Q) -> bool
    where
        Sh::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.locate(key).map_or(false, |id| {
            let policy = self.policy();
            policy.is_expired(self.stamp_of(id), policy.clock().now())
        })
    }
}

// == Map Accessors ==
impl<K, V, P, S> Cache<MapShape<K, V>, P, S>
where
    K: Hash + Eq,
    P: EvictionPolicy,
    S: BuildHasher,
{
    /// Inserts or refreshes `key`. Same contract as [`Cache::push`].
    pub fn insert(&mut self, key: K, value: V) -> Result<bool> {
        self.push((key, value))
    }

    /// Value for `key`, without touching recency or expiry.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(key).map(|(_, value)| value)
    }

    /// Mutable value for `key`. Recency and expiry are left alone.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.locate(key)?;
        Some(&mut self.value_mut(id).1)
    }

    // == At ==
    /// Value for `key`.
    ///
    /// # Errors
    /// `NotFound` if the key is not cached.
    pub fn at<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).ok_or(CacheError::NotFound)
    }

    pub fn at_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_mut(key).ok_or(CacheError::NotFound)
    }

    // == Get Or Insert Default ==
    /// Value for `key`, pushing `V::default()` first if the key is absent.
    ///
    /// An existing entry is returned as is, without promotion.
    pub fn get_or_insert_default(&mut self, key: K) -> Result<&mut V>
    where
        V: Default,
    {
        let id = match self.locate(&key) {
            Some(id) => id,
            None => {
                self.push((key, V::default()))?;
                self.front_id().ok_or(CacheError::NotFound)?
            }
        };
        Ok(&mut self.value_mut(id).1)
    }

    /// Removes `key` and returns its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.take(key).map(|(_, value)| value)
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Values from most to least recently used.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator + '_ {
        self.iter().map(|(_, value)| value)
    }
}

//! Cache Engine Module
//!
//! Generic cache combining the fixed bucket index with the recency list over
//! one node arena, parametrized by node shape and eviction policy.
//!
//! # Push
//! 1. Hit: overwrite the stored value in place, refresh the stamp, promote
//!    to most recently used. Returns `false`.
//! 2. Miss within limit: allocate a node, link it into its chain and at the
//!    list head. Returns `true`.
//! 3. Miss over limit: take the least recently used node, unlink it from
//!    both indexes, overwrite it with the new entry and relink it as most
//!    recently used. No allocation happens. Returns `true`.
//!
//! The over-limit check for a miss asks the policy about `len + 1` entries,
//! i.e. the state the cache would be in after inserting.

use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;

use tracing::{debug, trace};

use crate::cache::buckets::BucketIndex;
use crate::cache::iter::Iter;
use crate::cache::lru::RecencyList;
use crate::cache::node::{Node, NodeArena, NodeId, Position};
use crate::cache::policy::EvictionPolicy;
use crate::cache::shape::NodeShape;
use crate::cache::stats::CacheStats;
use crate::error::{CacheError, Result};

// == Cache ==
/// Dual-indexed LRU cache.
///
/// Usually named through one of the facade aliases
/// ([`LruSet`](crate::LruSet), [`LruMap`](crate::LruMap),
/// [`TimedLruSet`](crate::TimedLruSet), [`TimedLruMap`](crate::TimedLruMap)).
///
/// Read-only methods take `&self` and never reorder entries or refresh
/// expiry; share a cache across threads by wrapping the whole value in a lock.
pub struct Cache<Sh: NodeShape, P: EvictionPolicy, S = RandomState> {
    arena: NodeArena<Node<Sh::Value, P::Stamp>>,
    buckets: BucketIndex,
    list: RecencyList,
    max_size: usize,
    policy: P,
    hasher: S,
    stats: CacheStats,
    _shape: PhantomData<Sh>,
}

impl<Sh: NodeShape, P: EvictionPolicy, S> Cache<Sh, P, S> {
    // == Constructor ==
    /// Creates a cache with an explicit bucket count, policy and hasher.
    ///
    /// # Arguments
    /// * `max_size` - Entry count the policy measures against
    /// * `bucket_count` - Number of hash chains, fixed for the cache's lifetime (min 1)
    /// * `policy` - Eviction policy
    /// * `hasher` - Hash builder for keys
    pub fn with_policy(max_size: usize, bucket_count: usize, policy: P, hasher: S) -> Self {
        Self {
            arena: NodeArena::new(),
            buckets: BucketIndex::new(bucket_count),
            list: RecencyList::new(),
            max_size,
            policy,
            hasher,
            stats: CacheStats::new(),
            _shape: PhantomData,
        }
    }

    /// Caps the number of nodes the cache may ever hold at once.
    ///
    /// Pushes that need a fresh node past this limit fail with
    /// `AllocationFailure`.
    pub fn with_node_limit(mut self, limit: usize) -> Self {
        self.arena.set_limit(Some(limit));
        self
    }

    pub fn node_limit(&self) -> Option<usize> {
        self.arena.limit()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    // == Set Max Size ==
    /// Changes the size bound and evicts from the LRU end while over limit.
    ///
    /// Returns the number of entries evicted. Raising the bound never evicts.
    pub fn set_max_size(&mut self, max_size: usize) -> usize {
        self.max_size = max_size;
        self.enforce_limit()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Length of the longest hash chain.
    pub fn max_chain_len(&self) -> usize {
        self.buckets.max_chain_len(&self.arena)
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.len());
        stats
    }

    // == Iteration ==
    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> Iter<'_, Sh::Value, P::Stamp> {
        Iter {
            arena: &self.arena,
            front: self.list.front(),
            back: self.list.back(),
            remaining: self.list.len(),
        }
    }

    /// Most recently used entry.
    pub fn front(&self) -> Option<&Sh::Value> {
        self.list.front().map(|id| &self.arena[id].value)
    }

    /// Least recently used entry, the next eviction candidate.
    pub fn back(&self) -> Option<&Sh::Value> {
        self.list.back().map(|id| &self.arena[id].value)
    }

    pub fn front_position(&self) -> Option<Position> {
        self.list.front().map(|id| self.arena.position(id))
    }

    pub fn back_position(&self) -> Option<Position> {
        self.list.back().map(|id| self.arena.position(id))
    }

    /// Entry behind `pos`, or `None` if it was erased or recycled since.
    pub fn get_at(&self, pos: Position) -> Option<&Sh::Value> {
        self.arena.resolve(pos).map(|id| &self.arena[id].value)
    }

    /// Position of the next less recently used entry after `pos`.
    pub fn next_position(&self, pos: Position) -> Option<Position> {
        let id = self.arena.resolve(pos)?;
        self.arena[id].recency.next.map(|next| self.arena.position(next))
    }

    // == Pop ==
    /// Evicts the least recently used entry and returns it.
    ///
    /// # Errors
    /// `EmptyCache` if there is nothing to evict.
    pub fn pop(&mut self) -> Result<Sh::Value> {
        let id = self.list.back().ok_or(CacheError::EmptyCache)?;
        let value = self.remove_node(id).ok_or(CacheError::EmptyCache)?;
        self.stats.record_eviction();
        Ok(value)
    }

    // == Erase At ==
    /// Removes the entry behind `pos`.
    ///
    /// Returns the position of the entry that followed it in recency order.
    /// A stale position is a no-op returning `None`.
    pub fn erase_at(&mut self, pos: Position) -> Option<Position> {
        let id = self.arena.resolve(pos)?;
        let next = self.arena[id].recency.next;
        self.remove_node(id)?;
        self.stats.record_removal();
        next.map(|next| self.arena.position(next))
    }

    // == Clear ==
    /// Drops every entry. The bucket count and limits are kept.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.buckets.clear();
        self.list.clear();
    }

    pub(crate) fn policy_mut(&mut self) -> &mut P {
        &mut self.policy
    }

    pub(crate) fn value_mut(&mut self, id: NodeId) -> &mut Sh::Value {
        &mut self.arena[id].value
    }

    pub(crate) fn stamp_of(&self, id: NodeId) -> P::Stamp {
        self.arena[id].stamp
    }

    pub(crate) fn front_id(&self) -> Option<NodeId> {
        self.list.front()
    }

    fn is_over_limit(&self, len: usize) -> bool {
        let lru = self.list.back().map(|id| &self.arena[id].stamp);
        self.policy.is_over_limit(len, self.max_size, lru)
    }

    /// Pops from the LRU end while the policy reports the cache over limit.
    pub(crate) fn enforce_limit(&mut self) -> usize {
        let mut evicted = 0;
        while self.is_over_limit(self.list.len()) {
            if self.pop().is_err() {
                break;
            }
            evicted += 1;
        }
        if evicted > 0 {
            debug!(evicted, max_size = self.max_size, "evicted entries to fit limit");
        }
        evicted
    }

    fn remove_node(&mut self, id: NodeId) -> Option<Sh::Value> {
        self.buckets.unlink(&mut self.arena, id);
        self.list.unlink(&mut self.arena, id);
        self.arena.release(id).map(|node| node.value)
    }
}

impl<Sh, P, S> Cache<Sh, P, S>
where
    Sh: NodeShape,
    P: EvictionPolicy,
    S: BuildHasher,
{
    pub(crate) fn locate<Q>(&self, key: &Q) -> Option<NodeId>
    where
        Sh::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hasher.hash_one(key);
        self.buckets.find(&self.arena, hash, |value| {
            <Sh::Key as Borrow<Q>>::borrow(Sh::key(value)) == key
        })
    }

    // == Find ==
    /// Looks up an entry by key without touching recency or expiry.
    pub fn find<Q>(&self, key: &Q) -> Option<&Sh::Value>
    where
        Sh::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.locate(key).map(|id| &self.arena[id].value)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        Sh::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.locate(key).is_some()
    }

    /// Position of the entry for `key`, for use with [`Cache::erase_at`].
    pub fn position<Q>(&self, key: &Q) -> Option<Position>
    where
        Sh::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.locate(key).map(|id| self.arena.position(id))
    }

    // == Push ==
    /// Inserts or refreshes an entry and makes it the most recently used.
    ///
    /// Returns `true` if the key was not cached before, `false` if an
    /// existing entry was overwritten.
    ///
    /// # Errors
    /// `AllocationFailure` if a new node is needed and none can be obtained.
    pub fn push(&mut self, value: Sh::Value) -> Result<bool> {
        let hash = self.hasher.hash_one(Sh::key(&value));
        let found = self.buckets.find(&self.arena, hash, |stored| {
            Sh::key(stored) == Sh::key(&value)
        });

        if let Some(id) = found {
            let stamp = self.policy.stamp();
            let node = &mut self.arena[id];
            node.value = value;
            node.stamp = stamp;
            self.list.move_to_front(&mut self.arena, id);
            self.stats.record_refresh();
            trace!(slot = id.index(), "refreshed entry");
            return Ok(false);
        }

        if self.is_over_limit(self.list.len() + 1) {
            if let Some(victim) = self.list.back() {
                self.recycle(victim, value, hash);
                return Ok(true);
            }
        }

        let id = self
            .arena
            .allocate(Node::new(value, self.policy.stamp(), hash))?;
        self.buckets.link(&mut self.arena, id);
        self.list.push_front(&mut self.arena, id);
        self.stats.record_insertion();
        Ok(true)
    }

    /// Same as [`Cache::push`].
    pub fn emplace(&mut self, value: Sh::Value) -> Result<bool> {
        self.push(value)
    }

    /// Same as [`Cache::push`]; the hint is accepted for API parity and ignored.
    pub fn emplace_hint(&mut self, _hint: Option<Position>, value: Sh::Value) -> Result<bool> {
        self.push(value)
    }

    // == Recycle ==
    /// Reuses the node of an evicted entry for a new one.
    fn recycle(&mut self, id: NodeId, value: Sh::Value, hash: u64) {
        self.buckets.unlink(&mut self.arena, id);
        self.list.unlink(&mut self.arena, id);

        let stamp = self.policy.stamp();
        let node = &mut self.arena[id];
        node.value = value;
        node.stamp = stamp;
        node.hash = hash;
        self.arena.renew(id);

        self.buckets.link(&mut self.arena, id);
        self.list.push_front(&mut self.arena, id);
        self.stats.record_eviction();
        self.stats.record_insertion();
        trace!(slot = id.index(), "recycled least recently used node");
    }

    // == Erase ==
    /// Removes the entry for `key`.
    ///
    /// Returns the position following the removed entry, `None` if the key
    /// was absent or the entry was the least recently used.
    pub fn erase<Q>(&mut self, key: &Q) -> Option<Position>
    where
        Sh::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let pos = self.position(key)?;
        self.erase_at(pos)
    }

    /// Removes the entry for `key` and returns it.
    pub fn take<Q>(&mut self, key: &Q) -> Option<Sh::Value>
    where
        Sh::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.locate(key)?;
        let value = self.remove_node(id)?;
        self.stats.record_removal();
        Some(value)
    }

    // == Check Invariants ==
    /// Verifies that the bucket index and the recency list describe the same
    /// set of unique entries.
    pub fn check_invariants(&self) -> Result<()> {
        let len = self.list.len();
        if self.arena.len() != len {
            return Err(CacheError::Invariant(format!(
                "arena holds {} nodes, list reports {}",
                self.arena.len(),
                len
            )));
        }

        let mut walked = 0;
        let mut prev = None;
        let mut cursor = self.list.front();
        while let Some(id) = cursor {
            let node = self.arena.get(id).ok_or_else(|| {
                CacheError::Invariant(format!("list links dead node {}", id.index()))
            })?;
            if node.recency.prev != prev {
                return Err(CacheError::Invariant(format!(
                    "broken back link at node {}",
                    id.index()
                )));
            }
            walked += 1;
            if walked > len {
                return Err(CacheError::Invariant("recency list has a cycle".to_string()));
            }
            prev = Some(id);
            cursor = node.recency.next;
        }
        if walked != len || self.list.back() != prev {
            return Err(CacheError::Invariant(format!(
                "walked {} list nodes, expected {}",
                walked, len
            )));
        }

        let mut chained = 0;
        for slot in 0..self.buckets.len() {
            let ids: Vec<NodeId> = self.buckets.chain(&self.arena, slot).take(len + 1).collect();
            for (i, &id) in ids.iter().enumerate() {
                let node = &self.arena[id];
                if self.hasher.hash_one(Sh::key(&node.value)) != node.hash
                    || self.buckets.slot_of(node.hash) != slot
                {
                    return Err(CacheError::Invariant(format!(
                        "node {} sits in the wrong chain",
                        id.index()
                    )));
                }
                let duplicate = ids[..i]
                    .iter()
                    .any(|&other| Sh::key(&self.arena[other].value) == Sh::key(&node.value));
                if duplicate {
                    return Err(CacheError::Invariant(format!(
                        "duplicate key in chain {}",
                        slot
                    )));
                }
            }
            chained += ids.len();
        }
        if chained != len {
            return Err(CacheError::Invariant(format!(
                "bucket chains hold {} nodes, list holds {}",
                chained, len
            )));
        }
        Ok(())
    }
}

impl<'a, Sh: NodeShape, P: EvictionPolicy, S> IntoIterator for &'a Cache<Sh, P, S> {
    type Item = &'a Sh::Value;
    type IntoIter = Iter<'a, Sh::Value, P::Stamp>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<Sh, P, S> fmt::Debug for Cache<Sh, P, S>
where
    Sh: NodeShape,
    Sh::Value: fmt::Debug,
    P: EvictionPolicy,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::policy::SizeBound;
    use crate::cache::shape::{MapShape, SetShape};

    type Set = Cache<SetShape<&'static str>, SizeBound>;
    type Map = Cache<MapShape<&'static str, u32>, SizeBound>;

    fn set(max_size: usize, buckets: usize) -> Set {
        Cache::with_policy(max_size, buckets, SizeBound, RandomState::new())
    }

    fn keys(cache: &Set) -> Vec<&'static str> {
        cache.iter().copied().collect()
    }

    #[test]
    fn test_engine_new() {
        let cache = set(3, 8);
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.bucket_count(), 8);
        assert_eq!(cache.front(), None);
        assert!(cache.check_invariants().is_ok());
    }

    #[test]
    fn test_push_miss_then_hit() {
        let mut cache = set(3, 8);
        assert!(cache.push("a").unwrap());
        assert!(cache.push("b").unwrap());
        assert!(!cache.push("a").unwrap());

        assert_eq!(keys(&cache), vec!["a", "b"]);
        assert_eq!(cache.stats().insertions, 2);
        assert_eq!(cache.stats().refreshes, 1);
    }

    #[test]
    fn test_push_over_limit_recycles_tail_node() {
        let mut cache = set(2, 8);
        cache.push("a").unwrap();
        cache.push("b").unwrap();
        let slots_before = cache.arena.capacity();

        assert!(cache.push("c").unwrap());
        assert_eq!(keys(&cache), vec!["c", "b"]);
        assert_eq!(cache.arena.capacity(), slots_before);
        assert!(!cache.contains("a"));
        assert_eq!(cache.stats().evictions, 1);
        assert!(cache.check_invariants().is_ok());
    }

    #[test]
    fn test_recycled_position_goes_stale() {
        let mut cache = set(1, 4);
        cache.push("a").unwrap();
        let pos = cache.position("a").unwrap();

        cache.push("b").unwrap();
        assert_eq!(cache.get_at(pos), None);
        assert_eq!(cache.erase_at(pos), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_single_bucket_chain() {
        let mut cache = set(10, 1);
        for key in ["a", "b", "c", "d"] {
            cache.push(key).unwrap();
        }
        assert_eq!(cache.max_chain_len(), 4);
        assert!(cache.contains("b"));
        cache.erase("c");
        assert_eq!(cache.max_chain_len(), 3);
        assert!(cache.check_invariants().is_ok());
    }

    #[test]
    fn test_pop_order_and_empty() {
        let mut cache = set(3, 8);
        cache.push("a").unwrap();
        cache.push("b").unwrap();

        assert_eq!(cache.pop().unwrap(), "a");
        assert_eq!(cache.pop().unwrap(), "b");
        assert_eq!(cache.pop(), Err(CacheError::EmptyCache));
    }

    #[test]
    fn test_erase_at_returns_next() {
        let mut cache = set(5, 8);
        for key in ["a", "b", "c"] {
            cache.push(key).unwrap();
        }
        // order: c, b, a
        let pos = cache.position("b").unwrap();
        let next = cache.erase_at(pos).unwrap();
        assert_eq!(cache.get_at(next), Some(&"a"));
        assert_eq!(cache.erase("a"), None);
        assert_eq!(keys(&cache), vec!["c"]);
    }

    #[test]
    fn test_set_max_size_shrinks() {
        let mut cache = set(5, 8);
        for key in ["a", "b", "c", "d"] {
            cache.push(key).unwrap();
        }
        assert_eq!(cache.set_max_size(2), 2);
        assert_eq!(keys(&cache), vec!["d", "c"]);
        assert_eq!(cache.set_max_size(10), 0);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_zero_max_size_keeps_newest() {
        let mut cache = set(3, 8);
        cache.push("a").unwrap();
        cache.set_max_size(0);
        assert!(cache.is_empty());

        cache.push("b").unwrap();
        cache.push("c").unwrap();
        assert_eq!(keys(&cache), vec!["c"]);
    }

    #[test]
    fn test_node_limit_fails_allocation() {
        let mut cache = Cache::<SetShape<u32>, SizeBound>::with_policy(
            10,
            4,
            SizeBound,
            RandomState::new(),
        )
        .with_node_limit(2);
        cache.push(1).unwrap();
        cache.push(2).unwrap();

        assert!(matches!(cache.push(3), Err(CacheError::AllocationFailure(_))));
        assert_eq!(cache.len(), 2);
        assert!(!cache.push(1).unwrap());
        assert!(cache.check_invariants().is_ok());
    }

    #[test]
    fn test_clear_resets() {
        let mut cache = set(3, 8);
        cache.push("a").unwrap();
        let pos = cache.position("a").unwrap();
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.get_at(pos), None);
        assert!(cache.push("a").unwrap());
        assert!(cache.check_invariants().is_ok());
    }

    #[test]
    fn test_map_shape_hashes_on_key_only() {
        let mut cache: Map = Cache::with_policy(4, 8, SizeBound, RandomState::new());
        cache.push(("x", 1)).unwrap();
        assert!(!cache.push(("x", 2)).unwrap());

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.find("x"), Some(&("x", 2)));
    }

    #[test]
    fn test_iter_both_directions() {
        let mut cache = set(5, 8);
        for key in ["a", "b", "c"] {
            cache.push(key).unwrap();
        }
        let mut iter = cache.iter();
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.next(), Some(&"c"));
        assert_eq!(iter.next_back(), Some(&"a"));
        assert_eq!(iter.next(), Some(&"b"));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);

        let reversed: Vec<_> = cache.iter().rev().copied().collect();
        assert_eq!(reversed, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_debug_lists_entries() {
        let mut cache = set(5, 8);
        cache.push("a").unwrap();
        cache.push("b").unwrap();
        assert_eq!(format!("{:?}", cache), r#"["b", "a"]"#);
    }
}

//! Node Module
//!
//! Defines the node shared by the bucket index and the recency list, and the
//! slot arena that hands out node storage.
//!
//! Both indexes link nodes by [`NodeId`] instead of pointers, so one node is a
//! member of its hash chain and of the recency list at the same time without
//! any aliasing. Freed slots go on a free list and are reused by the next
//! allocation; every free or recycle bumps the slot generation so a stale
//! [`Position`] can never resolve to a different entry.

use std::ops::{Index, IndexMut};

use tracing::warn;

use crate::error::{CacheError, Result};

// == Node Id ==
/// Index of a slot in the [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

// == Position ==
/// Handle to one live entry, the equivalent of a container iterator.
///
/// A position stays valid until its entry is erased, popped, cleared or
/// recycled by an eviction. Resolving a stale position yields `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub(crate) id: NodeId,
    pub(crate) generation: u32,
}

// == Link ==
/// Previous/next pair used by both the recency list and the bucket chains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Link {
    pub(crate) prev: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
}

// == Node ==
/// One cached value plus its linkage in both indexes.
#[derive(Debug)]
pub(crate) struct Node<T, E> {
    /// The stored value (a key for sets, a key/value pair for maps)
    pub(crate) value: T,
    /// Policy stamp: `()` for size-bound caches, last push time for timed ones
    pub(crate) stamp: E,
    /// Hash of the key, kept so unlinking never rehashes
    pub(crate) hash: u64,
    /// Position in the recency list
    pub(crate) recency: Link,
    /// Position in the bucket chain
    pub(crate) chain: Link,
}

impl<T, E> Node<T, E> {
    pub(crate) fn new(value: T, stamp: E, hash: u64) -> Self {
        Self {
            value,
            stamp,
            hash,
            recency: Link::default(),
            chain: Link::default(),
        }
    }
}

#[derive(Debug)]
struct Slot<N> {
    generation: u32,
    node: Option<N>,
}

// == Node Arena ==
/// Slot arena acting as the node allocator.
#[derive(Debug)]
pub(crate) struct NodeArena<N> {
    slots: Vec<Slot<N>>,
    free: Vec<usize>,
    len: usize,
    /// Hard ceiling on live nodes, None = bounded only by memory
    limit: Option<usize>,
}

impl<N> NodeArena<N> {
    // == Constructor ==
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            limit: None,
        }
    }

    pub(crate) fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
    }

    pub(crate) fn limit(&self) -> Option<usize> {
        self.limit
    }

    // == Allocate ==
    /// Stores `node` in a free slot, growing the arena if needed.
    ///
    /// # Errors
    /// `AllocationFailure` when the node limit is reached or the slot
    /// vector cannot grow.
    pub(crate) fn allocate(&mut self, node: N) -> Result<NodeId> {
        if let Some(limit) = self.limit {
            if self.len >= limit {
                warn!(limit, "node arena exhausted");
                return Err(CacheError::AllocationFailure(format!(
                    "node limit {} reached",
                    limit
                )));
            }
        }

        if let Some(idx) = self.free.pop() {
            self.slots[idx].node = Some(node);
            self.len += 1;
            return Ok(NodeId(idx));
        }

        if let Err(err) = self.slots.try_reserve(1) {
            warn!(error = %err, "node arena could not grow");
            return Err(CacheError::AllocationFailure(err.to_string()));
        }
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        self.len += 1;
        Ok(NodeId(self.slots.len() - 1))
    }

    // == Release ==
    /// Frees the slot behind `id` and returns the node it held.
    pub(crate) fn release(&mut self, id: NodeId) -> Option<N> {
        let slot = self.slots.get_mut(id.0)?;
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.0);
        self.len -= 1;
        Some(node)
    }

    // == Renew ==
    /// Invalidates outstanding positions for a node that now holds another entry.
    pub(crate) fn renew(&mut self, id: NodeId) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            slot.generation = slot.generation.wrapping_add(1);
        }
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&N> {
        self.slots.get(id.0).and_then(|slot| slot.node.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut N> {
        self.slots.get_mut(id.0).and_then(|slot| slot.node.as_mut())
    }

    pub(crate) fn position(&self, id: NodeId) -> Position {
        Position {
            id,
            generation: self.slots[id.0].generation,
        }
    }

    /// Returns the node id behind `pos` if it still refers to the same entry.
    pub(crate) fn resolve(&self, pos: Position) -> Option<NodeId> {
        let slot = self.slots.get(pos.id.0)?;
        (slot.generation == pos.generation && slot.node.is_some()).then_some(pos.id)
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Number of slots ever allocated, live or free.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    // == Clear ==
    /// Drops every node. Slots are kept for reuse and their generations bumped.
    pub(crate) fn clear(&mut self) {
        self.free.clear();
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(idx);
        }
        self.len = 0;
    }
}

impl<N> Default for NodeArena<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> Index<NodeId> for NodeArena<N> {
    type Output = N;

    fn index(&self, id: NodeId) -> &N {
        match self.get(id) {
            Some(node) => node,
            None => panic!("node {} is not live", id.0),
        }
    }
}

impl<N> IndexMut<NodeId> for NodeArena<N> {
    fn index_mut(&mut self, id: NodeId) -> &mut N {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("node {} is not live", id.0),
        }
    }
}

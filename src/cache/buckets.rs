//! Bucket Index Module
//!
//! Fixed-size array of hash chains over the node arena.
//!
//! The bucket count is chosen when the cache is built and never changes;
//! there is no rehash. Callers size it against the expected `max_size` to
//! keep chains short.

use crate::cache::node::{Link, Node, NodeArena, NodeId};

// == Bucket Index ==
#[derive(Debug)]
pub(crate) struct BucketIndex {
    heads: Box<[Option<NodeId>]>,
}

impl BucketIndex {
    // == Constructor ==
    /// Allocates exactly `count` chain heads (at least one).
    pub(crate) fn new(count: usize) -> Self {
        Self {
            heads: vec![None; count.max(1)].into_boxed_slice(),
        }
    }

    /// Number of chains.
    pub(crate) fn len(&self) -> usize {
        self.heads.len()
    }

    pub(crate) fn slot_of(&self, hash: u64) -> usize {
        (hash % self.heads.len() as u64) as usize
    }

    // == Find ==
    /// Scans the chain for `hash` and returns the first node accepted by `is_match`.
    pub(crate) fn find<T, E, F>(
        &self,
        arena: &NodeArena<Node<T, E>>,
        hash: u64,
        mut is_match: F,
    ) -> Option<NodeId>
    where
        F: FnMut(&T) -> bool,
    {
        let mut cursor = self.heads[self.slot_of(hash)];
        while let Some(id) = cursor {
            let node = &arena[id];
            if node.hash == hash && is_match(&node.value) {
                return Some(id);
            }
            cursor = node.chain.next;
        }
        None
    }

    // == Link ==
    /// Pushes `id` onto the head of the chain selected by its stored hash.
    pub(crate) fn link<T, E>(&mut self, arena: &mut NodeArena<Node<T, E>>, id: NodeId) {
        let slot = self.slot_of(arena[id].hash);
        let old_head = self.heads[slot];
        arena[id].chain = Link {
            prev: None,
            next: old_head,
        };
        if let Some(old_head) = old_head {
            arena[old_head].chain.prev = Some(id);
        }
        self.heads[slot] = Some(id);
    }

    // == Unlink ==
    /// Splices `id` out of its chain using the node's own links.
    pub(crate) fn unlink<T, E>(&mut self, arena: &mut NodeArena<Node<T, E>>, id: NodeId) {
        let Link { prev, next } = arena[id].chain;
        match prev {
            Some(prev) => arena[prev].chain.next = next,
            None => {
                let slot = self.slot_of(arena[id].hash);
                self.heads[slot] = next;
            }
        }
        if let Some(next) = next {
            arena[next].chain.prev = prev;
        }
        arena[id].chain = Link::default();
    }

    /// Iterates the node ids of one chain, head first.
    pub(crate) fn chain<'a, T, E>(
        &'a self,
        arena: &'a NodeArena<Node<T, E>>,
        slot: usize,
    ) -> impl Iterator<Item = NodeId> + 'a {
        std::iter::successors(self.heads[slot], move |id| arena[*id].chain.next)
    }

    pub(crate) fn chain_len<T, E>(&self, arena: &NodeArena<Node<T, E>>, slot: usize) -> usize {
        self.chain(arena, slot).count()
    }

    /// Length of the longest chain; a load indicator only.
    pub(crate) fn max_chain_len<T, E>(&self, arena: &NodeArena<Node<T, E>>) -> usize {
        (0..self.heads.len())
            .map(|slot| self.chain_len(arena, slot))
            .max()
            .unwrap_or(0)
    }

    pub(crate) fn clear(&mut self) {
        self.heads.fill(None);
    }
}

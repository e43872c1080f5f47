//! Recency List Module
//!
//! Doubly linked recency order threaded through the node arena.
//!
//! - Head = Most recently used
//! - Tail = Least recently used (next eviction candidate)
//!
//! The list owns no storage: it only rewires the `recency` links of nodes
//! that live in the arena, the same nodes the bucket index chains together.

use crate::cache::node::{Link, Node, NodeArena, NodeId};

// == Recency List ==
#[derive(Debug, Default)]
pub(crate) struct RecencyList {
    head: Option<NodeId>,
    tail: Option<NodeId>,
    len: usize,
}

impl RecencyList {
    // == Constructor ==
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Most recently used node.
    pub(crate) fn front(&self) -> Option<NodeId> {
        self.head
    }

    /// Least recently used node.
    pub(crate) fn back(&self) -> Option<NodeId> {
        self.tail
    }

    // == Push Front ==
    /// Attaches a detached node as the most recently used.
    pub(crate) fn push_front<T, E>(&mut self, arena: &mut NodeArena<Node<T, E>>, id: NodeId) {
        arena[id].recency = Link {
            prev: None,
            next: self.head,
        };
        match self.head {
            Some(head) => arena[head].recency.prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        self.len += 1;
    }

    // == Unlink ==
    /// Detaches `id`, leaving its neighbours linked to each other.
    pub(crate) fn unlink<T, E>(&mut self, arena: &mut NodeArena<Node<T, E>>, id: NodeId) {
        let Link { prev, next } = arena[id].recency;
        match prev {
            Some(prev) => arena[prev].recency.next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => arena[next].recency.prev = prev,
            None => self.tail = prev,
        }
        arena[id].recency = Link::default();
        self.len -= 1;
    }

    // == Move To Front ==
    /// Promotes `id` to most recently used.
    pub(crate) fn move_to_front<T, E>(&mut self, arena: &mut NodeArena<Node<T, E>>, id: NodeId) {
        if self.head == Some(id) {
            return;
        }
        self.unlink(arena, id);
        self.push_front(arena, id);
    }

    pub(crate) fn clear(&mut self) {
        self.head = None;
        self.tail = None;
        self.len = 0;
    }
}

//! Recency-ordered iteration.

use std::iter::FusedIterator;

use crate::cache::node::{Node, NodeArena, NodeId};

/// Iterator over cached values, most recently used first.
///
/// Created by [`Cache::iter`](crate::Cache::iter). Call `.rev()` to walk from
/// the least recently used end.
pub struct Iter<'a, T, E> {
    pub(crate) arena: &'a NodeArena<Node<T, E>>,
    pub(crate) front: Option<NodeId>,
    pub(crate) back: Option<NodeId>,
    pub(crate) remaining: usize,
}

impl<'a, T, E> Iterator for Iter<'a, T, E> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let arena: &'a NodeArena<Node<T, E>> = self.arena;
        let node = &arena[self.front?];
        self.front = node.recency.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T, E> DoubleEndedIterator for Iter<'a, T, E> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let arena: &'a NodeArena<Node<T, E>> = self.arena;
        let node = &arena[self.back?];
        self.back = node.recency.prev;
        self.remaining -= 1;
        Some(&node.value)
    }
}

impl<T, E> ExactSizeIterator for Iter<'_, T, E> {}

impl<T, E> FusedIterator for Iter<'_, T, E> {}

impl<T, E> Clone for Iter<'_, T, E> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

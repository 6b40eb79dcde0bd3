use std::fmt;
use std::iter::FusedIterator;

use super::node::{Node, NodeArena};
use super::LinkedSequence;
use crate::infra::linked_list::{ForwardIter, ForwardNode};

/// A borrowing iterator over the elements of a [`LinkedSequence`].
///
/// Created by [`LinkedSequence::iter`].
pub struct Iter<'a, T> {
    arena: &'a NodeArena<T>,
    nodes: ForwardIter<'a, Node<T>>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.next()?;
        self.remaining -= 1;
        node.value(self.arena)
    }

    fn size_hint(&self) -> (usize, Option<usize>) { (self.remaining, Some(self.remaining)) }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T> FusedIterator for Iter<'a, T> {}

impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena,
            nodes: self.nodes.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, T: fmt::Debug> fmt::Debug for Iter<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iter").field(&self.clone().collect::<Vec<_>>()).finish()
    }
}

/// An owning iterator over the elements of a [`LinkedSequence`].
///
/// Created by [`LinkedSequence::into_iter`]. Each element is unlinked from the
/// front as it is yielded, so dropping the iterator early drops the rest.
pub struct IntoIter<T> {
    seq: LinkedSequence<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> { self.seq.take_front() }

    fn size_hint(&self) -> (usize, Option<usize>) { (self.seq.len(), Some(self.seq.len())) }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.seq).finish()
    }
}

impl<T> LinkedSequence<T> {
    /// Iterate over the elements, front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            arena: &self.arena,
            nodes: self.sentinel.iter_after(&self.arena),
            remaining: self.len(),
        }
    }
}

impl<T> IntoIterator for LinkedSequence<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter { IntoIter { seq: self } }
}

impl<'a, T> IntoIterator for &'a LinkedSequence<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

use std::mem;

use tracing::{debug, trace};

use super::error::SequenceError;
use super::node::{Node, NodeArena, NodeData};
use super::position::Position;
use super::try_clone::TryClone;
use crate::infra::linked_list::ForwardNode;
use crate::infra::storage::{Arena, GenericArena};

/// A singly linked sequence.
///
/// The nodes live in an arena owned by the sequence, and the chain starts at a
/// sentinel node that holds no element. The sentinel is what
/// [`before_begin`](LinkedSequence::before_begin) refers to, so "insert at the
/// front" and "insert after an element" are the same operation, and so are the
/// two kinds of erasure.
///
/// # Examples
///
/// ```
/// use slist::LinkedSequence;
///
/// let mut seq = LinkedSequence::from([1, 2, 4]);
///
/// let two = seq.begin().next(&seq);
/// let three = seq.insert_after(two, 3);
/// assert_eq!(*three.get(&seq), 3);
/// assert_eq!(seq, LinkedSequence::from([1, 2, 3, 4]));
///
/// let next = seq.erase_after(seq.before_begin());
/// assert_eq!(next, seq.begin());
/// assert_eq!(seq, LinkedSequence::from([2, 3, 4]));
/// ```
pub struct LinkedSequence<T> {
    /// The storage of all nodes, including the sentinel.
    pub(super) arena: NodeArena<T>,
    /// The before-begin node.
    pub(super) sentinel: Node<T>,
    /// The number of elements, the sentinel is not counted.
    len: usize,
}

impl<T> LinkedSequence<T> {
    /// Create an empty sequence.
    pub fn new() -> Self { Self::from_arena(GenericArena::default()) }

    /// Create an empty sequence with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_arena(GenericArena::with_capacity(capacity.saturating_add(1)))
    }

    /// Fallible version of [`with_capacity`](LinkedSequence::with_capacity).
    pub fn try_with_capacity(capacity: usize) -> Result<Self, SequenceError> {
        let mut arena = GenericArena::default();
        arena.try_reserve(capacity.saturating_add(1))?;
        Ok(Self::from_arena(arena))
    }

    fn from_arena(mut arena: NodeArena<T>) -> Self {
        let sentinel = Node(arena.alloc(NodeData::sentinel()));
        Self {
            arena,
            sentinel,
            len: 0,
        }
    }

    /// The number of elements.
    pub fn len(&self) -> usize { self.len }

    /// If there is no element.
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// The position before the first element.
    ///
    /// This position can be advanced and inserted or erased after, but it
    /// cannot be dereferenced.
    pub fn before_begin(&self) -> Position<T> { Position::at(self.sentinel) }

    /// The position of the first element, or [`end`](LinkedSequence::end) if
    /// the sequence is empty.
    pub fn begin(&self) -> Position<T> {
        Position {
            node: self.sentinel.next(&self.arena),
        }
    }

    /// The position one past the last element.
    pub fn end(&self) -> Position<T> { Position::end() }

    /// The first element.
    pub fn front(&self) -> Option<&T> {
        self.sentinel
            .next(&self.arena)
            .and_then(|node| node.value(&self.arena))
    }

    /// The first element, mutably.
    pub fn front_mut(&mut self) -> Option<&mut T> {
        match self.sentinel.next(&self.arena) {
            Some(node) => node.value_mut(&mut self.arena),
            None => None,
        }
    }

    /// Insert `value` right after `pos`.
    ///
    /// `pos` can be [`before_begin`](LinkedSequence::before_begin) or the
    /// position of any element. No existing position is invalidated.
    ///
    /// # Returns
    ///
    /// The position of the inserted element.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is the end position, its element has been erased, or it
    /// belongs to another sequence.
    pub fn insert_after(&mut self, pos: Position<T>, value: T) -> Position<T> {
        let prev = self.anchor(pos, "insert after");
        let node = Node(self.arena.alloc(NodeData::detached(value)));
        self.splice_after(prev, node)
    }

    /// Insert `value` at the front.
    pub fn push_front(&mut self, value: T) { self.insert_after(self.before_begin(), value); }

    /// Erase the element right after `pos`.
    ///
    /// Only positions to the erased element are invalidated.
    ///
    /// # Returns
    ///
    /// The position of the element that followed the erased one, or the end
    /// position if the erased element was the last.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is the end position, its element has been erased, it
    /// belongs to another sequence, or there is no element after it.
    pub fn erase_after(&mut self, pos: Position<T>) -> Position<T> {
        let prev = self.anchor(pos, "erase after");
        if self.take_after(prev).is_none() {
            panic!("cannot erase after the last element");
        }
        Position {
            node: prev.next(&self.arena),
        }
    }

    /// Remove the first element and return it.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is empty.
    pub fn pop_front(&mut self) -> T {
        match self.take_front() {
            Some(value) => value,
            None => panic!("cannot pop the front of an empty sequence"),
        }
    }

    /// Remove every element.
    ///
    /// Elements are dropped front to back, each exactly once. All positions
    /// except [`before_begin`](LinkedSequence::before_begin) and
    /// [`end`](LinkedSequence::end) are invalidated.
    pub fn clear(&mut self) {
        trace!(len = self.len, "clearing sequence");
        while self.take_front().is_some() {}
        debug_assert_eq!(self.arena.len(), 1);
    }

    /// Exchange the contents of two sequences in O(1).
    ///
    /// Positions follow their elements: a position obtained from `self` is a
    /// position in `other` afterwards, and the other way around.
    pub fn swap(&mut self, other: &mut Self) { mem::swap(self, other) }

    /// Call `f` on every element, front to back.
    pub fn for_each_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut T),
    {
        let mut curr = self.sentinel.next(&self.arena);
        while let Some(node) = curr {
            if let Some(value) = node.value_mut(&mut self.arena) {
                f(value);
            }
            curr = node.next(&self.arena);
        }
    }

    pub(super) fn take_front(&mut self) -> Option<T> { self.take_after(self.sentinel) }

    /// Resolve `pos` into the node an insertion or erasure is anchored at.
    fn anchor(&self, pos: Position<T>, op: &str) -> Node<T> {
        match pos.node {
            Some(node) if node.is_live(&self.arena) => node,
            Some(node) if !self.arena.owns(node.0) => {
                panic!("cannot {op} a position of another sequence")
            }
            Some(_) => panic!("cannot {op} an erased position"),
            None => panic!("cannot {op} the end position"),
        }
    }

    /// Link a freshly allocated node after `prev`.
    fn splice_after(&mut self, prev: Node<T>, node: Node<T>) -> Position<T> {
        prev.link_after(&mut self.arena, node);
        self.len += 1;
        Position::at(node)
    }

    /// Unlink and deallocate the node after `prev`, returning its element.
    fn take_after(&mut self, prev: Node<T>) -> Option<T> {
        let node = prev.unlink_after(&mut self.arena)?;
        self.len -= 1;
        self.arena.try_dealloc(node.0).and_then(|data| data.value)
    }

    /// The last node, or the sentinel if the sequence is empty.
    fn tail(&self) -> Node<T> {
        self.sentinel
            .iter_after(&self.arena)
            .last()
            .unwrap_or(self.sentinel)
    }
}

impl<T: TryClone> LinkedSequence<T> {
    /// Insert a copy of `value` right after `pos`.
    ///
    /// The copy is made and the storage reserved before anything is linked, so
    /// on error the sequence is unchanged.
    ///
    /// # Returns
    ///
    /// - `Ok(Position)`: The position of the inserted element.
    /// - [`SequenceError::ElementCopy`] if copying `value` failed.
    /// - [`SequenceError::Alloc`] if no node could be allocated.
    ///
    /// # Panics
    ///
    /// See [`insert_after`](LinkedSequence::insert_after).
    pub fn try_insert_after(
        &mut self,
        pos: Position<T>,
        value: &T,
    ) -> Result<Position<T>, SequenceError> {
        let prev = self.anchor(pos, "insert after");
        let value = value.try_clone().map_err(SequenceError::copy)?;
        let node = Node(self.arena.try_alloc_with(|_| NodeData::detached(value))?);
        Ok(self.splice_after(prev, node))
    }

    /// Insert a copy of `value` at the front.
    pub fn try_push_front(&mut self, value: &T) -> Result<(), SequenceError> {
        self.try_insert_after(self.before_begin(), value)?;
        Ok(())
    }

    /// Build a sequence holding copies of `values`, in the same order.
    pub fn try_from_slice(values: &[T]) -> Result<Self, SequenceError> {
        Self::try_from_values(values, values.len())
    }

    /// Make a deep copy of this sequence.
    ///
    /// The copy is built on the side, on error it is dropped with everything
    /// it holds so far, and `self` is never touched.
    pub fn try_clone(&self) -> Result<Self, SequenceError> {
        Self::try_from_values(self.iter(), self.len).map_err(|err| {
            debug!(len = self.len, error = %err, "sequence copy failed");
            err
        })
    }

    /// Replace the contents with a copy of `source`.
    ///
    /// This is copy-and-swap: `source` is copied in full first, then swapped
    /// in, and the old contents are dropped with the temporary. If the copy
    /// fails, `self` is unchanged.
    pub fn try_assign(&mut self, source: &Self) -> Result<(), SequenceError> {
        let mut copy = source.try_clone()?;
        self.swap(&mut copy);
        trace!(len = self.len, "assigned sequence");
        Ok(())
    }

    fn try_from_values<'a, I>(values: I, capacity: usize) -> Result<Self, SequenceError>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let mut seq = Self::try_with_capacity(capacity)?;
        let mut tail = seq.before_begin();
        for value in values {
            tail = seq.try_insert_after(tail, value)?;
        }
        Ok(seq)
    }
}

impl<T> Default for LinkedSequence<T> {
    fn default() -> Self { Self::new() }
}

impl<T: Clone> Clone for LinkedSequence<T> {
    fn clone(&self) -> Self {
        let mut seq = Self::with_capacity(self.len);
        seq.extend(self.iter().cloned());
        seq
    }

    fn clone_from(&mut self, source: &Self) {
        let mut copy = source.clone();
        self.swap(&mut copy);
        trace!(len = self.len, "assigned sequence");
    }
}

impl<T> Extend<T> for LinkedSequence<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.arena.reserve(iter.size_hint().0);

        let mut tail = self.tail();
        for value in iter {
            let node = Node(self.arena.alloc(NodeData::detached(value)));
            self.splice_after(tail, node);
            tail = node;
        }
    }
}

impl<'a, T: Copy + 'a> Extend<&'a T> for LinkedSequence<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied())
    }
}

impl<T> FromIterator<T> for LinkedSequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut seq = Self::new();
        seq.extend(iter);
        seq
    }
}

impl<T, const N: usize> From<[T; N]> for LinkedSequence<T> {
    fn from(values: [T; N]) -> Self { Self::from_iter(values) }
}

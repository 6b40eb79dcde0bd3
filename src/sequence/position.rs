use std::fmt;
use std::hash::{Hash, Hasher};

use super::node::Node;
use super::LinkedSequence;
use crate::infra::linked_list::ForwardNode;

/// A forward position in a [`LinkedSequence`].
///
/// A position is a `Copy` handle, it does not borrow the sequence. Like the
/// node handles in the arena, every operation on it takes the sequence as an
/// explicit context, and the borrow only lasts for that call.
///
/// There are three kinds of positions:
///
/// - *before-begin*, from [`LinkedSequence::before_begin`]. It refers to the
///   sentinel. It can be advanced and used as an insertion point, but not
///   dereferenced.
/// - *at an element*, for example from [`LinkedSequence::begin`] or
///   [`LinkedSequence::insert_after`].
/// - *end*, from [`LinkedSequence::end`]. It supports nothing but comparison.
///
/// Positions compare by identity: two positions are equal if they refer to
/// the same node, no matter what values the nodes hold.
///
/// A position to an element stays valid until that element is erased. Inserting
/// never invalidates a position. Using an erased position, or a position of
/// another sequence, is a contract violation and panics.
pub struct Position<T> {
    pub(super) node: Option<Node<T>>,
}

impl<T> Position<T> {
    pub(super) fn at(node: Node<T>) -> Self { Self { node: Some(node) } }

    pub(super) fn end() -> Self { Self { node: None } }

    /// If this is the end position.
    pub fn is_end(self) -> bool { self.node.is_none() }

    /// Advance the position by one step.
    ///
    /// The last element advances to the end position.
    ///
    /// # Panics
    ///
    /// Panics if this is the end position, if the element has been erased, or
    /// if the position belongs to another sequence.
    pub fn next(self, seq: &LinkedSequence<T>) -> Self {
        match self.node {
            Some(node) => Self {
                node: node.next(&seq.arena),
            },
            None => panic!("cannot advance past the end of a sequence"),
        }
    }

    /// Get the element at this position.
    ///
    /// # Panics
    ///
    /// Panics if this is the end or the before-begin position, if the element
    /// has been erased, or if the position belongs to another sequence.
    pub fn get(self, seq: &LinkedSequence<T>) -> &T {
        match self.node {
            Some(node) => match node.value(&seq.arena) {
                Some(value) => value,
                None => panic!("cannot dereference the before-begin position"),
            },
            None => panic!("cannot dereference the end position"),
        }
    }

    /// Get the element at this position mutably.
    ///
    /// # Panics
    ///
    /// See [`get`](Position::get).
    pub fn get_mut(self, seq: &mut LinkedSequence<T>) -> &mut T {
        match self.node {
            Some(node) => match node.value_mut(&mut seq.arena) {
                Some(value) => value,
                None => panic!("cannot dereference the before-begin position"),
            },
            None => panic!("cannot dereference the end position"),
        }
    }
}

impl<T> Clone for Position<T> {
    fn clone(&self) -> Self { *self }
}

impl<T> Copy for Position<T> {}

impl<T> PartialEq for Position<T> {
    fn eq(&self, other: &Self) -> bool { self.node == other.node }
}

impl<T> Eq for Position<T> {}

impl<T> Hash for Position<T> {
    fn hash<H: Hasher>(&self, state: &mut H) { self.node.hash(state) }
}

impl<T> fmt::Debug for Position<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node {
            Some(node) => write!(f, "Position({:?})", node.0),
            None => write!(f, "Position(end)"),
        }
    }
}

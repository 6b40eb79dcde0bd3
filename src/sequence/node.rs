use std::fmt;
use std::hash::{Hash, Hasher};

use crate::infra::linked_list::ForwardNode;
use crate::infra::storage::{ArenaPtr, GenericArena, GenericPtr};

/// The storage behind one sequence.
pub(super) type NodeArena<T> = GenericArena<NodeData<T>>;

pub(super) struct NodeData<T> {
    /// The element, [`None`] only for the sentinel.
    pub(super) value: Option<T>,
    /// The next node in the chain.
    pub(super) next: Option<Node<T>>,
}

impl<T> NodeData<T> {
    pub(super) fn sentinel() -> Self { Self { value: None, next: None } }

    pub(super) fn detached(value: T) -> Self {
        Self {
            value: Some(value),
            next: None,
        }
    }
}

/// A handle to a node in the arena of a sequence.
pub(super) struct Node<T>(pub(super) GenericPtr<NodeData<T>>);

impl<T> Node<T> {
    /// The element of this node, [`None`] if this is the sentinel.
    ///
    /// # Panics
    ///
    /// Panics if the node has been deallocated.
    pub(super) fn value(self, arena: &NodeArena<T>) -> Option<&T> {
        self.0.deref(arena).value.as_ref()
    }

    /// See [`value`](Node::value).
    pub(super) fn value_mut(self, arena: &mut NodeArena<T>) -> Option<&mut T> {
        self.0.deref_mut(arena).value.as_mut()
    }

    /// If the node is still allocated in `arena`.
    pub(super) fn is_live(self, arena: &NodeArena<T>) -> bool { self.0.try_deref(arena).is_some() }
}

impl<T> Clone for Node<T> {
    fn clone(&self) -> Self { *self }
}

impl<T> Copy for Node<T> {}

impl<T> PartialEq for Node<T> {
    fn eq(&self, other: &Self) -> bool { self.0 == other.0 }
}

impl<T> Eq for Node<T> {}

impl<T> Hash for Node<T> {
    fn hash<H: Hasher>(&self, state: &mut H) { self.0.hash(state) }
}

impl<T> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Node({:?})", self.0) }
}

impl<T> ForwardNode for Node<T> {
    type Ctx = NodeArena<T>;

    fn next(self, ctx: &Self::Ctx) -> Option<Self> { self.0.deref(ctx).next }

    fn set_next(self, ctx: &mut Self::Ctx, next: Option<Self>) { self.0.deref_mut(ctx).next = next; }
}

//! Singly Linked List Infrastructure
//!
//! This implementation requires the nodes to be associated with a context type
//! `Ctx`. The context type is used to store the actual data and manage the
//! memory allocation, usually it is a
//! [`GenericArena`](super::storage::GenericArena) holding the nodes.
//!
//! By using a context for the underlying storage, the lifetime and ownership
//! problems can be easily solved: the context owns every node, and a node
//! handle is just a `Copy` index into it.
//!
//! Only the forward link is maintained. There is no `prev` and no container
//! back-pointer, so the only O(1) edits are the ones right after a known node:
//! [`link_after`](ForwardNode::link_after) and
//! [`unlink_after`](ForwardNode::unlink_after).

/// The singly linked node trait.
///
/// Any node should only be reachable from one chain at a time. A node that is
/// not reachable from any chain is *detached*, and its `next` link is
/// [`None`].
pub trait ForwardNode: Copy + Eq {
    /// The context type that is used to access the data.
    type Ctx;

    /// Get the next node in the chain.
    fn next(self, ctx: &Self::Ctx) -> Option<Self>;

    /// Set the next node in the chain.
    ///
    /// This is a low-level method and is not intended to be used directly.
    fn set_next(self, ctx: &mut Self::Ctx, next: Option<Self>);

    /// Link a detached node right after this node.
    ///
    /// The old successor of this node becomes the successor of `node`.
    ///
    /// # Parameters
    ///
    /// - `ctx`: The context that is used to access the data.
    /// - `node`: The node to be linked, it must be detached.
    fn link_after(self, ctx: &mut Self::Ctx, node: Self) {
        debug_assert!(node.next(ctx).is_none(), "linking a node that is not detached");
        debug_assert!(node != self, "linking a node after itself");

        let next = self.next(ctx);
        node.set_next(ctx, next);
        self.set_next(ctx, Some(node));
    }

    /// Unlink the node right after this node.
    ///
    /// The successor of the unlinked node becomes the successor of this node,
    /// and the unlinked node is left detached. The node is not deallocated
    /// from the context.
    ///
    /// # Returns
    ///
    /// - `Some(node)`: The unlinked node.
    /// - [`None`]: This node is the last one in the chain, nothing is changed.
    fn unlink_after(self, ctx: &mut Self::Ctx) -> Option<Self> {
        let node = self.next(ctx)?;
        let next = node.next(ctx);
        self.set_next(ctx, next);
        node.set_next(ctx, None);
        Some(node)
    }

    /// Iterate over the nodes after this node, excluding this node.
    fn iter_after(self, ctx: &Self::Ctx) -> ForwardIter<'_, Self> {
        ForwardIter {
            ctx,
            curr: self.next(ctx),
        }
    }
}

/// A forward iterator over a chain of nodes.
///
/// This iterator borrows the context immutably. If modification is needed
/// while walking the chain, walk it manually with
/// [`next`](ForwardNode::next) instead.
///
/// # Lifetimes
///
/// - `a`: The lifetime of the context that stores the nodes.
pub struct ForwardIter<'a, N: ForwardNode> {
    ctx: &'a N::Ctx,
    curr: Option<N>,
}

impl<'a, N: ForwardNode> Iterator for ForwardIter<'a, N> {
    type Item = N;

    fn next(&mut self) -> Option<Self::Item> {
        let curr = self.curr;
        self.curr = curr.and_then(|node| node.next(self.ctx));
        curr
    }
}

impl<'a, N: ForwardNode> std::iter::FusedIterator for ForwardIter<'a, N> {}

impl<'a, N: ForwardNode> Clone for ForwardIter<'a, N> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx,
            curr: self.curr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::{Arena, ArenaPtr, GenericArena, GenericPtr};

    struct NodeData {
        val: i32,
        next: Option<Node>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    struct Node(GenericPtr<NodeData>);

    type TestArena = GenericArena<NodeData>;

    impl Node {
        fn new(arena: &mut TestArena, val: i32) -> Self {
            Node(arena.alloc(NodeData { val, next: None }))
        }

        fn val(self, arena: &TestArena) -> i32 { self.0.deref(arena).val }
    }

    impl ForwardNode for Node {
        type Ctx = TestArena;

        fn next(self, ctx: &Self::Ctx) -> Option<Self> { self.0.deref(ctx).next }

        fn set_next(self, ctx: &mut Self::Ctx, next: Option<Self>) {
            self.0.deref_mut(ctx).next = next;
        }
    }

    fn values(head: Node, arena: &TestArena) -> Vec<i32> {
        head.iter_after(arena).map(|node| node.val(arena)).collect()
    }

    #[test]
    fn test_link_after() {
        let arena = &mut TestArena::default();

        let head = Node::new(arena, 0);
        let node1 = Node::new(arena, 1);
        let node2 = Node::new(arena, 2);
        let node3 = Node::new(arena, 3);

        head.link_after(arena, node1);
        assert_eq!(head.next(arena), Some(node1));
        assert_eq!(node1.next(arena), None);

        // insert in front of the old successor
        head.link_after(arena, node2);
        assert_eq!(head.next(arena), Some(node2));
        assert_eq!(node2.next(arena), Some(node1));

        // insert at the tail
        node1.link_after(arena, node3);
        assert_eq!(values(head, arena), vec![2, 1, 3]);
    }

    #[test]
    fn test_unlink_after() {
        let arena = &mut TestArena::default();

        let head = Node::new(arena, 0);
        let node1 = Node::new(arena, 1);
        let node2 = Node::new(arena, 2);
        let node3 = Node::new(arena, 3);
        head.link_after(arena, node1);
        node1.link_after(arena, node2);
        node2.link_after(arena, node3);

        assert_eq!(node1.unlink_after(arena), Some(node2));
        assert_eq!(node2.next(arena), None);
        assert_eq!(values(head, arena), vec![1, 3]);

        assert_eq!(node3.unlink_after(arena), None);
        assert_eq!(values(head, arena), vec![1, 3]);

        assert_eq!(head.unlink_after(arena), Some(node1));
        assert_eq!(head.unlink_after(arena), Some(node3));
        assert_eq!(head.unlink_after(arena), None);
        assert_eq!(head.next(arena), None);
    }

    #[test]
    fn test_forward_iter() {
        let arena = &mut TestArena::default();

        let head = Node::new(arena, 0);
        let node1 = Node::new(arena, 1);
        let node2 = Node::new(arena, 2);
        head.link_after(arena, node1);
        node1.link_after(arena, node2);

        let mut iter = head.iter_after(arena);
        assert_eq!(iter.next(), Some(node1));
        assert_eq!(iter.next(), Some(node2));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);

        assert_eq!(node2.iter_after(arena).next(), None);
    }
}

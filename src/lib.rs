//! A singly linked sequence with forward positions and value semantics.
//!
//! [`LinkedSequence`] keeps its nodes in an arena it owns, and anchors the
//! chain at a sentinel node, so every insertion and erasure is "after a known
//! position" and takes O(1). Positions are plain `Copy` handles compared by
//! identity, checked against the arena whenever they are used.
//!
//! Copying has a fallible side: element types can implement [`TryClone`], and
//! [`LinkedSequence::try_insert_after`], [`LinkedSequence::try_clone`] and
//! [`LinkedSequence::try_assign`] leave the sequence untouched when a copy or
//! an allocation fails.

pub mod infra;
pub mod sequence;

pub use sequence::{IntoIter, Iter, LinkedSequence, Position, SequenceError, TryClone};

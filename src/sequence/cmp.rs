use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::LinkedSequence;

// All six relational operators come from these impls. For `Ord` elements
// `a >= b` is always `!(a < b)` and so on, elements that are only `PartialOrd`
// (NaN) can make both false.

impl<T: PartialEq> PartialEq for LinkedSequence<T> {
    fn eq(&self, other: &Self) -> bool { self.len() == other.len() && self.iter().eq(other.iter()) }
}

impl<T: Eq> Eq for LinkedSequence<T> {}

impl<T: PartialOrd> PartialOrd for LinkedSequence<T> {
    /// Lexicographic order, a strict prefix is less than the longer sequence.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { self.iter().partial_cmp(other.iter()) }
}

impl<T: Ord> Ord for LinkedSequence<T> {
    fn cmp(&self, other: &Self) -> Ordering { self.iter().cmp(other.iter()) }
}

impl<T: Hash> Hash for LinkedSequence<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for value in self {
            value.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for LinkedSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.debug_list().entries(self).finish() }
}

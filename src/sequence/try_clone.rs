use std::convert::Infallible;

use super::error::BoxError;

/// A copy operation that may fail.
///
/// Every [`Clone`] type implements this and never fails. Types whose copies
/// can fail, for example because they hold a resource that has to be
/// acquired again, implement it directly and report the failure through
/// [`Error`](TryClone::Error).
///
/// The fallible operations of [`LinkedSequence`](super::LinkedSequence) are
/// built on this trait, and leave the sequence untouched when a copy fails.
pub trait TryClone: Sized {
    /// The error returned when the copy fails.
    type Error: Into<BoxError>;

    /// Try to make a copy of `self`.
    fn try_clone(&self) -> Result<Self, Self::Error>;
}

impl<T: Clone> TryClone for T {
    type Error = Infallible;

    fn try_clone(&self) -> Result<Self, Infallible> { Ok(self.clone()) }
}

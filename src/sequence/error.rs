use std::collections::TryReserveError;
use std::error::Error as StdError;

use thiserror::Error;

/// A type-erased error raised while copying an element.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// The error type for the fallible sequence operations.
///
/// Whenever one of these is returned, the sequence involved is left exactly
/// as it was before the call.
#[derive(Debug, Error)]
pub enum SequenceError {
    /// The arena could not grow to hold a new node.
    #[error("failed to allocate a sequence node")]
    Alloc(#[from] TryReserveError),
    /// Copying an element failed, see [`TryClone`](super::TryClone).
    #[error("failed to copy an element")]
    ElementCopy(#[source] BoxError),
}

impl SequenceError {
    pub(super) fn copy<E: Into<BoxError>>(err: E) -> Self { SequenceError::ElementCopy(err.into()) }
}

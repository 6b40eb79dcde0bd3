mod cmp;
mod error;
mod iter;
mod list;
mod node;
mod position;
mod try_clone;

pub use error::{BoxError, SequenceError};
pub use iter::{IntoIter, Iter};
pub use list::LinkedSequence;
pub use position::Position;
pub use try_clone::TryClone;

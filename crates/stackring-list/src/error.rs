//! List error types.

use std::convert::Infallible;
use std::error::Error;
use std::fmt;

use stackring_arena::AllocError;

/// Errors from list operations that construct elements.
///
/// `E` is the error type of the element constructor. Operations whose
/// constructors cannot fail return plain [`AllocError`] instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListError<E> {
    /// The node allocator could not supply storage.
    Alloc(AllocError),
    /// An element constructor failed. Everything built so far in the same
    /// operation has been rolled back.
    Construct(E),
}

impl<E> From<AllocError> for ListError<E> {
    fn from(err: AllocError) -> Self {
        Self::Alloc(err)
    }
}

impl From<ListError<Infallible>> for AllocError {
    fn from(err: ListError<Infallible>) -> Self {
        match err {
            ListError::Alloc(err) => err,
            ListError::Construct(never) => match never {},
        }
    }
}

impl<E: fmt::Display> fmt::Display for ListError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alloc(err) => write!(f, "node allocation failed: {err}"),
            Self::Construct(err) => write!(f, "element construction failed: {err}"),
        }
    }
}

impl<E: Error + 'static> Error for ListError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Alloc(err) => Some(err),
            Self::Construct(err) => Some(err),
        }
    }
}

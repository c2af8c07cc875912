//! Stackring: a fixed-capacity bump arena and an allocator-aware
//! doubly-linked list that never leaks on failed construction.
//!
//! This is the facade crate that re-exports the public API of the
//! sub-crates. For most users, adding `stackring` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use stackring::prelude::*;
//!
//! // A 4 KiB arena shared by two lists.
//! let arena = Arena::with_capacity(4096).unwrap();
//! let alloc = ArenaAllocator::new(&arena);
//!
//! let mut squares = List::try_from_fn_in(5, |i| Ok::<_, ()>(i * i), alloc).unwrap();
//! let mut cursor = squares.cursor_front_mut();
//! cursor.move_next();
//! cursor.insert(100).unwrap();
//! assert_eq!(squares.iter().copied().collect::<Vec<_>>(), [0, 100, 1, 4, 9, 16]);
//!
//! let copy = squares.try_clone().unwrap();
//! assert_eq!(copy, squares);
//! assert!(copy.allocator() == squares.allocator());
//!
//! // A constructor failing part way leaves nothing behind but arena space.
//! let failed = List::<usize, _>::try_from_fn_in(
//!     8,
//!     |i| if i < 3 { Ok(i) } else { Err("out of input") },
//!     alloc,
//! );
//! assert!(matches!(failed, Err(ListError::Construct("out of input"))));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `stackring-arena` | `Allocator` trait, `Global`, `Arena`, `ArenaAllocator`, errors |
//! | [`list`] | `stackring-list` | `List`, cursors, iterators, `ListError` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// The allocator contract and the bump arena (`stackring-arena`).
///
/// [`arena::Arena`] is the fixed-capacity buffer;
/// [`arena::ArenaAllocator`] is the copyable handle containers allocate
/// through.
pub use stackring_arena as arena;

/// The allocator-aware list (`stackring-list`).
///
/// [`list::List`] plus its cursors ([`list::Cursor`],
/// [`list::CursorMut`]) and iterators.
pub use stackring_list as list;

/// Common imports for typical stackring usage.
///
/// ```rust
/// use stackring::prelude::*;
/// ```
pub mod prelude {
    // Allocation
    pub use stackring_arena::{
        AllocError, Allocator, Arena, ArenaAllocator, ArenaConfig, ConfigError, Global,
    };

    // List
    pub use stackring_list::{Cursor, CursorMut, List, ListError};
}

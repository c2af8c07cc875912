//! Allocator-aware doubly-linked list with rollback on failed construction.
//!
//! [`List<T, A>`] is a circular, sentinel-terminated, doubly-linked list
//! generic over any [`Allocator`](stackring_arena::Allocator), including
//! arena-backed ones. It separates raw node allocation from value
//! construction so that a failure at either step can be cleaned up exactly.
//!
//! # Structure
//!
//! ```text
//!            ┌──────────────────────────────────────────────┐
//!            ▼                                              │
//!   sentinel ⇄ node[0] ⇄ node[1] ⇄ … ⇄ node[len-1] ⇄ ───────┘
//!   (end)      (front)                 (back)
//! ```
//!
//! The sentinel is allocated with the list, never holds a value, and is the
//! end position for cursors. Walking `next` from it `len` times returns to
//! it; walking `prev` visits the same nodes in reverse.
//!
//! # Failure guarantees
//!
//! - **Bulk construction** ([`List::with_len_in`], [`List::from_elem_in`],
//!   [`List::try_from_fn_in`], [`List::try_clone`], ...) allocates and links
//!   every node first, then constructs values in order. If a constructor
//!   fails or panics, the values already built are dropped, every node is
//!   deallocated, and the failure is reported.
//! - **Single insertion** ([`ListCursor::try_insert_with`]) links the node only
//!   after its value exists; on failure the node is deallocated and the list
//!   is unchanged.
//! - **Copy-assignment** ([`List::try_clone_from`]) builds the replacement
//!   completely before swapping it in, so a failure leaves the target as it
//!   was.
//!
//! # Allocator propagation
//!
//! The list consults `A::PROPAGATE_ON_COPY_ASSIGNMENT`,
//! `A::PROPAGATE_ON_SWAP` and `A::select_on_copy()` exactly where a
//! standard allocator-aware container does.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

mod build;
pub mod cursor;
pub mod error;
pub mod iter;
pub mod list;
mod node;

pub use cursor::{Cursor, CursorMut, ListCursor};
pub use error::ListError;
pub use iter::{IntoIter, Iter, IterMut};
pub use list::List;
pub use node::node_layout;

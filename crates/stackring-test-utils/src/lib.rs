//! Test utilities for stackring development.
//!
//! - [`TrackingAllocator`]: an [`Allocator`](stackring_arena::Allocator)
//!   that records every allocation in a shared [`AllocLedger`], can be told
//!   to fail after a budget, and carries a compile-time
//!   [`PropagationPolicy`].
//! - [`Probe`] and [`Counted`]: an element type whose constructions and
//!   drops are counted, and whose construction can be made to fail (or its
//!   `Clone` to panic) at a chosen point.

#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod counted;
pub mod tracking;

pub use counted::{ConstructionFailed, Counted, Probe};
pub use tracking::{
    AllocLedger, FreshOnCopy, Propagate, PropagationPolicy, Retain, TrackingAllocator,
};

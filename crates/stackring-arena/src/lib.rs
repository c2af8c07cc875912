//! Fixed-capacity bump arena and the allocator contract for stackring.
//!
//! Provides a single-buffer bump [`Arena`], the typed [`Allocator`] trait
//! that stackring containers are generic over, and two implementations:
//! [`Global`] (the process heap) and [`ArenaAllocator`] (a copyable,
//! non-owning handle onto an arena).
//!
//! # Architecture
//!
//! ```text
//! Arena (owner)
//! ├── RawBuffer (one heap block, fixed at creation)
//! └── cursor (only moves forward)
//!
//! ArenaAllocator<'a, T> ──borrows──▶ Arena
//!     └── rebind::<U>() ─▶ ArenaAllocator<'a, U> (same arena)
//! ```
//!
//! Arenas never grow, compact, or reclaim individual allocations. A
//! reservation that does not fit fails with
//! [`AllocError::CapacityExceeded`] and leaves the arena unchanged.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod allocator;
pub mod arena;
pub mod arena_alloc;
pub mod config;
pub mod error;
mod raw;

// Public re-exports for the primary API surface.
pub use allocator::{Allocator, Global};
pub use arena::Arena;
pub use arena_alloc::ArenaAllocator;
pub use config::ArenaConfig;
pub use error::{AllocError, ConfigError};

//! Allocation and configuration error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur when an allocator hands out memory.
///
/// Every variant is a hard failure at the allocator layer: nothing is
/// retried, and the arena never grows or compacts to make room.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The arena has no aligned range of the requested size left.
    CapacityExceeded {
        /// Number of bytes requested.
        requested: usize,
        /// Alignment of the request in bytes.
        align: usize,
        /// Bytes left past the cursor when the request was made.
        remaining: usize,
    },
    /// `count * elem_size` does not fit in a `usize`.
    SizeOverflow {
        /// Number of elements requested.
        count: usize,
        /// Size of one element in bytes.
        elem_size: usize,
    },
    /// A raw reservation asked for an alignment that is not a power of two.
    InvalidAlignment {
        /// The rejected alignment.
        align: usize,
    },
    /// The global heap refused the request.
    OutOfMemory {
        /// Number of bytes requested.
        requested: usize,
    },
    /// An allocator with a fixed allocation budget has spent it.
    BudgetExhausted {
        /// Number of allocations the budget permitted.
        limit: usize,
    },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                requested,
                align,
                remaining,
            } => {
                write!(
                    f,
                    "arena capacity exceeded: requested {requested} bytes (align {align}), {remaining} bytes remaining"
                )
            }
            Self::SizeOverflow { count, elem_size } => {
                write!(
                    f,
                    "allocation size overflow: {count} elements of {elem_size} bytes"
                )
            }
            Self::InvalidAlignment { align } => {
                write!(f, "alignment {align} is not a power of two")
            }
            Self::OutOfMemory { requested } => {
                write!(f, "heap allocation of {requested} bytes failed")
            }
            Self::BudgetExhausted { limit } => {
                write!(f, "allocation budget of {limit} allocations exhausted")
            }
        }
    }
}

impl Error for AllocError {}

/// Errors from validating an [`ArenaConfig`](crate::ArenaConfig).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// An arena must have room for at least one byte.
    ZeroCapacity,
    /// The base alignment of the backing buffer is not a power of two.
    InvalidAlignment {
        /// The rejected alignment.
        align: usize,
    },
    /// The capacity, rounded up to the base alignment, exceeds `isize::MAX`.
    CapacityOverflow {
        /// The rejected capacity.
        capacity: usize,
    },
    /// The global heap could not supply the backing buffer.
    OutOfMemory {
        /// The requested capacity.
        capacity: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCapacity => write!(f, "arena capacity must be non-zero"),
            Self::InvalidAlignment { align } => {
                write!(f, "arena base alignment {align} is not a power of two")
            }
            Self::CapacityOverflow { capacity } => {
                write!(f, "arena capacity {capacity} is too large to allocate")
            }
            Self::OutOfMemory { capacity } => {
                write!(f, "heap refused an arena buffer of {capacity} bytes")
            }
        }
    }
}

impl Error for ConfigError {}

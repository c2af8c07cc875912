//! Fixed-capacity bump arena.
//!
//! An [`Arena`] is one contiguous, pre-allocated byte buffer with a cursor
//! that only moves forward. Each reservation pads the cursor up to the
//! requested alignment, hands out the range, and advances past it. Space is
//! never reclaimed while the arena lives; it is released in one piece when
//! the arena is dropped.

use std::cell::Cell;
use std::fmt;
use std::ptr::NonNull;

use crate::config::ArenaConfig;
use crate::error::{AllocError, ConfigError};
use crate::raw::{align_padding, RawBuffer};

/// A single contiguous buffer with bump allocation.
///
/// Reservation goes through `&self` so that any number of
/// [`ArenaAllocator`](crate::ArenaAllocator) handles can share one arena.
/// The arena is not `Sync`: callers that share it across threads must
/// serialise access themselves.
pub struct Arena {
    /// Backing storage. Allocated to full capacity at creation.
    buf: RawBuffer,
    /// Bump pointer: offset of the next free byte.
    cursor: Cell<usize>,
    /// Number of successful reservations.
    reservations: Cell<usize>,
}

impl Arena {
    /// Create an arena from a validated config.
    pub fn new(config: ArenaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let layout = std::alloc::Layout::from_size_align(config.capacity, config.base_align)
            .map_err(|_| ConfigError::CapacityOverflow {
                capacity: config.capacity,
            })?;
        let buf = RawBuffer::new(layout).ok_or(ConfigError::OutOfMemory {
            capacity: config.capacity,
        })?;
        Ok(Self {
            buf,
            cursor: Cell::new(0),
            reservations: Cell::new(0),
        })
    }

    /// Create an arena of `capacity` bytes with the default base alignment.
    pub fn with_capacity(capacity: usize) -> Result<Self, ConfigError> {
        Self::new(ArenaConfig::new(capacity))
    }

    /// Bump-reserve `size` bytes aligned to `align`.
    ///
    /// Returns the start of a range `[ptr, ptr + size)` inside the buffer
    /// that no earlier reservation overlaps. Fails with
    /// [`AllocError::CapacityExceeded`] if the aligned range does not fit
    /// in what is left; the cursor is left untouched in that case.
    ///
    /// The arena never runs constructors or destructors for the memory it
    /// hands out.
    pub fn reserve(&self, size: usize, align: usize) -> Result<NonNull<u8>, AllocError> {
        if !align.is_power_of_two() {
            return Err(AllocError::InvalidAlignment { align });
        }
        let base = self.buf.base();
        let cursor = self.cursor.get();
        let capacity = self.buf.len();

        let addr = (base.as_ptr() as usize).wrapping_add(cursor);
        let start = cursor.checked_add(align_padding(addr, align));
        let end = start.and_then(|s| s.checked_add(size));
        let (start, end) = match (start, end) {
            (Some(start), Some(end)) if end <= capacity => (start, end),
            _ => {
                tracing::trace!(
                    requested = size,
                    align,
                    remaining = capacity - cursor,
                    "arena reservation refused"
                );
                return Err(AllocError::CapacityExceeded {
                    requested: size,
                    align,
                    remaining: capacity - cursor,
                });
            }
        };

        self.cursor.set(end);
        self.reservations.set(self.reservations.get() + 1);
        // SAFETY: start <= end <= capacity, so the offset stays inside (or one
        // past the end of) the buffer allocation, and the result is non-null.
        Ok(unsafe { NonNull::new_unchecked(base.as_ptr().add(start)) })
    }

    /// Whether `ptr` points into this arena's buffer.
    pub fn contains(&self, ptr: *const u8) -> bool {
        let base = self.buf.base().as_ptr() as usize;
        let addr = ptr as usize;
        addr >= base && addr < base + self.buf.len()
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes consumed so far, including alignment padding.
    pub fn used(&self) -> usize {
        self.cursor.get()
    }

    /// Bytes left past the cursor.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.cursor.get()
    }

    /// Number of successful reservations.
    pub fn reservations(&self) -> usize {
        self.reservations.get()
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("capacity", &self.capacity())
            .field("used", &self.used())
            .field("reservations", &self.reservations())
            .finish()
    }
}
